//! Device-less live output driven by a timer thread.

use super::DEFAULT_TAP_CAPACITY;
use crate::lockfree::{AtomicCounter, AtomicFlag};
use crate::{
    signal_tap, CancellationToken, Error, LiveContext, LiveOutput, OutputHandle, Result,
    SampleBuffer, SignalTap, TapWriter,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Frames advanced per timer tick.
const BLOCK_FRAMES: usize = 128;

/// Plays buffers on a background thread in 128-frame blocks, either paced
/// at real time or as fast as possible, writing the mono downmix into the
/// signal tap. Nothing is audible.
#[derive(Debug, Clone)]
pub struct HeadlessOutput {
    realtime: bool,
    tap_capacity: usize,
}

impl Default for HeadlessOutput {
    fn default() -> Self {
        Self {
            realtime: true,
            tap_capacity: DEFAULT_TAP_CAPACITY,
        }
    }
}

impl HeadlessOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run through buffers without sleeping between blocks.
    pub fn unpaced() -> Self {
        Self {
            realtime: false,
            ..Self::default()
        }
    }

    pub fn tap_capacity(mut self, capacity: usize) -> Self {
        self.tap_capacity = capacity;
        self
    }
}

impl LiveOutput for HeadlessOutput {
    fn open(&self, sample_rate: u32) -> Result<Box<dyn LiveContext>> {
        Ok(Box::new(HeadlessContext {
            sample_rate,
            realtime: self.realtime,
            tap_capacity: self.tap_capacity,
            tap: Arc::new(Mutex::new(None)),
            tapped: false,
            voices: Vec::new(),
        }))
    }
}

type TapSlot = Arc<Mutex<Option<TapWriter>>>;

struct HeadlessContext {
    sample_rate: u32,
    realtime: bool,
    tap_capacity: usize,
    tap: TapSlot,
    tapped: bool,
    voices: Vec<CancellationToken>,
}

impl LiveContext for HeadlessContext {
    fn play_buffer(&mut self, buffer: Arc<SampleBuffer>) -> Result<Box<dyn OutputHandle>> {
        if buffer.sample_rate() != self.sample_rate {
            log::warn!(
                "Playing {} Hz buffer through {} Hz headless output",
                buffer.sample_rate(),
                self.sample_rate
            );
        }
        let stop = CancellationToken::new();
        let finished = Arc::new(AtomicFlag::new(false));
        let position = Arc::new(AtomicCounter::new(0));

        let thread = {
            let stop = stop.clone();
            let finished = finished.clone();
            let position = position.clone();
            let tap = self.tap.clone();
            let realtime = self.realtime;
            std::thread::Builder::new()
                .name("mixdown-headless".into())
                .spawn(move || run_voice(&buffer, &tap, &stop, &finished, &position, realtime))
                .map_err(|e| Error::Output(format!("failed to spawn output thread: {e}")))?
        };

        self.voices.push(stop.clone());
        Ok(Box::new(HeadlessHandle {
            stop,
            finished,
            position,
            thread: Some(thread),
        }))
    }

    fn tap_signal(&mut self) -> Result<SignalTap> {
        if self.tapped {
            return Err(Error::Output("signal already tapped".into()));
        }
        let (writer, tap) = signal_tap(self.tap_capacity, self.sample_rate);
        *self.tap.lock() = Some(writer);
        self.tapped = true;
        Ok(tap)
    }

    fn close(self: Box<Self>) -> Result<()> {
        for voice in &self.voices {
            voice.cancel();
        }
        self.tap.lock().take();
        Ok(())
    }
}

fn run_voice(
    buffer: &SampleBuffer,
    tap: &TapSlot,
    stop: &CancellationToken,
    finished: &AtomicFlag,
    position: &AtomicCounter,
    realtime: bool,
) {
    let len = buffer.len();
    let sample_rate = buffer.sample_rate().max(1) as f64;
    let started = Instant::now();
    let mut block = Vec::with_capacity(BLOCK_FRAMES);
    let mut pos = 0;

    while pos < len && !stop.is_cancelled() {
        let end = (pos + BLOCK_FRAMES).min(len);
        block.clear();
        block.extend((pos..end).map(|i| buffer.mono_frame(i)));

        if let Some(writer) = tap.lock().as_mut() {
            writer.write_mono(&block);
        }

        position.add((end - pos) as u64);
        pos = end;

        if realtime {
            let due = started + Duration::from_secs_f64(pos as f64 / sample_rate);
            std::thread::sleep(due.saturating_duration_since(Instant::now()));
        }
    }

    if pos >= len {
        finished.set(true);
    }
}

struct HeadlessHandle {
    stop: CancellationToken,
    finished: Arc<AtomicFlag>,
    position: Arc<AtomicCounter>,
    thread: Option<JoinHandle<()>>,
}

impl HeadlessHandle {
    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Headless output thread panicked");
            }
        }
    }
}

impl OutputHandle for HeadlessHandle {
    fn stop(&mut self) {
        self.stop.cancel();
        self.join();
        log::debug!("Headless output stopped at frame {}", self.position.get());
    }

    fn is_finished(&self) -> bool {
        self.finished.get()
    }
}

impl Drop for HeadlessHandle {
    fn drop(&mut self) {
        self.stop.cancel();
        self.join();
    }
}
