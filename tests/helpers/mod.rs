//! Test helpers and fixtures for mixdown integration tests
//!
//! Recording doubles for the host boundary (live output and display panel)
//! plus in-memory WAV fixtures written with hound and FLAC fixtures written
//! with flacenc.

#![allow(dead_code)]

pub mod tolerances;

use mixdown::core::{
    signal_tap, LiveContext, LiveOutput, OutputHandle, SampleBuffer, SignalTap, TapWriter,
};
use mixdown::prelude::*;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Sample rate of the scenario fixtures.
pub const TEST_SAMPLE_RATE: u32 = 44100;

/// Generate a sine wave.
pub fn generate_sine(frequency: f64, amplitude: f32, sample_rate: u32, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32 * amplitude
        })
        .collect()
}

/// Encode mono samples as a 32-bit float WAV file in memory.
pub fn wav_bytes(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav header");
        for &s in samples {
            writer.write_sample(s).expect("wav sample");
        }
        writer.finalize().expect("wav finalize");
    }
    cursor.into_inner()
}

/// Encode mono samples as a 16-bit FLAC file in memory.
pub fn flac_bytes(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    use flacenc::component::BitRepr;
    use flacenc::error::Verify;

    let ints: Vec<i32> = samples
        .iter()
        .map(|s| (s * i16::MAX as f32).round() as i32)
        .collect();
    let config = flacenc::config::Encoder::default()
        .into_verified()
        .expect("flac config");
    let source = flacenc::source::MemSource::from_samples(&ints, 1, 16, sample_rate as usize);
    let stream =
        flacenc::encode_with_fixed_block_size(&config, source, 4096).expect("flac encode");
    let mut sink = flacenc::bitsink::ByteSink::new();
    stream.write(&mut sink).expect("flac write");
    sink.into_inner()
}

/// A named mono tone file.
pub fn tone_file(name: &str, frequency: f64, amplitude: f32, seconds: f64) -> (MemoryFile, Vec<f32>) {
    let frames = (TEST_SAMPLE_RATE as f64 * seconds).round() as usize;
    let samples = generate_sine(frequency, amplitude, TEST_SAMPLE_RATE, frames);
    let file = MemoryFile::new(name, wav_bytes(&samples, TEST_SAMPLE_RATE));
    (file, samples)
}

// =============================================================================
// Display panel double
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    Refresh(Vec<TrackView>),
    Control(ControlLabel),
    Busy(bool),
    Error(String),
}

/// Display panel that records every call.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    events: Arc<Mutex<Vec<DisplayEvent>>>,
}

impl RecordingDisplay {
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn refreshes(&self) -> Vec<Vec<TrackView>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DisplayEvent::Refresh(views) => Some(views),
                _ => None,
            })
            .collect()
    }

    pub fn last_control(&self) -> Option<ControlLabel> {
        self.events().into_iter().rev().find_map(|e| match e {
            DisplayEvent::Control(label) => Some(label),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DisplayEvent::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: DisplayEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl DisplayPanel for RecordingDisplay {
    fn refresh(&mut self, tracks: &[TrackView]) {
        self.push(DisplayEvent::Refresh(tracks.to_vec()));
    }

    fn show_control(&mut self, label: ControlLabel) {
        self.push(DisplayEvent::Control(label));
    }

    fn set_busy(&mut self, busy: bool) {
        self.push(DisplayEvent::Busy(busy));
    }

    fn show_error(&mut self, error: &mixdown::core::Error) {
        self.push(DisplayEvent::Error(error.to_string()));
    }
}

// =============================================================================
// Live output double
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    Opened(u32),
    Tapped,
    Played(usize),
    Stopped,
    Closed,
}

/// Live output that records calls and pushes the whole buffer into the tap
/// as soon as it is played.
#[derive(Clone, Default)]
pub struct RecordingOutput {
    events: Arc<Mutex<Vec<OutputEvent>>>,
    fail_play: bool,
}

impl RecordingOutput {
    /// An output whose `play_buffer` always fails.
    pub fn failing_play() -> Self {
        Self {
            fail_play: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<OutputEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Contexts opened minus contexts closed.
    pub fn open_contexts(&self) -> isize {
        self.events().iter().fold(0, |n, e| match e {
            OutputEvent::Opened(_) => n + 1,
            OutputEvent::Closed => n - 1,
            _ => n,
        })
    }
}

impl LiveOutput for RecordingOutput {
    fn open(&self, sample_rate: u32) -> mixdown::core::Result<Box<dyn LiveContext>> {
        self.events.lock().unwrap().push(OutputEvent::Opened(sample_rate));
        Ok(Box::new(RecordingContext {
            events: self.events.clone(),
            sample_rate,
            writer: None,
            fail_play: self.fail_play,
        }))
    }
}

struct RecordingContext {
    events: Arc<Mutex<Vec<OutputEvent>>>,
    sample_rate: u32,
    writer: Option<TapWriter>,
    fail_play: bool,
}

impl LiveContext for RecordingContext {
    fn play_buffer(
        &mut self,
        buffer: Arc<SampleBuffer>,
    ) -> mixdown::core::Result<Box<dyn OutputHandle>> {
        if self.fail_play {
            return Err(mixdown::core::Error::Output("device unplugged".into()));
        }
        self.events
            .lock()
            .unwrap()
            .push(OutputEvent::Played(buffer.len()));

        if let Some(writer) = self.writer.as_mut() {
            let mono: Vec<f32> = (0..buffer.len()).map(|i| buffer.mono_frame(i)).collect();
            writer.write_mono(&mono);
        }
        Ok(Box::new(RecordingHandle {
            events: self.events.clone(),
            stopped: false,
        }))
    }

    fn tap_signal(&mut self) -> mixdown::core::Result<SignalTap> {
        self.events.lock().unwrap().push(OutputEvent::Tapped);
        let (writer, tap) = signal_tap(8192, self.sample_rate);
        self.writer = Some(writer);
        Ok(tap)
    }

    fn close(self: Box<Self>) -> mixdown::core::Result<()> {
        self.events.lock().unwrap().push(OutputEvent::Closed);
        Ok(())
    }
}

struct RecordingHandle {
    events: Arc<Mutex<Vec<OutputEvent>>>,
    stopped: bool,
}

impl OutputHandle for RecordingHandle {
    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.events.lock().unwrap().push(OutputEvent::Stopped);
        }
    }

    fn is_finished(&self) -> bool {
        true
    }
}

/// Engine wired to recording doubles, mono at the fixture rate.
pub fn test_engine() -> (MixdownEngine, RecordingOutput, RecordingDisplay) {
    test_engine_with(MixdownEngine::builder().channels(1))
}

/// Attach recording doubles to `builder` and build.
pub fn test_engine_with(
    builder: MixdownEngineBuilder,
) -> (MixdownEngine, RecordingOutput, RecordingDisplay) {
    let output = RecordingOutput::default();
    let display = RecordingDisplay::default();
    let engine = builder
        .sample_rate(TEST_SAMPLE_RATE)
        .output(output.clone())
        .display(display.clone())
        .build()
        .expect("Failed to create test engine");
    (engine, output, display)
}
