//! Live visualizer: two draw loops fed by one signal tap.
//!
//! Each loop runs on its own thread at `refresh_hz`, pulls the newest
//! samples from the tap into a shared [`Analyser`], renders a frame,
//! hands it to its [`FrameSink`] and publishes it via `ArcSwap` for
//! lock-free reads. Both loops hold a clone of the session's
//! [`CancellationToken`] and exit once it is revoked.

use crate::{Analyser, SpectrumFrame, VisualizerConfig, WaveformFrame};
use arc_swap::ArcSwap;
use mixdown_core::lockfree::AtomicCounter;
use mixdown_core::{CancellationToken, Error, Result, SignalTap};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Destination for rendered frames, e.g. a canvas.
pub trait FrameSink<F>: Send {
    /// Current drawing surface size `(width, height)`. Asked every tick.
    fn size(&self) -> (f32, f32);

    fn present(&mut self, frame: &F);
}

impl<F, S: FrameSink<F> + ?Sized> FrameSink<F> for Box<S> {
    fn size(&self) -> (f32, f32) {
        (**self).size()
    }

    fn present(&mut self, frame: &F) {
        (**self).present(frame)
    }
}

/// Fixed-size sink that only keeps frames in the session.
#[derive(Debug, Clone, Copy)]
pub struct OffscreenSink {
    width: f32,
    height: f32,
}

impl OffscreenSink {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl<F> FrameSink<F> for OffscreenSink {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn present(&mut self, _frame: &F) {}
}

/// Frames rendered so far by each loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickCounts {
    pub waveform: u64,
    pub spectrum: u64,
}

/// Attaches draw loops to a signal tap.
#[derive(Debug, Clone)]
pub struct Visualizer {
    config: VisualizerConfig,
}

impl Visualizer {
    pub fn new(config: VisualizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Start the waveform and spectrum loops on `tap`.
    pub fn attach(
        &self,
        tap: SignalTap,
        waveform_sink: impl FrameSink<WaveformFrame> + 'static,
        spectrum_sink: impl FrameSink<SpectrumFrame> + 'static,
    ) -> Result<VisualizerSession> {
        let sample_rate = tap.sample_rate();
        let shared = Arc::new(Mutex::new(Shared {
            analyser: Analyser::new(&self.config),
            tap,
        }));
        let token = CancellationToken::new();
        let state = Arc::new(SessionState::default());
        let period = Duration::from_secs_f32(1.0 / self.config.refresh_hz);

        let mut session = VisualizerSession {
            token: token.clone(),
            state: state.clone(),
            threads: Vec::with_capacity(2),
        };

        let waveform = {
            let shared = shared.clone();
            spawn_draw_loop(
                "mixdown-waveform",
                period,
                token.clone(),
                waveform_sink,
                state.clone(),
                |state| &state.waveform,
                |state| &state.waveform_ticks,
                move |(width, height)| {
                    let data = shared.lock().time_domain();
                    WaveformFrame::from_time_domain(&data, width, height)
                },
            )
        };
        // Dropping `session` on error stops whatever already started
        session.threads.push(waveform?);

        let config = self.config.clone();
        let spectrum = spawn_draw_loop(
            "mixdown-spectrum",
            period,
            token,
            spectrum_sink,
            state,
            |state| &state.spectrum,
            |state| &state.spectrum_ticks,
            move |(width, height)| {
                let (data, fft_size) = shared.lock().frequency();
                SpectrumFrame::from_frequency_data(
                    &data,
                    sample_rate,
                    fft_size,
                    width,
                    height,
                    &config,
                )
            },
        );
        session.threads.push(spectrum?);

        log::debug!(
            "Visualizer attached ({} Hz refresh, FFT {})",
            self.config.refresh_hz,
            self.config.fft_size
        );
        Ok(session)
    }
}

struct Shared {
    analyser: Analyser,
    tap: SignalTap,
}

impl Shared {
    fn time_domain(&mut self) -> Vec<u8> {
        self.analyser.drain(&mut self.tap);
        self.analyser.byte_time_domain_data()
    }

    fn frequency(&mut self) -> (Vec<u8>, usize) {
        self.analyser.drain(&mut self.tap);
        (
            self.analyser.byte_frequency_data(),
            self.analyser.fft_size(),
        )
    }
}

#[derive(Default)]
struct SessionState {
    waveform: ArcSwap<WaveformFrame>,
    spectrum: ArcSwap<SpectrumFrame>,
    waveform_ticks: AtomicCounter,
    spectrum_ticks: AtomicCounter,
}

#[allow(clippy::too_many_arguments)]
fn spawn_draw_loop<F, S, R>(
    name: &str,
    period: Duration,
    token: CancellationToken,
    mut sink: S,
    state: Arc<SessionState>,
    latest: fn(&SessionState) -> &ArcSwap<F>,
    ticks: fn(&SessionState) -> &AtomicCounter,
    mut render: R,
) -> Result<JoinHandle<()>>
where
    F: Send + Sync + 'static,
    S: FrameSink<F> + 'static,
    R: FnMut((f32, f32)) -> F + Send + 'static,
{
    std::thread::Builder::new()
        .name(name.into())
        .spawn(move || {
            let mut next = Instant::now();
            while !token.is_cancelled() {
                let frame = render(sink.size());
                sink.present(&frame);
                latest(&state).store(Arc::new(frame));
                ticks(&state).add(1);

                next += period;
                let now = Instant::now();
                if next > now {
                    std::thread::sleep(next - now);
                } else {
                    // Fell behind, don't try to catch up
                    next = now;
                }
            }
        })
        .map_err(|e| Error::Output(format!("failed to spawn {name} thread: {e}")))
}

/// A running pair of draw loops.
///
/// Stopping (or dropping) revokes the session token and joins both loops.
/// A stopped session cannot be restarted; attach a new one instead.
pub struct VisualizerSession {
    token: CancellationToken,
    state: Arc<SessionState>,
    threads: Vec<JoinHandle<()>>,
}

impl VisualizerSession {
    /// Last waveform frame published. Empty until the first tick.
    pub fn latest_waveform(&self) -> Arc<WaveformFrame> {
        self.state.waveform.load_full()
    }

    /// Last spectrum frame published. Empty until the first tick.
    pub fn latest_spectrum(&self) -> Arc<SpectrumFrame> {
        self.state.spectrum.load_full()
    }

    pub fn ticks(&self) -> TickCounts {
        TickCounts {
            waveform: self.state.waveform_ticks.get(),
            spectrum: self.state.spectrum_ticks.get(),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Token shared by both loops.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.token.cancel();
        for thread in self.threads.drain(..) {
            if thread.join().is_err() {
                log::error!("Visualizer draw loop panicked");
            }
        }
    }
}

impl Drop for VisualizerSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for VisualizerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisualizerSession")
            .field("running", &self.is_running())
            .field("ticks", &self.ticks())
            .finish()
    }
}
