//! Playback controller: owns everything that exists only while `Playing`.

use crate::Result;
use mixdown_analysis::{
    FrameSink, OffscreenSink, SpectrumFrame, Visualizer, VisualizerSession, WaveformFrame,
};
use mixdown_core::{
    ControlLabel, Error, LiveContext, LiveOutput, OutputHandle, PlaybackEvent, PlaybackFsm,
    PlaybackState, Track,
};
use mixdown_render::{MixedBuffer, OfflineMixer};
use std::sync::Arc;

/// Waveform and spectrum sinks for one playback session.
pub type VisualSinks = (
    Box<dyn FrameSink<WaveformFrame>>,
    Box<dyn FrameSink<SpectrumFrame>>,
);

/// Called at every `Idle -> Playing` to get fresh sinks.
pub type SinkFactory = Box<dyn FnMut() -> VisualSinks + Send>;

/// Sink factory producing off-screen sinks of a fixed size.
pub fn offscreen_sinks(width: f32, height: f32) -> SinkFactory {
    Box::new(move || {
        (
            Box::new(OffscreenSink::new(width, height)),
            Box::new(OffscreenSink::new(width, height)),
        )
    })
}

/// Resources of one playback, created together at `Idle -> Playing` and
/// released together at `Playing -> Idle`.
struct ActivePlayback {
    mix: MixedBuffer,
    context: Box<dyn LiveContext>,
    handle: Box<dyn OutputHandle>,
    visualizer: VisualizerSession,
}

/// Two-state playback machine driving the offline mixer, the live output
/// and the visualizer.
pub struct PlaybackController {
    fsm: PlaybackFsm,
    mixer: OfflineMixer,
    output: Arc<dyn LiveOutput>,
    visualizer: Visualizer,
    sinks: SinkFactory,
    active: Option<ActivePlayback>,
}

impl PlaybackController {
    pub fn new(
        mixer: OfflineMixer,
        output: Arc<dyn LiveOutput>,
        visualizer: Visualizer,
        sinks: SinkFactory,
    ) -> Self {
        Self {
            fsm: PlaybackFsm::new(),
            mixer,
            output,
            visualizer,
            sinks,
            active: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.fsm.state()
    }

    /// Label of the play/stop control: the next available action.
    pub fn control_label(&self) -> ControlLabel {
        self.fsm.state().control_label()
    }

    /// The mix currently playing.
    pub fn mixed_buffer(&self) -> Option<&MixedBuffer> {
        self.active.as_ref().map(|a| &a.mix)
    }

    pub fn visualizer(&self) -> Option<&VisualizerSession> {
        self.active.as_ref().map(|a| &a.visualizer)
    }

    /// Whether the output reached the end of the mix on its own.
    ///
    /// The controller stays `Playing` until told to stop.
    pub fn is_finished(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.handle.is_finished())
    }

    /// Fire whichever event the control currently offers.
    pub fn press(&mut self, tracks: &[Track]) -> Result<PlaybackState> {
        match self.fsm.state().control_event() {
            PlaybackEvent::Play => self.play(tracks)?,
            PlaybackEvent::Stop => self.stop()?,
        }
        Ok(self.fsm.state())
    }

    /// `Idle -> Playing`: mix `tracks`, start output and attach the visualizer.
    ///
    /// Any failure leaves the controller `Idle` with nothing started.
    pub fn play(&mut self, tracks: &[Track]) -> Result<()> {
        self.check(PlaybackEvent::Play)?;

        let mix = self.mixer.render(tracks)?;
        let mut context = self.output.open(mix.buffer.sample_rate())?;

        let started = context.tap_signal().and_then(|tap| {
            let mut handle = context.play_buffer(mix.buffer.clone())?;
            let (waveform, spectrum) = (self.sinks)();
            match self.visualizer.attach(tap, waveform, spectrum) {
                Ok(visualizer) => Ok((handle, visualizer)),
                Err(e) => {
                    handle.stop();
                    Err(e)
                }
            }
        });

        let (handle, visualizer) = match started {
            Ok(parts) => parts,
            Err(e) => {
                if let Err(close_err) = context.close() {
                    log::warn!("Failed to close output after aborted play: {close_err}");
                }
                return Err(e.into());
            }
        };

        log::info!(
            "Playing mix of {} tracks ({:.1}s, peak {:.3})",
            mix.track_count,
            mix.duration_seconds(),
            mix.peak_level
        );
        self.fsm.transition(PlaybackEvent::Play);
        self.active = Some(ActivePlayback {
            mix,
            context,
            handle,
            visualizer,
        });
        Ok(())
    }

    /// `Playing -> Idle`: stop the visualizer and output, release the
    /// context and drop the mix.
    pub fn stop(&mut self) -> Result<()> {
        self.check(PlaybackEvent::Stop)?;
        self.fsm.transition(PlaybackEvent::Stop);

        match self.active.take() {
            Some(active) => teardown(active),
            None => Ok(()),
        }
    }

    fn check(&self, event: PlaybackEvent) -> Result<()> {
        if self.fsm.accepts(event) {
            Ok(())
        } else {
            let state = self.fsm.state();
            log::warn!("Rejected {event:?} while {state:?}");
            Err(Error::InvalidTransition { state, event }.into())
        }
    }
}

fn teardown(active: ActivePlayback) -> Result<()> {
    let ActivePlayback {
        mix,
        context,
        mut handle,
        visualizer,
    } = active;

    visualizer.stop();
    handle.stop();
    drop(handle);
    context.close()?;
    log::debug!("Released mix of {} frames", mix.buffer.len());
    Ok(())
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            if let Err(e) = teardown(active) {
                log::warn!("Error tearing down playback: {e}");
            }
        }
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.fsm.state())
            .field("mixer", &self.mixer)
            .field("visualizer", &self.visualizer)
            .finish_non_exhaustive()
    }
}
