//! MixdownEngine that coordinates loading, mixing and playback.

use crate::playback::PlaybackController;
use crate::{MixdownEngineBuilder, Result};
use mixdown_analysis::VisualizerSession;
use mixdown_core::{
    AudioFile, ControlLabel, DisplayPanel, MixConfig, PlaybackState, Track, TrackLoader,
    TrackRegistry, TrackView,
};
use mixdown_render::MixedBuffer;

/// Main engine: a track registry, the playback controller and an optional
/// display panel kept in sync with both.
///
/// The registry is the only owner of mute flags. The display is refreshed
/// after every successful load or toggle and is told the control label after
/// every play or stop.
///
/// # Example
///
/// ```ignore
/// use mixdown::prelude::*;
///
/// let mut engine = MixdownEngine::builder().build()?;
/// engine.load(&[PathFile::new("drums.wav"), PathFile::new("bass.wav")])?;
///
/// engine.toggle_mute(1)?;
/// engine.press_control()?; // Play
/// engine.press_control()?; // Stop
/// ```
pub struct MixdownEngine {
    registry: TrackRegistry,
    loader: TrackLoader,
    controller: PlaybackController,
    display: Option<Box<dyn DisplayPanel>>,
    config: MixConfig,
}

impl MixdownEngine {
    pub fn builder() -> MixdownEngineBuilder {
        MixdownEngineBuilder::default()
    }

    pub(crate) fn from_parts(
        registry: TrackRegistry,
        loader: TrackLoader,
        controller: PlaybackController,
        display: Option<Box<dyn DisplayPanel>>,
        config: MixConfig,
    ) -> Self {
        let mut engine = Self {
            registry,
            loader,
            controller,
            display,
            config,
        };
        engine.show_control();
        engine
    }

    /// Replace all tracks with the decoded `files`, in the given order.
    ///
    /// The first track starts unmuted and the rest muted. Any read or decode
    /// failure aborts the whole batch and leaves the current tracks as they
    /// were. An empty batch is rejected without touching the display.
    pub fn load<F: AudioFile>(&mut self, files: &[F]) -> Result<()> {
        if files.is_empty() {
            log::warn!("Ignoring empty file batch");
            return Err(mixdown_core::Error::EmptyBatch.into());
        }

        self.with_display(|d| d.set_busy(true));
        let decoded = self.loader.decode_batch(files);
        self.with_display(|d| d.set_busy(false));

        match decoded {
            Ok(decoded) => {
                self.registry.replace(decoded);
                self.refresh();
                Ok(())
            }
            Err(e) => {
                log::warn!("Load aborted: {e}");
                self.with_display(|d| d.show_error(&e));
                Err(e.into())
            }
        }
    }

    /// Flip one track's mute flag. Returns the new flag.
    pub fn toggle_mute(&mut self, index: usize) -> Result<bool> {
        match self.registry.toggle_mute(index) {
            Ok(muted) => {
                self.refresh();
                Ok(muted)
            }
            Err(e) => {
                log::error!("Mute toggle for unknown track: {e}");
                Err(e.into())
            }
        }
    }

    /// Overwrite every mute flag from a display that keeps its own flags.
    pub fn apply_mute_states(&mut self, states: &[bool]) -> Result<()> {
        self.registry.apply_mute_states(states)?;
        self.refresh();
        Ok(())
    }

    /// The single play/stop control: plays when idle, stops when playing.
    pub fn press_control(&mut self) -> Result<PlaybackState> {
        let result = self.controller.press(self.registry.tracks());
        self.after_transition(result)
    }

    /// Mix the unmuted tracks and start playing them.
    pub fn play(&mut self) -> Result<()> {
        let result = self.controller.play(self.registry.tracks());
        self.after_transition(result)
    }

    /// Stop playback and release the output.
    pub fn stop(&mut self) -> Result<()> {
        let result = self.controller.stop();
        self.after_transition(result)
    }

    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    pub fn control_label(&self) -> ControlLabel {
        self.controller.control_label()
    }

    pub fn tracks(&self) -> &[Track] {
        self.registry.tracks()
    }

    pub fn track_views(&self) -> Vec<TrackView> {
        self.registry.views()
    }

    /// The mix being played, while `Playing`.
    pub fn mixed_buffer(&self) -> Option<&MixedBuffer> {
        self.controller.mixed_buffer()
    }

    /// The live visualizer, while `Playing`.
    pub fn visualizer(&self) -> Option<&VisualizerSession> {
        self.controller.visualizer()
    }

    /// Whether the current playback has reached the end of the mix.
    pub fn is_finished(&self) -> bool {
        self.controller.is_finished()
    }

    pub fn config(&self) -> &MixConfig {
        &self.config
    }

    fn after_transition<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            let core = e.as_core();
            self.with_display(|d| d.show_error(core));
        }
        self.show_control();
        result
    }

    fn refresh(&mut self) {
        if let Some(display) = self.display.as_mut() {
            display.refresh(&self.registry.views());
        }
    }

    fn show_control(&mut self) {
        let label = self.controller.control_label();
        self.with_display(|d| d.show_control(label));
    }

    fn with_display(&mut self, f: impl FnOnce(&mut dyn DisplayPanel)) {
        if let Some(display) = self.display.as_mut() {
            f(display.as_mut());
        }
    }
}

impl std::fmt::Debug for MixdownEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixdownEngine")
            .field("tracks", &self.registry.len())
            .field("state", &self.controller.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
