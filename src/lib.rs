//! # Mixdown - Multitrack Mix Player
//!
//! Load a batch of audio files as tracks, mute the ones you don't want,
//! and play back an offline mix of the rest while a live waveform and
//! spectrum follow the output.
//!
//! ## Architecture
//!
//! Mixdown is an umbrella crate that coordinates:
//! - **mixdown-core** - Track registry, host traits, signal tap, playback FSM, WAV decoding
//! - **mixdown-render** - Offline render context and mixer
//! - **mixdown-analysis** - Analyser, waveform and spectrum frames, visualizer loops
//!
//! ## Quick Start
//!
//! ```ignore
//! use mixdown::prelude::*;
//!
//! let mut engine = MixdownEngine::builder()
//!     .sample_rate(44100)
//!     .build()?;
//!
//! engine.load(&[PathFile::new("a.wav"), PathFile::new("b.wav")])?;
//! engine.toggle_mute(1)?;
//!
//! engine.press_control()?; // Idle -> Playing
//! let frame = engine.visualizer().map(|v| v.latest_spectrum());
//! engine.press_control()?; // Playing -> Idle
//! ```
//!
//! ## Feature Flags
//!
//! - `wav` (default) - WAV decoding with resampling
//! - `cpal` - Playback through the system audio device

/// Re-export of mixdown-core for direct access
pub use mixdown_core as core;
pub use mixdown_analysis as analysis;
pub use mixdown_render as render;

mod builder;
mod engine;
mod error;
mod playback;

pub use builder::MixdownEngineBuilder;
pub use engine::MixdownEngine;
pub use error::{Error, Result};
pub use playback::{offscreen_sinks, PlaybackController, SinkFactory, VisualSinks};

pub use mixdown_core::{
    AudioFile, ControlLabel, DisplayPanel, Headroom, HeadlessOutput, LiveOutput, MemoryFile,
    MixConfig, PathFile, PlaybackState, RenderLength, SampleBuffer, Track, TrackView,
};

#[cfg(feature = "cpal")]
pub use mixdown_core::CpalOutput;

pub use mixdown_analysis::{
    FrameSink, OffscreenSink, SpectrumFrame, VisualizerConfig, VisualizerSession, WaveformFrame,
};
pub use mixdown_render::MixedBuffer;

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::{Error, MixdownEngine, MixdownEngineBuilder, Result};

    pub use mixdown_core::{
        AudioFile, ControlLabel, DisplayPanel, Headroom, MemoryFile, MixConfig, PathFile,
        PlaybackState, RenderLength, TrackView,
    };

    pub use mixdown_analysis::{FrameSink, SpectrumFrame, VisualizerConfig, WaveformFrame};
}
