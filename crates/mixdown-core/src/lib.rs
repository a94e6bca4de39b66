//! Track model, host boundary and playback state machine for mixdown.
//!
//! # Primary API
//!
//! - [`TrackRegistry`] / [`TrackLoader`]: Decoded tracks and their mute flags
//! - [`MixConfig`]: Channel count, sample rate, render length and headroom
//! - [`PlaybackFsm`]: `Idle <-> Playing`
//! - [`signal_tap`]: Output-to-visualizer sample stream
//!
//! # Host boundary
//!
//! Everything that touches a codec, device or widget sits behind a trait in
//! [`host`]: [`Decoder`], [`RenderContextFactory`], [`LiveOutput`] and
//! [`DisplayPanel`].
//!
//! # Feature-gated APIs
//!
//! - `"wav"`: [`WavDecoder`] (enabled by default)
//! - `"compressed"`: [`SymphoniaDecoder`] for FLAC, MP3, Ogg Vorbis and MP4
//!   audio (enabled by default)
//! - `"resample"`: [`resample`], pulled in by either decoder
//! - `"cpal"`: `CpalOutput` for audible playback
//!
//! # Example
//!
//! ```ignore
//! use mixdown_core::*;
//! use std::sync::Arc;
//!
//! let config = MixConfig::default();
//! let loader = TrackLoader::new(Arc::new(WavDecoder::new()), config.decode_target());
//!
//! let mut registry = TrackRegistry::new();
//! registry.load(&[PathFile::new("drums.wav"), PathFile::new("bass.wav")], &loader)?;
//! registry.toggle_mute(1)?;
//! ```

pub mod error;
pub use error::{DecodeError, Error, RenderError, Result};

pub mod config;
pub use config::{
    Headroom, MixConfig, RenderLength, MAX_CHANNELS, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE,
    RENDER_QUANTUM,
};

mod buffer;
pub use buffer::SampleBuffer;

mod track;
pub use track::{AudioFile, MemoryFile, PathFile, SourceId, Track, TrackView};

pub mod host;
pub use host::{
    ControlLabel, DecodeTarget, Decoder, DisplayPanel, LiveContext, LiveOutput, OutputHandle,
    RenderContext, RenderContextFactory,
};

pub mod lockfree;
pub use lockfree::CancellationToken;

mod tap;
pub use tap::{signal_tap, SignalTap, TapWriter};

mod loader;
pub use loader::TrackLoader;

mod registry;
pub use registry::TrackRegistry;

mod playback;
pub use playback::{PlaybackEvent, PlaybackFsm, PlaybackState, TransitionResult};

pub mod decode;
#[cfg(feature = "compressed")]
pub use decode::SymphoniaDecoder;
#[cfg(feature = "wav")]
pub use decode::WavDecoder;
#[cfg(feature = "resample")]
pub use decode::{resample, ResampleQuality};

pub mod output;
pub use output::HeadlessOutput;
#[cfg(feature = "cpal")]
pub use output::CpalOutput;
