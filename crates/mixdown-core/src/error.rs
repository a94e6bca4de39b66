//! Error types for mixdown-core.

use crate::playback::{PlaybackEvent, PlaybackState};
use thiserror::Error;

/// Error type for mixdown-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("File batch is empty")]
    EmptyBatch,

    #[error("Failed to read '{source_name}': {source}")]
    Io {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode '{source_name}': {source}")]
    Decode {
        source_name: String,
        #[source]
        source: DecodeError,
    },

    #[error("Track index {index} out of range ({len} tracks)")]
    Index { index: usize, len: usize },

    #[error("Mute state count {actual} does not match track count {expected}")]
    MuteStateMismatch { expected: usize, actual: usize },

    #[error("Invalid buffer: {0}")]
    InvalidBuffer(String),

    #[error("Cannot apply {event:?} while {state:?}")]
    InvalidTransition {
        state: PlaybackState,
        event: PlaybackEvent,
    },

    #[error("Live output error: {0}")]
    Output(String),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors from turning encoded bytes into a [`SampleBuffer`](crate::SampleBuffer).
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("No audio data")]
    Empty,

    #[error("Unsupported audio: {0}")]
    Unsupported(String),

    #[error("Malformed audio: {0}")]
    Malformed(String),

    #[error("Resampling failed: {0}")]
    Resample(String),
}

// Conversions from decoder library errors at the API boundary

#[cfg(feature = "wav")]
impl From<hound::Error> for DecodeError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::Unsupported => DecodeError::Unsupported("WAV sample format".into()),
            hound::Error::IoError(io) => DecodeError::Malformed(io.to_string()),
            other => DecodeError::Malformed(other.to_string()),
        }
    }
}

#[cfg(feature = "compressed")]
impl From<symphonia::core::errors::Error> for DecodeError {
    fn from(e: symphonia::core::errors::Error) -> Self {
        use symphonia::core::errors::Error as SymphoniaError;
        match e {
            SymphoniaError::Unsupported(what) => DecodeError::Unsupported(what.into()),
            other => DecodeError::Malformed(other.to_string()),
        }
    }
}

#[cfg(feature = "resample")]
impl From<rubato::ResamplerConstructionError> for DecodeError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        DecodeError::Resample(e.to_string())
    }
}

#[cfg(feature = "resample")]
impl From<rubato::ResampleError> for DecodeError {
    fn from(e: rubato::ResampleError) -> Self {
        DecodeError::Resample(e.to_string())
    }
}

/// Errors from offline render context construction or execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Invalid channel count: {0}. Must be between 1 and 32")]
    InvalidChannelCount(usize),

    #[error("Invalid sample rate: {0}. Must be between 3000 and 768000 Hz")]
    InvalidSampleRate(u32),

    #[error("Invalid render length: {0} frames")]
    InvalidLength(usize),

    #[error("Render length {requested} frames exceeds host limit of {limit}")]
    LengthExceedsLimit { requested: usize, limit: usize },

    #[error("Buffer sample rate {actual} Hz does not match context rate {expected} Hz")]
    SampleRateMismatch { expected: u32, actual: u32 },
}
