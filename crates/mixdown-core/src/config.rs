//! Mix configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Lowest sample rate an offline context accepts.
pub const MIN_SAMPLE_RATE: u32 = 3000;
/// Highest sample rate an offline context accepts.
pub const MAX_SAMPLE_RATE: u32 = 768_000;
/// Highest channel count an offline context accepts.
pub const MAX_CHANNELS: usize = 32;
/// Frames rendered when a dynamic length has nothing to size against.
pub const RENDER_QUANTUM: usize = 128;

/// How long the mixed buffer is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RenderLength {
    /// Always exactly `sample_rate * seconds` frames. Longer tracks are
    /// truncated, shorter ones padded with silence.
    Fixed { seconds: f64 },
    /// Length of the longest unmuted track, capped at `max_seconds`.
    LongestTrack { max_seconds: f64 },
}

impl Default for RenderLength {
    fn default() -> Self {
        RenderLength::Fixed { seconds: 60.0 }
    }
}

impl RenderLength {
    fn seconds(&self) -> f64 {
        match *self {
            RenderLength::Fixed { seconds } => seconds,
            RenderLength::LongestTrack { max_seconds } => max_seconds,
        }
    }

    /// Frame count for a render at `sample_rate`, given the lengths of the
    /// tracks that will be scheduled.
    pub fn frames(&self, sample_rate: u32, track_lengths: impl IntoIterator<Item = usize>) -> usize {
        let cap = (self.seconds() * sample_rate as f64).round() as usize;
        match self {
            RenderLength::Fixed { .. } => cap,
            RenderLength::LongestTrack { .. } => track_lengths
                .into_iter()
                .max()
                .map(|longest| longest.min(cap))
                .filter(|&frames| frames > 0)
                .unwrap_or(RENDER_QUANTUM.min(cap.max(1))),
        }
    }
}

/// What happens to the summed signal before it is handed to playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Headroom {
    /// Plain sample-wise sum. Peaks above full scale are kept as-is.
    #[default]
    Raw,
    /// Hard clip to [-1.0, 1.0].
    Clamp,
    /// Multiply by `1 / n` where `n` is the number of unmuted tracks.
    ScaleByTrackCount,
}

/// Configuration for the offline mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    pub channel_count: usize,
    pub sample_rate: u32,
    pub length: RenderLength,
    pub headroom: Headroom,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            channel_count: 2,
            sample_rate: 44100,
            length: RenderLength::default(),
            headroom: Headroom::default(),
        }
    }
}

impl MixConfig {
    pub fn validate(&self) -> Result<()> {
        if self.channel_count == 0 || self.channel_count > MAX_CHANNELS {
            return Err(Error::InvalidConfig(format!(
                "channel_count {} out of range (1-{MAX_CHANNELS})",
                self.channel_count
            )));
        }
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range ({MIN_SAMPLE_RATE}-{MAX_SAMPLE_RATE} Hz)",
                self.sample_rate
            )));
        }
        let seconds = self.length.seconds();
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "render length {seconds} s must be positive"
            )));
        }
        Ok(())
    }

    /// Decode target matching this mix.
    pub fn decode_target(&self) -> crate::DecodeTarget {
        crate::DecodeTarget {
            channel_count: self.channel_count,
            sample_rate: self.sample_rate,
        }
    }
}
