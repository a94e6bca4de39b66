//! Visualizer configuration.

use mixdown_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Analyser and drawing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Samples per analysis window. Power of two in `32..=32768`.
    pub fft_size: usize,
    /// Spectrum smoothing between successive frames, `0.0..=1.0`.
    pub smoothing: f32,
    /// Level mapped to byte 0.
    pub min_decibels: f32,
    /// Level mapped to byte 255.
    pub max_decibels: f32,
    /// Ticks per second for each draw loop.
    pub refresh_hz: f32,
    /// Highest frequency the spectrum view shows.
    pub max_frequency_hz: f32,
    pub bar_width: f32,
    pub bar_margin: f32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
            refresh_hz: 60.0,
            max_frequency_hz: 20500.0,
            bar_width: 4.0,
            bar_margin: 1.0,
        }
    }
}

impl VisualizerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(Error::InvalidConfig(format!(
                "FFT size {} must be a power of two between 32 and 32768",
                self.fft_size
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(Error::InvalidConfig(format!(
                "Smoothing {} must be between 0 and 1",
                self.smoothing
            )));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(Error::InvalidConfig(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        if !(self.refresh_hz > 0.0 && self.refresh_hz.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "Refresh rate {} must be positive",
                self.refresh_hz
            )));
        }
        if self.max_frequency_hz <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "Max frequency {} must be positive",
                self.max_frequency_hz
            )));
        }
        if self.bar_width <= 0.0 || self.bar_margin < 0.0 {
            return Err(Error::InvalidConfig(
                "Bar width must be positive and margin non-negative".into(),
            ));
        }
        Ok(())
    }
}
