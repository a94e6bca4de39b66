//! Spectrum bar frames.

use crate::VisualizerConfig;
use serde::{Deserialize, Serialize};

/// Frequencies that get a kHz tick, in order. A tick is placed on the first
/// drawn bin strictly above each of them.
const TICK_FREQUENCIES: [f32; 6] = [0.0, 1000.0, 2000.0, 5000.0, 10000.0, 20000.0];

/// Baseline of tick labels, from the top edge.
const LABEL_Y: f32 = 10.0;

/// A filled rectangle growing up from the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bar {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Text drawn at `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// One spectrum-analyser drawing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpectrumFrame {
    pub width: f32,
    pub height: f32,
    pub bars: Vec<Bar>,
    pub labels: Vec<Label>,
}

impl SpectrumFrame {
    /// Build bars from frequency bytes.
    ///
    /// Bins up to `max_frequency_hz` are decimated so the bars fit the
    /// width, one bar of `bar_width` every `bar_width + bar_margin`. Bins past
    /// the end of `data` read as silence.
    pub fn from_frequency_data(
        data: &[u8],
        sample_rate: u32,
        fft_size: usize,
        width: f32,
        height: f32,
        config: &VisualizerConfig,
    ) -> Self {
        let mut frame = Self {
            width,
            height,
            ..Self::default()
        };

        let pitch = config.bar_width + config.bar_margin;
        let bar_slots = (width / pitch).ceil();
        if bar_slots < 1.0 || sample_rate == 0 || fft_size == 0 {
            return frame;
        }

        let hz_per_bin = sample_rate as f32 / fft_size as f32;
        let max_index = config.max_frequency_hz / hz_per_bin;
        let step = ((max_index / bar_slots).ceil() as usize).max(1);

        let mut ticks = TICK_FREQUENCIES.iter().peekable();
        let mut x = 0.0;
        let mut i = 0usize;
        while (i as f32) < max_index {
            let freq = i as f32 * hz_per_bin;
            if ticks.next_if(|&&tick| freq > tick).is_some() {
                frame.labels.push(Label {
                    x,
                    y: LABEL_Y,
                    text: format!("{}kHz", (freq / 1000.0).floor() as u32),
                });
            }

            let level = data.get(i).copied().unwrap_or(0) as f32 / 255.0;
            let bar_height = level * height;
            frame.bars.push(Bar {
                x,
                y: height - bar_height,
                width: config.bar_width,
                height: bar_height,
            });

            x += pitch;
            i += step;
        }

        frame
    }

    /// Tallest bar height.
    pub fn peak_height(&self) -> f32 {
        self.bars.iter().map(|b| b.height).fold(0.0f32, f32::max)
    }
}
