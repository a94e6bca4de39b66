//! Real-time analyser over the most recent window of the live signal.
//!
//! Byte data follows the browser `AnalyserNode` conventions so frames look
//! the same as they would in a web player.

use crate::VisualizerConfig;
use mixdown_core::SignalTap;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Keeps the last `fft_size` samples and derives time- and frequency-domain
/// byte data from them.
pub struct Analyser {
    fft_size: usize,
    smoothing: f32,
    min_decibels: f32,
    max_decibels: f32,
    /// Circular history, `write_pos` is the oldest sample.
    history: Vec<f32>,
    write_pos: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    spectrum: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    drain_buf: Vec<f32>,
}

impl Analyser {
    pub fn new(config: &VisualizerConfig) -> Self {
        let fft_size = config.fft_size;
        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        Self {
            fft_size,
            smoothing: config.smoothing,
            min_decibels: config.min_decibels,
            max_decibels: config.max_decibels,
            history: vec![0.0; fft_size],
            write_pos: 0,
            window: blackman_window(fft_size),
            fft,
            spectrum: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
            drain_buf: vec![0.0; 1024],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of frequency bins (`fft_size / 2`).
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Append mono samples to the history.
    pub fn push(&mut self, samples: &[f32]) {
        // Only the tail can survive
        let samples = &samples[samples.len().saturating_sub(self.fft_size)..];
        for &s in samples {
            self.history[self.write_pos] = s;
            self.write_pos = (self.write_pos + 1) % self.fft_size;
        }
    }

    /// Drain everything currently waiting in `tap`. Returns samples read.
    pub fn drain(&mut self, tap: &mut SignalTap) -> usize {
        let mut total = 0;
        loop {
            let mut buf = std::mem::take(&mut self.drain_buf);
            let read = tap.read(&mut buf);
            self.push(&buf[..read]);
            self.drain_buf = buf;
            total += read;
            if read < self.drain_buf.len() {
                return total;
            }
        }
    }

    fn ordered(&self) -> impl Iterator<Item = f32> + '_ {
        self.history[self.write_pos..]
            .iter()
            .chain(&self.history[..self.write_pos])
            .copied()
    }

    /// `fft_size` bytes, `128` being silence: `clamp(128 * (1 + x), 0, 255)`.
    pub fn byte_time_domain_data(&self) -> Vec<u8> {
        self.ordered()
            .map(|x| (128.0 * (1.0 + x)).floor().clamp(0.0, 255.0) as u8)
            .collect()
    }

    /// `fft_size / 2` bytes of smoothed magnitude mapped from
    /// `min_decibels..max_decibels` onto `0..255`.
    ///
    /// Each call advances the smoothing state.
    pub fn byte_frequency_data(&mut self) -> Vec<u8> {
        let windowed: Vec<Complex<f32>> = self
            .ordered()
            .zip(&self.window)
            .map(|(s, w)| Complex::new(s * w, 0.0))
            .collect();
        self.spectrum.copy_from_slice(&windowed);
        self.fft.process(&mut self.spectrum);

        let scale = 1.0 / self.fft_size as f32;
        let tau = self.smoothing;
        let min_db = self.min_decibels;
        let range = self.max_decibels - min_db;

        self.smoothed
            .iter_mut()
            .zip(&self.spectrum)
            .map(|(smoothed, bin)| {
                let magnitude = bin.norm() * scale;
                let next = tau * *smoothed + (1.0 - tau) * magnitude;
                *smoothed = if next.is_finite() { next } else { 0.0 };

                if *smoothed <= 0.0 {
                    return 0;
                }
                let db = 20.0 * smoothed.log10();
                (255.0 / range * (db - min_db))
                    .floor()
                    .clamp(0.0, 255.0) as u8
            })
            .collect()
    }
}

impl std::fmt::Debug for Analyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyser")
            .field("fft_size", &self.fft_size)
            .field("smoothing", &self.smoothing)
            .finish_non_exhaustive()
    }
}

/// Blackman window with `alpha = 0.16`.
fn blackman_window(size: usize) -> Vec<f32> {
    let a0 = 0.42;
    let a1 = 0.5;
    let a2 = 0.08;
    (0..size)
        .map(|i| {
            let phase = 2.0 * core::f32::consts::PI * i as f32 / size as f32;
            a0 - a1 * phase.cos() + a2 * (2.0 * phase).cos()
        })
        .collect()
}
