//! Planar sample buffers.

use crate::{Error, Result};
use std::num::{NonZeroU32, NonZeroUsize};

/// Fixed-length multi-channel audio held as one `Vec<f32>` per channel.
///
/// Decoded tracks and rendered mixes both use this type. Only a render
/// context accumulates into one; once shared through `Arc<SampleBuffer>` it
/// is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Build from planar channel data. All channels must have the same length.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if channels.is_empty() {
            return Err(Error::InvalidBuffer("buffer needs at least one channel".into()));
        }
        if sample_rate == 0 {
            return Err(Error::InvalidBuffer("sample rate must be non-zero".into()));
        }
        let frames = channels[0].len();
        if let Some((i, ch)) = channels.iter().enumerate().find(|(_, c)| c.len() != frames) {
            return Err(Error::InvalidBuffer(format!(
                "channel {i} has {} frames, channel 0 has {frames}",
                ch.len()
            )));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Single-channel buffer.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(vec![samples], sample_rate)
    }

    /// All-zero buffer.
    pub fn silent(channel_count: usize, frames: usize, sample_rate: u32) -> Result<Self> {
        Self::new(vec![vec![0.0; frames]; channel_count], sample_rate)
    }

    /// All-zero buffer with a shape that is valid by construction.
    pub fn zeroed(channel_count: NonZeroUsize, frames: usize, sample_rate: NonZeroU32) -> Self {
        Self {
            channels: vec![vec![0.0; frames]; channel_count.get()],
            sample_rate: sample_rate.get(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_seconds(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Samples of one channel.
    ///
    /// # Panics
    /// If `index >= channel_count()`.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Largest absolute sample value across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flatten()
            .map(|s| s.abs())
            .fold(0.0f32, f32::max)
    }

    pub fn is_silent(&self) -> bool {
        self.channels.iter().flatten().all(|&s| s == 0.0)
    }

    /// Mono downmix of frame `index`.
    #[inline]
    pub fn mono_frame(&self, index: usize) -> f32 {
        let sum: f32 = self.channels.iter().map(|c| c[index]).sum();
        sum / self.channels.len() as f32
    }

    /// Adds this buffer into `dest` starting at frame `offset`, converting
    /// channel layout on the way. Frames past the end of `dest` are dropped.
    ///
    /// Layout conversion:
    /// - same count: channel i into channel i
    /// - mono into N: copied into the first two output channels
    /// - stereo into mono: `0.5 * (L + R)`
    /// - anything else: discrete, extra channels dropped, missing ones silent
    pub fn mix_into(&self, dest: &mut [Vec<f32>], offset: usize) {
        let Some(dest_len) = dest.first().map(Vec::len) else {
            return;
        };
        if offset >= dest_len {
            return;
        }
        let frames = self.len().min(dest_len - offset);
        let src_channels = self.channel_count();
        let dest_channels = dest.len();

        match (src_channels, dest_channels) {
            (1, n) if n > 1 => {
                let src = &self.channels[0][..frames];
                for out in dest.iter_mut().take(2) {
                    add_slice(&mut out[offset..offset + frames], src);
                }
            }
            (2, 1) => {
                let (left, right) = (&self.channels[0], &self.channels[1]);
                let out = &mut dest[0][offset..offset + frames];
                for (i, sample) in out.iter_mut().enumerate() {
                    *sample += 0.5 * (left[i] + right[i]);
                }
            }
            _ => {
                for (out, src) in dest.iter_mut().zip(&self.channels) {
                    add_slice(&mut out[offset..offset + frames], &src[..frames]);
                }
            }
        }
    }

    /// Adds `source` into this buffer at frame `offset`, see [`mix_into`](Self::mix_into).
    pub fn add_from(&mut self, source: &SampleBuffer, offset: usize) {
        source.mix_into(&mut self.channels, offset);
    }

    /// Applies `f` to every sample.
    pub fn map_samples(mut self, mut f: impl FnMut(f32) -> f32) -> Self {
        for sample in self.channels.iter_mut().flatten() {
            *sample = f(*sample);
        }
        self
    }

    /// Converts to `channel_count` channels using the rules of [`mix_into`](Self::mix_into).
    pub fn with_channel_count(self, channel_count: usize) -> Result<Self> {
        if channel_count == self.channel_count() {
            return Ok(self);
        }
        let mut channels = vec![vec![0.0; self.len()]; channel_count];
        self.mix_into(&mut channels, 0);
        Self::new(channels, self.sample_rate)
    }
}

#[inline]
fn add_slice(out: &mut [f32], src: &[f32]) {
    for (o, s) in out.iter_mut().zip(src) {
        *o += *s;
    }
}
