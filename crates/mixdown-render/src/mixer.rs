//! Offline mixer.

use crate::{OfflineContextFactory, Result};
use mixdown_core::{Headroom, MixConfig, RenderContextFactory, RenderLength, SampleBuffer, Track};
use std::sync::Arc;

/// Result of one mix.
#[derive(Debug, Clone)]
pub struct MixedBuffer {
    /// Rendered audio at the mix channel count and sample rate.
    pub buffer: Arc<SampleBuffer>,
    /// Peak level (linear) after headroom handling.
    pub peak_level: f32,
    /// Unmuted tracks that went into the mix.
    pub track_count: usize,
}

impl MixedBuffer {
    pub fn duration_seconds(&self) -> f64 {
        self.buffer.duration_seconds()
    }

    /// Whether any sample exceeds full scale.
    pub fn is_clipping(&self) -> bool {
        self.peak_level > 1.0
    }
}

/// Sums the unmuted tracks, all starting at frame zero, through one
/// offline render context.
///
/// Tracks are scheduled in registry order, so the output is a pure function
/// of the unmuted tracks and that order.
#[derive(Clone)]
pub struct OfflineMixer {
    factory: Arc<dyn RenderContextFactory>,
    config: MixConfig,
}

impl OfflineMixer {
    /// Mixer backed by the built-in [`OfflineContextFactory`].
    pub fn new(config: MixConfig) -> Self {
        Self::with_factory(Arc::new(OfflineContextFactory::new()), config)
    }

    pub fn with_factory(factory: Arc<dyn RenderContextFactory>, config: MixConfig) -> Self {
        Self { factory, config }
    }

    pub fn config(&self) -> &MixConfig {
        &self.config
    }

    pub fn render(&self, tracks: &[Track]) -> Result<MixedBuffer> {
        let config = &self.config;
        let unmuted: Vec<&Track> = tracks.iter().filter(|t| !t.is_muted()).collect();
        let frames = config
            .length
            .frames(config.sample_rate, unmuted.iter().map(|t| t.audio().len()));

        let mut context = self
            .factory
            .create(config.channel_count, config.sample_rate, frames)?;
        for track in &unmuted {
            context.schedule_buffer(track.audio().clone(), 0)?;
        }
        let rendered = context.render_to_completion()?;

        let buffer = match config.headroom {
            Headroom::Raw => rendered,
            Headroom::Clamp => rendered.map_samples(|s| s.clamp(-1.0, 1.0)),
            Headroom::ScaleByTrackCount if unmuted.len() > 1 => {
                let gain = 1.0 / unmuted.len() as f32;
                rendered.map_samples(|s| s * gain)
            }
            Headroom::ScaleByTrackCount => rendered,
        };

        let peak_level = buffer.peak();
        log::debug!(
            "Mixed {} of {} tracks: {} frames, peak {:.3}",
            unmuted.len(),
            tracks.len(),
            buffer.len(),
            peak_level
        );
        if peak_level > 1.0 {
            log::warn!("Mix exceeds full scale (peak {peak_level:.3})");
        }

        Ok(MixedBuffer {
            buffer: Arc::new(buffer),
            peak_level,
            track_count: unmuted.len(),
        })
    }
}

impl std::fmt::Debug for OfflineMixer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineMixer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Mix `tracks` into a buffer of exactly `round(sample_rate * max_duration_seconds)`
/// frames, summing without normalization.
pub fn render(
    tracks: &[Track],
    channel_count: usize,
    sample_rate: u32,
    max_duration_seconds: f64,
) -> Result<MixedBuffer> {
    OfflineMixer::new(MixConfig {
        channel_count,
        sample_rate,
        length: RenderLength::Fixed {
            seconds: max_duration_seconds,
        },
        headroom: Headroom::Raw,
    })
    .render(tracks)
}
