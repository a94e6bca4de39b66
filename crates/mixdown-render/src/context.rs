//! Software offline render context.

use crate::Result;
use mixdown_core::{
    RenderContext, RenderContextFactory, RenderError, SampleBuffer, MAX_CHANNELS,
    MAX_SAMPLE_RATE, MIN_SAMPLE_RATE,
};
use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::Arc;

/// Ten minutes at 48 kHz.
pub const DEFAULT_MAX_FRAMES: usize = 48_000 * 60 * 10;

/// Creates [`OfflineContext`]s, enforcing the limits a browser offline
/// audio context has plus a cap on buffer length.
#[derive(Debug, Clone, Copy)]
pub struct OfflineContextFactory {
    max_frames: usize,
}

impl Default for OfflineContextFactory {
    fn default() -> Self {
        Self {
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}

impl OfflineContextFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest buffer, in frames, a context may be created with.
    pub fn with_max_frames(max_frames: usize) -> Self {
        Self { max_frames }
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Concrete-typed variant of [`RenderContextFactory::create`].
    pub fn create_context(
        &self,
        channel_count: usize,
        sample_rate: u32,
        length_frames: usize,
    ) -> Result<OfflineContext> {
        let channels = NonZeroUsize::new(channel_count)
            .filter(|c| c.get() <= MAX_CHANNELS)
            .ok_or(RenderError::InvalidChannelCount(channel_count))?;
        let rate = NonZeroU32::new(sample_rate)
            .filter(|r| (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&r.get()))
            .ok_or(RenderError::InvalidSampleRate(sample_rate))?;
        if length_frames == 0 {
            return Err(RenderError::InvalidLength(length_frames));
        }
        if length_frames > self.max_frames {
            return Err(RenderError::LengthExceedsLimit {
                requested: length_frames,
                limit: self.max_frames,
            });
        }

        log::debug!(
            "Offline context: {channel_count} ch @ {sample_rate} Hz, {length_frames} frames"
        );
        Ok(OfflineContext {
            output: SampleBuffer::zeroed(channels, length_frames, rate),
            scheduled: Vec::new(),
        })
    }
}

impl RenderContextFactory for OfflineContextFactory {
    fn create(
        &self,
        channel_count: usize,
        sample_rate: u32,
        length_frames: usize,
    ) -> Result<Box<dyn RenderContext>> {
        Ok(Box::new(self.create_context(
            channel_count,
            sample_rate,
            length_frames,
        )?))
    }
}

/// A fixed-length output buffer plus the sources scheduled into it.
///
/// Rendering sums sources in the order they were scheduled, each starting
/// at its own offset and cut off at the end of the buffer.
#[derive(Debug)]
pub struct OfflineContext {
    output: SampleBuffer,
    scheduled: Vec<(Arc<SampleBuffer>, usize)>,
}

impl OfflineContext {
    pub fn channel_count(&self) -> usize {
        self.output.channel_count()
    }

    pub fn sample_rate(&self) -> u32 {
        self.output.sample_rate()
    }

    pub fn length_frames(&self) -> usize {
        self.output.len()
    }

    /// Number of sources scheduled so far.
    pub fn scheduled(&self) -> usize {
        self.scheduled.len()
    }

    fn render(self) -> SampleBuffer {
        let mut output = self.output;
        for (buffer, offset) in &self.scheduled {
            output.add_from(buffer, *offset);
        }
        output
    }
}

impl RenderContext for OfflineContext {
    fn schedule_buffer(&mut self, buffer: Arc<SampleBuffer>, start_offset: usize) -> Result<()> {
        if buffer.sample_rate() != self.sample_rate() {
            return Err(RenderError::SampleRateMismatch {
                expected: self.sample_rate(),
                actual: buffer.sample_rate(),
            });
        }
        self.scheduled.push((buffer, start_offset));
        Ok(())
    }

    fn render_to_completion(self: Box<Self>) -> Result<SampleBuffer> {
        Ok((*self).render())
    }
}
