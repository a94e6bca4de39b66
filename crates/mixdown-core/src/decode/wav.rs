//! WAV decoding via hound.

use super::deinterleave;
use super::resample::{resample, ResampleQuality};
use crate::{DecodeError, DecodeTarget, Decoder, SampleBuffer};
use std::io::Cursor;

/// Decodes RIFF/WAVE bytes (integer or float PCM) to the target layout.
///
/// Integer samples are normalized by `2^(bits - 1)`. Audio at a different
/// rate is resampled, and the channel count is adapted with the same
/// up/down-mix rules the offline context uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder {
    quality: ResampleQuality,
}

impl WavDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quality(quality: ResampleQuality) -> Self {
        Self { quality }
    }
}

impl Decoder for WavDecoder {
    fn decode(&self, bytes: &[u8], target: DecodeTarget) -> Result<SampleBuffer, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let channel_count = spec.channels as usize;
        if channel_count == 0 {
            return Err(DecodeError::Malformed("zero channels".into()));
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(DecodeError::Unsupported(format!(
                        "{}-bit integer PCM",
                        spec.bits_per_sample
                    )));
                }
                let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let planar = deinterleave(&interleaved, channel_count);
        let planar = resample(&planar, spec.sample_rate, target.sample_rate, self.quality)?;

        SampleBuffer::new(planar, target.sample_rate)
            .and_then(|buffer| buffer.with_channel_count(target.channel_count))
            .map_err(|e| DecodeError::Malformed(e.to_string()))
    }
}
