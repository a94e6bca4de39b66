//! Sample rate conversion using rubato

use crate::DecodeError;
use rubato::{FftFixedIn, Resampler};

/// Resampling quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleQuality {
    /// Fast resampling (lower quality)
    Fast,
    /// Balanced quality/speed (default)
    #[default]
    Medium,
    /// High quality
    High,
}

impl ResampleQuality {
    fn chunk_size(&self) -> usize {
        match self {
            ResampleQuality::Fast => 512,
            ResampleQuality::Medium => 1024,
            ResampleQuality::High => 2048,
        }
    }

    fn sub_chunks(&self) -> usize {
        match self {
            ResampleQuality::Fast => 1,
            ResampleQuality::Medium => 2,
            ResampleQuality::High => 4,
        }
    }
}

/// Convert planar `channels` from `source_rate` to `target_rate`.
///
/// Output length is `ceil(frames * target_rate / source_rate)` and frame 0 of
/// the output lines up with frame 0 of the input.
pub fn resample(
    channels: &[Vec<f32>],
    source_rate: u32,
    target_rate: u32,
    quality: ResampleQuality,
) -> Result<Vec<Vec<f32>>, DecodeError> {
    if source_rate == target_rate || channels.is_empty() {
        return Ok(channels.to_vec());
    }

    let input_frames = channels[0].len();
    if channels.iter().any(|c| c.len() != input_frames) {
        return Err(DecodeError::Malformed(
            "channels have different lengths".into(),
        ));
    }
    if input_frames == 0 {
        return Ok(vec![Vec::new(); channels.len()]);
    }

    let chunk_size = quality.chunk_size();
    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        chunk_size,
        quality.sub_chunks(),
        channels.len(),
    )?;

    let expected_output_frames =
        (input_frames as f64 * target_rate as f64 / source_rate as f64).ceil() as usize;
    // The filter delays everything by `output_delay` frames; skip them and
    // keep flushing silence until the input tail has come out.
    let delay = resampler.output_delay();
    let wanted = delay + expected_output_frames;
    let mut output: Vec<Vec<f32>> =
        vec![Vec::with_capacity(wanted + chunk_size); channels.len()];

    let mut pos = 0;
    while output[0].len() < wanted {
        let needed = resampler.input_frames_next();
        let copy_frames = (input_frames - pos).min(needed);

        // Zero-padded past the end of the input
        let chunk: Vec<Vec<f32>> = channels
            .iter()
            .map(|c| {
                let mut block = vec![0.0f32; needed];
                block[..copy_frames].copy_from_slice(&c[pos..pos + copy_frames]);
                block
            })
            .collect();

        let processed = resampler.process(&chunk, None)?;
        for (out, block) in output.iter_mut().zip(processed) {
            out.extend_from_slice(&block);
        }

        pos += copy_frames;
    }

    for out in &mut output {
        out.drain(..delay);
        out.truncate(expected_output_frames);
    }

    Ok(output)
}
