//! Built-in decoders.
//!
//! - `wav` (default): RIFF/WAVE via hound
//! - `compressed` (default): FLAC, MP3, Ogg Vorbis and MP4 audio via symphonia
//!
//! Both resample with rubato to the session rate.

#[cfg(feature = "compressed")]
mod compressed;
#[cfg(feature = "resample")]
pub mod resample;
#[cfg(feature = "wav")]
mod wav;

#[cfg(feature = "compressed")]
pub use compressed::SymphoniaDecoder;
#[cfg(feature = "resample")]
pub use resample::{resample, ResampleQuality};
#[cfg(feature = "wav")]
pub use wav::WavDecoder;

/// Split interleaved samples into one vector per channel.
#[cfg(feature = "resample")]
pub(crate) fn deinterleave(interleaved: &[f32], channel_count: usize) -> Vec<Vec<f32>> {
    let frames = interleaved.len() / channel_count.max(1);
    let mut planar = vec![Vec::with_capacity(frames); channel_count];
    for frame in interleaved.chunks_exact(channel_count.max(1)) {
        for (ch, &sample) in planar.iter_mut().zip(frame) {
            ch.push(sample);
        }
    }
    planar
}
