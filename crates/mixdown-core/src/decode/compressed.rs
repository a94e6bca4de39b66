//! Compressed and container formats via symphonia.

use super::deinterleave;
use super::resample::{resample, ResampleQuality};
use crate::{DecodeError, DecodeTarget, Decoder, SampleBuffer};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer as PcmBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decodes anything symphonia recognizes: FLAC, MP3, Ogg Vorbis, AAC/ALAC in
/// MP4 and WAV.
///
/// With the `wav` feature, RIFF/WAVE input takes the hound path instead.
/// Corrupt packets are skipped with a warning; the rest of the stream still
/// decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder {
    quality: ResampleQuality,
}

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quality(quality: ResampleQuality) -> Self {
        Self { quality }
    }
}

fn is_riff_wave(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

impl Decoder for SymphoniaDecoder {
    fn decode(&self, bytes: &[u8], target: DecodeTarget) -> Result<SampleBuffer, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        #[cfg(feature = "wav")]
        if is_riff_wave(bytes) {
            return super::WavDecoder::with_quality(self.quality).decode(bytes, target);
        }

        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
        let mut hint = Hint::new();
        if is_riff_wave(bytes) {
            hint.with_extension("wav");
        }
        let detected = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = detected.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DecodeError::Unsupported("no decodable audio track".into()))?;
        let track_id = track.id;
        let source_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| DecodeError::Malformed("stream has no sample rate".into()))?;
        let mut decoder =
            symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        let mut interleaved: Vec<f32> = Vec::new();
        let mut channel_count = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);
        let mut pcm: Option<PcmBuffer<f32>> = None;
        let mut skipped = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break
                }
                Err(e) => return Err(e.into()),
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("Skipping corrupt packet at ts {}: {e}", packet.ts());
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            let capacity = decoded.capacity();
            let buf = match pcm.take() {
                Some(buf) if buf.capacity() >= capacity => buf,
                _ => PcmBuffer::new(capacity as u64, spec),
            };
            let buf = pcm.insert(buf);
            buf.copy_interleaved_ref(decoded);
            channel_count = spec.channels.count();
            interleaved.extend_from_slice(buf.samples());
        }

        if channel_count == 0 || interleaved.is_empty() {
            return Err(DecodeError::Empty);
        }
        if skipped > 0 {
            log::debug!("Decoded with {skipped} corrupt packets dropped");
        }

        let planar = deinterleave(&interleaved, channel_count);
        let planar = resample(&planar, source_rate, target.sample_rate, self.quality)?;

        SampleBuffer::new(planar, target.sample_rate)
            .and_then(|buffer| buffer.with_channel_count(target.channel_count))
            .map_err(|e| DecodeError::Malformed(e.to_string()))
    }
}
