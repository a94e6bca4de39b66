//! Batch read + decode of selected files.

use crate::{AudioFile, DecodeTarget, Decoder, Error, Result, SampleBuffer, SourceId};
use rayon::prelude::*;
use std::sync::Arc;

/// Reads and decodes a file batch in parallel.
///
/// Decodes may finish in any order; results come back in submission order,
/// and only once every file has succeeded.
#[derive(Clone)]
pub struct TrackLoader {
    decoder: Arc<dyn Decoder>,
    target: DecodeTarget,
}

impl TrackLoader {
    pub fn new(decoder: Arc<dyn Decoder>, target: DecodeTarget) -> Self {
        Self { decoder, target }
    }

    pub fn target(&self) -> DecodeTarget {
        self.target
    }

    pub fn decode_batch<F: AudioFile>(&self, files: &[F]) -> Result<Vec<(SourceId, SampleBuffer)>> {
        if files.is_empty() {
            return Err(Error::EmptyBatch);
        }
        log::debug!(
            "Decoding {} files to {} ch @ {} Hz",
            files.len(),
            self.target.channel_count,
            self.target.sample_rate
        );
        files.par_iter().map(|file| self.decode_file(file)).collect()
    }

    fn decode_file<F: AudioFile>(&self, file: &F) -> Result<(SourceId, SampleBuffer)> {
        let source_name = file.name().to_string();
        let bytes = file.read().map_err(|source| Error::Io {
            source_name: source_name.clone(),
            source,
        })?;
        let id = SourceId::new(source_name, &bytes);
        let buffer = self
            .decoder
            .decode(&bytes, self.target)
            .map_err(|source| Error::Decode {
                source_name: id.name.clone(),
                source,
            })?;
        Ok((id, buffer))
    }
}

impl std::fmt::Debug for TrackLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackLoader")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
