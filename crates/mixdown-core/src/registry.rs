//! Ordered track list with mute flags.
//!
//! The registry is the only owner of mute state. Displays render
//! [`TrackView`] projections of it and forward clicks back as
//! [`TrackRegistry::toggle_mute`].

use crate::{AudioFile, Error, Result, SampleBuffer, SourceId, Track, TrackLoader, TrackView};

/// Tracks in load order (which is also display order).
#[derive(Debug, Default)]
pub struct TrackRegistry {
    tracks: Vec<Track>,
    revision: u64,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and decode every file, then replace the whole registry.
    ///
    /// The first file starts unmuted, the rest muted. If any file fails to
    /// read or decode, or `files` is empty, the registry is left untouched.
    pub fn load<F: AudioFile>(&mut self, files: &[F], loader: &TrackLoader) -> Result<()> {
        let decoded = loader.decode_batch(files)?;
        self.replace(decoded);
        Ok(())
    }

    /// Replace the registry with already-decoded audio, applying the default
    /// mute policy.
    pub fn replace(&mut self, decoded: Vec<(SourceId, SampleBuffer)>) {
        self.tracks = decoded
            .into_iter()
            .enumerate()
            .map(|(i, (source, audio))| Track::new(source, audio, i != 0))
            .collect();
        self.revision += 1;
        log::info!("Loaded {} tracks (revision {})", self.tracks.len(), self.revision);
    }

    /// Flip the mute flag of one track. Returns the new flag.
    pub fn toggle_mute(&mut self, index: usize) -> Result<bool> {
        let len = self.tracks.len();
        let track = self
            .tracks
            .get_mut(index)
            .ok_or(Error::Index { index, len })?;
        let muted = !track.is_muted();
        track.set_muted(muted);
        self.revision += 1;
        log::debug!("Track {index} ({}) muted={muted}", track.label());
        Ok(muted)
    }

    /// Overwrite every mute flag from an externally held display order.
    ///
    /// For hosts whose widgets own the flags. `states` must have one entry
    /// per track.
    pub fn apply_mute_states(&mut self, states: &[bool]) -> Result<()> {
        if states.len() != self.tracks.len() {
            return Err(Error::MuteStateMismatch {
                expected: self.tracks.len(),
                actual: states.len(),
            });
        }
        for (track, &muted) in self.tracks.iter_mut().zip(states) {
            track.set_muted(muted);
        }
        self.revision += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn mute_states(&self) -> Vec<bool> {
        self.tracks.iter().map(Track::is_muted).collect()
    }

    /// Tracks that take part in a mix, in registry order.
    pub fn unmuted(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(|t| !t.is_muted())
    }

    /// Display projection.
    pub fn views(&self) -> Vec<TrackView> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(index, t)| TrackView {
                index,
                label: t.label().to_string(),
                muted: t.is_muted(),
            })
            .collect()
    }

    /// Bumped on every change.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
