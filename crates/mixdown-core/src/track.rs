//! Tracks and the files they come from.

use crate::SampleBuffer;
use serde::{Deserialize, Serialize};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identity of a loaded file: display name plus a digest of its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId {
    pub name: String,
    pub digest: u64,
}

impl SourceId {
    pub fn new(name: impl Into<String>, bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        Self {
            name: name.into(),
            digest: hasher.finish(),
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A loaded audio file: its identity, decoded samples, and mute flag.
#[derive(Debug, Clone)]
pub struct Track {
    source: SourceId,
    audio: Arc<SampleBuffer>,
    muted: bool,
}

impl Track {
    pub fn new(source: SourceId, audio: SampleBuffer, muted: bool) -> Self {
        Self {
            source,
            audio: Arc::new(audio),
            muted,
        }
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    pub fn label(&self) -> &str {
        &self.source.name
    }

    pub fn audio(&self) -> &Arc<SampleBuffer> {
        &self.audio
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub(crate) fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

/// What the display panel shows for one track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackView {
    pub index: usize,
    pub label: String,
    pub muted: bool,
}

/// A selected file that can be read into memory.
pub trait AudioFile: Send + Sync {
    /// Display name.
    fn name(&self) -> &str;

    /// Read the full contents.
    fn read(&self) -> std::io::Result<Vec<u8>>;
}

impl<T: AudioFile + ?Sized> AudioFile for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(&self) -> std::io::Result<Vec<u8>> {
        (**self).read()
    }
}

impl<T: AudioFile + ?Sized> AudioFile for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(&self) -> std::io::Result<Vec<u8>> {
        (**self).read()
    }
}

/// File on the local filesystem.
#[derive(Debug, Clone)]
pub struct PathFile {
    path: PathBuf,
    name: String,
}

impl PathFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AudioFile for PathFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

/// File already held in memory (drag and drop, tests).
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    bytes: Arc<[u8]>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl AudioFile for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.bytes.to_vec())
    }
}
