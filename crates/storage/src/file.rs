//! File metadata produced by listing a storage backend.

use sift_compress::Compression;
use std::path::{Path, PathBuf};

/// File metadata returned by storage backends.
///
/// Immutable once listed. The compression format is detected from the file
/// extension only; the bytes are not inspected until the file is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// File size in bytes (on disk, before any decompression)
    pub size: u64,
    /// Detected compression format from file extension
    pub compression: Compression,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let compression = Compression::from_path(&path);
        Self { path, size, compression }
    }

    /// The path the content would have once decompressed.
    pub fn content_path(&self) -> PathBuf {
        self.compression.content_path(&self.path)
    }

    /// Lowercased extension of the (decompressed) content, including the
    /// leading dot, or an empty string when there is none.
    pub fn content_ext(&self) -> String {
        extension_of(&self.content_path())
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}
