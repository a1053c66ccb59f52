//! Transparent decompression of session files.
//!
//! Acquisition machines sometimes leave their exports compressed
//! (`physio.txt.gz`, `IM0001.bz2`). The format is taken from the file
//! extension, the bytes are decompressed in memory, and
//! [`Compression::content_path`] gives the name the file would have once
//! decompressed, which is the one classification has to look at.

mod decode;
pub mod error;

use std::path::{Path, PathBuf};

/// How a stored file is compressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    #[default]
    None,
    /// `.bz2`
    Bzip2,
    /// `.gz`
    Gzip,
}

impl Compression {
    /// Detect compression from a file extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => Compression::Gzip,
            Some(ext) if ext.eq_ignore_ascii_case("bz2") => Compression::Bzip2,
            _ => Compression::None,
        }
    }

    /// The path the file's *content* would have once decompressed.
    ///
    /// Strips this format's extension (`session/raw.csv.gz` becomes
    /// `session/raw.csv`). Uncompressed paths are returned unchanged.
    #[must_use]
    pub fn content_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match self {
            Compression::None => path.to_path_buf(),
            _ => path.with_extension(""),
        }
    }
}
