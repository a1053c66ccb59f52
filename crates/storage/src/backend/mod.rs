//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait: the read-only view of a
//! session folder that the ingestion pipeline works from.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use crate::file::FileInfo;
use async_trait::async_trait;
use futures::Stream;
use std::path::Path;
use std::pin::Pin;

pub(crate) type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

/// Unified interface for storage backends.
///
/// All storage operations are asynchronous so that listing and reading can be
/// interleaved with the per-file work of a batch.
///
/// # Path Handling
/// All paths are relative to the storage root and must pass
/// [`validate_path`](crate::validate_path). Implementations enforce this on
/// every path they are given.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend (used for logging only).
    fn name(&self) -> &str;

    /// Check that the storage root is reachable before any work starts.
    ///
    /// A batch cannot do anything useful against an unreadable root, so
    /// callers treat an error here as fatal rather than as a per-file error.
    async fn verify(&self) -> Result<()>;

    /// Stream file metadata matching an optional prefix.
    ///
    /// Yields results incrementally. Errors for individual entries (an
    /// unreadable sub-directory, a file whose metadata can't be read) are
    /// yielded in place and the walk continues with the next entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::StreamExt;
    /// # use sift_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) {
    /// let mut stream = backend.list_stream(None);
    /// while let Some(result) = stream.next().await {
    ///     match result {
    ///         Ok(info) => println!("{}: {} bytes", info.path.display(), info.size),
    ///         Err(err) => eprintln!("{err}"),
    ///     }
    /// }
    /// # }
    /// ```
    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a>;

    /// Read file contents.
    ///
    /// Returns the complete (still compressed, if it was) file contents.
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;
}
