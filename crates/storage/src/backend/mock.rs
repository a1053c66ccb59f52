//! In-memory storage backend for testing.

use super::FileInfoStream;
use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::file::FileInfo;
use crate::path::validate as validate_path;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

/// In-memory storage backend for testing.
///
/// Files are stored in an ordered map behind a [`RwLock`], so listing order
/// is deterministic (sorted by path). Besides plain files, the mock can be
/// told to fail in the ways a real folder does: an unreachable root, a
/// directory that can't be listed, or a file that can't be read. It also
/// counts reads per path, so tests can assert how often a file was touched.
///
/// # Examples
///
/// ```
/// use sift_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([
///     ("ex12345/physio.txt", b"% Start time: 2015-01-02 12:03:04.567890"),
/// ]);
/// backend.read(Path::new("ex12345/physio.txt")).await?;
/// assert_eq!(backend.read_count(Path::new("ex12345/physio.txt")).await, 1);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    available: bool,
    storage: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
    unreadable: HashSet<PathBuf>,
    listing_errors: Vec<PathBuf>,
    reads: Mutex<HashMap<PathBuf, usize>>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = BTreeMap::new();
        for (path, data) in files {
            map.insert(Self::validated(path.into()), data.into());
        }
        Self {
            available: true,
            storage: RwLock::new(map),
            unreadable: HashSet::new(),
            listing_errors: Vec::new(),
            reads: Mutex::new(HashMap::new()),
        }
    }

    fn validated(path: PathBuf) -> PathBuf {
        let Ok(validated) = validate_path(&path) else {
            // The panic here is DELIBERATE. MockBackend is intended to be
            // used in tests; panics are expected. There is no error result.
            panic!("MockBackend: invalid path {}", path.display());
        };
        validated
    }

    /// Make [`verify()`](StorageBackend::verify) fail, as if the root
    /// directory had disappeared.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Make reading `path` fail with an I/O error. The file is still listed.
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.unreadable.insert(Self::validated(path.into()));
        self
    }

    /// Yield a listing error for `path` (a directory that can't be read)
    /// after all files have been listed.
    pub fn with_listing_error(mut self, path: impl Into<PathBuf>) -> Self {
        self.listing_errors.push(Self::validated(path.into()));
        self
    }

    /// How many times `path` has been read.
    pub async fn read_count(&self, path: &Path) -> usize {
        self.reads.lock().await.get(path).copied().unwrap_or(0)
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn verify(&self) -> Result<()> {
        if !self.available {
            exn::bail!(ErrorKind::NotFound(PathBuf::from("/")));
        }
        Ok(())
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        let validated_prefix = match prefix.map(validate_path).transpose() {
            Ok(pfx) => pfx,
            Err(e) => return Box::pin(futures::stream::once(async { Err(e) })),
        };

        Box::pin(stream! {
            // Snapshot matching entries under the read lock, then drop it
            // before yielding to avoid holding the lock across yield points.
            let entries: Vec<(PathBuf, u64)> = {
                let guard = self.storage.read().await;
                guard
                    .iter()
                    .filter(|(path, _)| match &validated_prefix {
                        Some(pfx) => path.starts_with(pfx),
                        None => true,
                    })
                    .map(|(path, data)| (path.clone(), data.len() as u64))
                    .collect()
            };
            for (path, size) in entries {
                yield Ok(FileInfo::new(path, size));
            }
            for path in &self.listing_errors {
                let err = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
                yield Err(exn::Exn::from(ErrorKind::from_io(err, path)));
            }
        })
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        *self.reads.lock().await.entry(path.clone()).or_default() += 1;
        if self.unreadable.contains(&path) {
            let err = std::io::Error::other("simulated read failure");
            exn::bail!(ErrorKind::Io(path, err));
        }
        let data = self.storage.read().await.get(&path).cloned();
        data.ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{StreamExt, TryStreamExt};
    use sift_compress::Compression;

    #[tokio::test]
    async fn test_with_files() {
        let backend = MockBackend::with_files([
            ("a/physio.txt.gz", Vec::from(*b"compressed")),
            ("b/log.txt", Vec::from(*b"plain")),
        ]);
        assert_eq!(backend.read(Path::new("a/physio.txt.gz")).await.unwrap(), b"compressed");
        assert_eq!(backend.read(Path::new("b/log.txt")).await.unwrap(), b"plain");
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let backend = MockBackend::default();
        let err = backend.read(Path::new("missing.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unreadable_and_read_count() {
        let backend = MockBackend::with_files([("a.csv", "x")]).with_unreadable("a.csv");
        let err = backend.read(Path::new("a.csv")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Io(p, _) if p == Path::new("a.csv")));
        assert!(backend.read(Path::new("a.csv")).await.is_err());
        assert_eq!(backend.read_count(Path::new("a.csv")).await, 2);
        assert_eq!(backend.read_count(Path::new("b.csv")).await, 0);
    }

    #[tokio::test]
    async fn test_list_with_prefix_is_sorted() {
        let backend = MockBackend::with_files([
            ("visit1/b.csv.bz2", Vec::from(*b"b")),
            ("visit1/a.csv", Vec::from(*b"a")),
            ("visit2/c.csv", Vec::from(*b"c")),
        ]);
        let files: Vec<_> = backend.list_stream(Some(Path::new("visit1"))).try_collect().await.unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, [PathBuf::from("visit1/a.csv"), PathBuf::from("visit1/b.csv.bz2")]);
        assert_eq!(files[1].compression, Compression::Bzip2);
    }

    #[tokio::test]
    async fn test_listing_error_is_yielded_in_place() {
        let backend = MockBackend::with_files([("a.csv", "x")]).with_listing_error("locked");
        let results: Vec<_> = backend.list_stream(None).collect().await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1].as_ref().map_err(|e| &**e), Err(ErrorKind::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_verify() {
        assert!(MockBackend::default().verify().await.is_ok());
        assert!(MockBackend::default().unavailable().verify().await.is_err());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let backend = MockBackend::default();
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
    }

    #[test]
    #[should_panic(expected = "invalid path")]
    fn test_with_files_panics_on_bad_path() {
        MockBackend::with_files([("../escape", Vec::from(*b"bad"))]);
    }
}
