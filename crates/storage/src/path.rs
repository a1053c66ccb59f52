//! Storage paths.
//!
//! A file is addressed by its path relative to the session root, exactly as
//! the listing produced it. Such a path is nothing but plain names; anything
//! else (`..`, `.`, a root or drive prefix) is refused instead of resolved.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path, PathBuf};

/// Check that `path` is a plain relative path below the session root.
///
/// Repeated and trailing separators are dropped; nothing else is rewritten.
///
/// # Examples
///
/// ```
/// use sift_storage::validate_path;
///
/// assert!(validate_path("ex12345/physio.txt.gz").is_ok());
/// assert!(validate_path("../ex12345/physio.txt").is_err());
/// assert!(validate_path("/data/ex12345/physio.txt").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut names = path.components().peekable();
    if names.peek().is_none() {
        exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
    }
    names
        .map(|component| match component {
            Component::Normal(name) => Ok(name),
            _ => Err(exn::Exn::from(ErrorKind::InvalidPath(path.to_path_buf()))),
        })
        .collect()
}
