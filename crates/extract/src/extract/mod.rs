//! Text-format extractors.
//!
//! Each format has a `detect` predicate and an `extract` function over a
//! [`Preview`](crate::Preview); they are paired up into rules in
//! [`classify`](crate::classify).

pub(crate) mod log;
pub(crate) mod physio;
pub(crate) mod table;

use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use std::path::Path;

/// File name component of `path` as UTF-8.
fn file_name(path: &Path) -> Result<&str> {
    path.file_name().and_then(|name| name.to_str()).ok_or_raise(|| ErrorKind::MissingField("file name"))
}
