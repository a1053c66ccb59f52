//! Subject code normalization.
//!
//! The same subject shows up under several spellings depending on which
//! instrument wrote the file: `ex12345` in physiological folder names,
//! `00012345-2` in renamed behavioral exports. Both normalize to `12345`.

use crate::consts;
use crate::error::{Error, ErrorKind, Result};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use tracing::instrument;

/// A canonical subject code.
///
/// Either exactly five digits, or a pass-through test code (anything
/// containing `test`), see [`is_test()`](Self::is_test).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct SubjectCode(String);

impl SubjectCode {
    /// Normalize a raw subject code.
    ///
    /// Rules are tried in order and the first match wins:
    /// 1. anything containing `test` (case-sensitive) is returned unchanged;
    /// 2. two letters followed by five digits (`ex12345`);
    /// 3. `000` followed by five digits and an optional `-<visit>`
    ///    (`00012345`, `00012345-2`).
    ///
    /// # Examples
    ///
    /// ```
    /// use sift_extract::SubjectCode;
    ///
    /// assert_eq!(SubjectCode::normalize("ex12345").unwrap().as_str(), "12345");
    /// assert_eq!(SubjectCode::normalize("00012345-2").unwrap().as_str(), "12345");
    /// assert!(SubjectCode::normalize("test_subject").unwrap().is_test());
    /// assert!(SubjectCode::normalize("12345").is_err());
    /// ```
    #[instrument(level = "trace")]
    pub fn normalize(raw: &str) -> Result<Self> {
        if raw.contains("test") {
            tracing::warn!(code = raw, "ran into test subject data");
            return Ok(Self(raw.to_string()));
        }
        let captures = consts::SUBJECT_PREFIXED_REGEX
            .captures(raw)
            .or_else(|| consts::SUBJECT_ZERO_PADDED_REGEX.captures(raw));
        match captures.and_then(|c| c.get(1)) {
            Some(digits) => Ok(Self(digits.as_str().to_string())),
            None => exn::bail!(ErrorKind::UnparsableSubjectCode(raw.to_string())),
        }
    }

    /// Test codes are passed through unnormalized and skip checks that only
    /// make sense for real subjects.
    pub fn is_test(&self) -> bool {
        self.0.contains("test")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl FromStr for SubjectCode {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::normalize(s)
    }
}
impl AsRef<str> for SubjectCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Display for SubjectCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
