//! Catalog Error Types
//!
//! Fetch errors ([`Network`](ErrorKind::Network), [`InvalidData`](ErrorKind::InvalidData))
//! are fatal to a batch; matching errors are per file.

use crate::matcher::NoMatch;
use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No session for the subject on the file's day.
    #[display("{_0}")]
    NoMatchingSession(#[error(not(source))] NoMatch),
    /// The matched session lacks a field needed to build acquisition metadata.
    #[display("session {session} has no {missing}")]
    IncompleteSession {
        /// `uid:label` of the session, as far as they are known.
        session: String,
        /// The missing field.
        missing: &'static str,
    },
    /// The archive could not be reached, or refused the request.
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// The archive responded with something that isn't a search result.
    #[display("invalid catalog data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        let err = ErrorKind::IncompleteSession {
            session: "None:Visit 1".to_string(),
            missing: "uid",
        };
        assert_eq!(err.to_string(), "session None:Visit 1 has no uid");
        assert_eq!(ErrorKind::Network("timed out".to_string()).to_string(), "network error: timed out");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Network("timed out".to_string()).is_retryable());
        assert!(!ErrorKind::InvalidData("acquisitions").is_retryable());
    }
}
