//! Library Error Types
//!
//! These are the errors that stop a batch outright. Anything that goes wrong
//! with an individual file is an [`ingest`](crate::ingest::error) error
//! instead, reported alongside the other files' results.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The session folder can't be read at all.
    #[display("session folder is not accessible")]
    RootUnavailable,
    /// The archive's session listing could not be fetched.
    #[display("could not load the session catalog")]
    Catalog,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Both depend on something outside the folder (a mount, the network).
        true
    }
}
