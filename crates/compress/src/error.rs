//! Decompression Error Types

use derive_more::{Display, Error};

/// A decompression error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for decompression.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file claims a compression format its bytes don't match, or is
    /// truncated. Reading it again won't help.
    #[display("invalid or corrupted compressed data")]
    InvalidData,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
