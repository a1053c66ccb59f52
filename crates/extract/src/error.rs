//! Extraction Error Types
//!
//! Every failure names the stage that caused it, so a batch report can say
//! *why* a file was rejected without anyone having to open it.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file has no content to classify.
    #[display("file is empty")]
    EmptyFile,
    /// A subject code matched none of the known patterns.
    #[display("could not parse subject code: {_0}")]
    UnparsableSubjectCode(#[error(not(source))] String),
    /// The file name does not follow the renamed-export convention.
    #[display("file name `{file}` does not follow the naming convention `{expected}`")]
    NamingConvention {
        /// The offending file name.
        file: String,
        /// A description of the name that was expected.
        expected: String,
    },
    /// A participant table with a header but no data rows.
    #[display("file only contains a header row")]
    HeaderOnly,
    /// Content matched no text format with an extractor.
    #[display("unrecognized file format")]
    UnrecognizedFormat,
    /// A required line or column could not be found.
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A field was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// The value that was found.
        value: String,
    },
    /// Not a timezone in the IANA database.
    #[display("unknown timezone: {_0}")]
    UnknownTimezone(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The content either parses or it doesn't.
        false
    }
}
