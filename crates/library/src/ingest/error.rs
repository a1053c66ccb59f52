//! Error types for the [`ingest`](super) module.
//!
//! Every kind is `Clone` so that a primary file's failure can be handed to
//! each of its secondaries. Kinds from other crates are carried by value
//! (see the constructors below) so the original `Exn` frame stays in the
//! error tree as a child.

use derive_more::{Display, Error};
use sift_catalog::error::{Error as CatalogError, ErrorKind as CatalogErrorKind};
use sift_compress::error::{Error as CompressionError, ErrorKind as CompressionErrorKind};
use sift_extract::error::{Error as ExtractError, ErrorKind as ExtractErrorKind};
use sift_storage::error::Error as StorageError;
use std::path::PathBuf;

/// An ingest error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for ingest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a single file could not be turned into a record.
///
/// ### Own Errors
/// - [`ErrorKind::Header`]
/// - [`ErrorKind::MissingPrimary`]
/// - [`ErrorKind::PrimaryFailed`] - the wrapped cause is the primary's own
///   error, see [`ErrorKind::root_cause`].
///
/// ### Dependency Errors
/// - [`ErrorKind::Listing`] and [`ErrorKind::Io`] (storage)
/// - [`ErrorKind::Decompression`]
/// - [`ErrorKind::Extract`]
/// - [`ErrorKind::Catalog`] - no matching session, or the session is
///   incomplete.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file turned up in the listing, but couldn't be looked at.
    #[display("could not list file: {_0}")]
    Listing(#[error(not(source))] String),
    /// Reading the file failed.
    #[display("could not read file: {_0}")]
    Io(#[error(not(source))] String),
    #[display("could not decompress file: {_0}")]
    Decompression(CompressionErrorKind),
    #[display("{_0}")]
    Extract(ExtractErrorKind),
    #[display("{_0}")]
    Catalog(CatalogErrorKind),
    /// The imaging header parser rejected the file.
    #[display("could not parse imaging header: {_0}")]
    Header(#[error(not(source))] String),
    /// A secondary file whose primary is not in the folder.
    #[display("no primary file {} for {}", primary.display(), secondary.display())]
    MissingPrimary { secondary: PathBuf, primary: PathBuf },
    /// The primary file this file depends on failed.
    #[display("primary file {} failed: {cause}", primary.display())]
    PrimaryFailed {
        primary: PathBuf,
        #[error(source)]
        cause: Box<ErrorKind>,
    },
}

impl ErrorKind {
    #[track_caller]
    pub fn storage(err: StorageError) -> Error {
        let message = (*err).to_string();
        err.raise(ErrorKind::Io(message))
    }

    #[track_caller]
    pub fn listing(err: StorageError) -> Error {
        let message = (*err).to_string();
        err.raise(ErrorKind::Listing(message))
    }

    #[track_caller]
    pub fn decompression(err: CompressionError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Decompression(inner))
    }

    #[track_caller]
    pub fn extract(err: ExtractError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Extract(inner))
    }

    #[track_caller]
    pub fn catalog(err: CatalogError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Catalog(inner))
    }

    /// The error that started it all: for a [`PrimaryFailed`](Self::PrimaryFailed)
    /// chain that is the primary's own error, otherwise `self`.
    pub fn root_cause(&self) -> &ErrorKind {
        match self {
            Self::PrimaryFailed { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    /// Returns `true` for failures that don't need anybody's attention.
    ///
    /// Task exports that were never renamed to the `000<subject>-<visit>_`
    /// convention are left in session folders on purpose; they (and any file
    /// depending on them) are expected to fail.
    pub fn is_skippable(&self) -> bool {
        matches!(self.root_cause(), Self::Extract(ExtractErrorKind::NamingConvention { .. }))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Listing(_) | Self::Io(_) => true,
            Self::Decompression(kind) => kind.is_retryable(),
            Self::Extract(kind) => kind.is_retryable(),
            Self::Catalog(kind) => kind.is_retryable(),
            Self::PrimaryFailed { cause, .. } => cause.is_retryable(),
            Self::Header(_) | Self::MissingPrimary { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn naming_convention() -> ErrorKind {
        ErrorKind::Extract(ExtractErrorKind::NamingConvention {
            file: "emoreg.csv".to_string(),
            expected: "00012345-<visit>_*".to_string(),
        })
    }

    #[test]
    fn test_primary_failed_exposes_cause() {
        let err = ErrorKind::PrimaryFailed {
            primary: PathBuf::from("00012345-1_emoreg.csv"),
            cause: Box::new(ErrorKind::Extract(ExtractErrorKind::HeaderOnly)),
        };
        assert_eq!(err.root_cause(), &ErrorKind::Extract(ExtractErrorKind::HeaderOnly));
        assert_eq!(err.source().map(|source| source.to_string()).as_deref(), Some("file only contains a header row"));
        assert_eq!(err.to_string(), "primary file 00012345-1_emoreg.csv failed: file only contains a header row");
    }

    #[test]
    fn test_skippable() {
        assert!(naming_convention().is_skippable());
        let wrapped = ErrorKind::PrimaryFailed {
            primary: PathBuf::from("emoreg.csv"),
            cause: Box::new(naming_convention()),
        };
        assert!(wrapped.is_skippable());
        assert!(!ErrorKind::Extract(ExtractErrorKind::HeaderOnly).is_skippable());
        assert!(
            !ErrorKind::MissingPrimary {
                secondary: PathBuf::from("a.log"),
                primary: PathBuf::from("a.csv"),
            }
            .is_skippable()
        );
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorKind::Io("interrupted".to_string()).is_retryable());
        assert!(ErrorKind::Catalog(CatalogErrorKind::Network("timeout".to_string())).is_retryable());
        assert!(!naming_convention().is_retryable());
    }

    #[test]
    fn test_dependency_kind_is_kept() {
        let err = ErrorKind::extract(exn::Exn::from(ExtractErrorKind::EmptyFile));
        assert_eq!(*err, ErrorKind::Extract(ExtractErrorKind::EmptyFile));
    }
}
