//! File identification and metadata extraction for research-session files.
//!
//! A session folder mixes binary imaging files with text files written by
//! behavioral and physiological instruments. This crate decides which is
//! which ([`classify`]) and, for the text formats, pulls out who the file
//! belongs to and when it was recorded ([`extract`]).

mod classify;
mod consts;
pub mod error;
mod extract;
pub mod family;
mod models;
mod preview;
mod subject;
mod zone;

use std::path::Path;
use tracing::instrument;

pub use crate::classify::{classify, classify_preview, extract_preview};
use crate::error::Result;
pub use crate::models::{ExtractedMetadata, Format};
pub use crate::preview::Preview;
pub use crate::subject::SubjectCode;
pub use crate::zone::{DEFAULT_TIMEZONE, ReportingZone};

/// Easy, top-level entrypoint for extracting [`ExtractedMetadata`] from the
/// (decompressed) content of a text-format file.
///
/// # Examples
///
/// ```
/// use sift_extract::{Format, ReportingZone, extract};
///
/// let content = b"% Start time: 2015-01-02 12:03:04.567890\n0.1\t0.2\n";
/// let metadata = extract(content, "ex12345/physio.txt", &ReportingZone::default()).unwrap();
/// assert_eq!(metadata.subject.as_str(), "12345");
/// assert_eq!(metadata.format, Format::Physiological);
/// ```
#[instrument(skip(content, zone), fields(size = content.len(), path = %path.as_ref().display()))]
pub fn extract(content: &[u8], path: impl AsRef<Path>, zone: &ReportingZone) -> Result<ExtractedMetadata> {
    extract_preview(&Preview::new(content), path.as_ref(), zone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use time::macros::datetime;

    #[test]
    fn test_extract_physio() {
        let content = b"% Start time: 2015-01-02 12:03:04.567890\n";
        let metadata = extract(content, "a/ex12345/physio.txt", &ReportingZone::default()).unwrap();
        assert_eq!(metadata.timestamp, datetime!(2015-01-02 12:03:04.567 UTC));
    }

    #[test]
    fn test_extract_empty() {
        let err = extract(b"", "a/ex12345/physio.txt", &ReportingZone::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::EmptyFile);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize() {
        let subject = SubjectCode::normalize("ex12345").unwrap();
        assert_eq!(serde_json::to_string(&subject).unwrap(), "\"12345\"");
        assert_eq!(serde_json::to_string(&Format::ProductLog).unwrap(), "\"product-log\"");
    }
}
