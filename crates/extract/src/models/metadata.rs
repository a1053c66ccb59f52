use super::Format;
use crate::SubjectCode;
use time::OffsetDateTime;

/// What a text-format file says about itself: who, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMetadata {
    /// Normalized subject code
    pub subject: SubjectCode,
    /// When the recording started, always in UTC
    pub timestamp: OffsetDateTime,
    /// Format the metadata was extracted from
    pub format: Format,
    /// Visit number, when the file name carries one
    pub visit: Option<u32>,
}
