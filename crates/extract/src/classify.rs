//! Content-based classification.
//!
//! Formats are recognised by an ordered list of rules, each pairing a
//! detection predicate with the extractor for that format. The first rule
//! whose predicate holds wins; content matching no rule is imaging data.

use crate::error::{ErrorKind, Result};
use crate::extract::{log, physio, table};
use crate::{ExtractedMetadata, Format, Preview, ReportingZone};
use std::path::Path;

type Detect = fn(&Preview) -> bool;
type Extract = fn(&Preview, &Path, &ReportingZone) -> Result<ExtractedMetadata>;

struct Rule {
    format: Format,
    detect: Detect,
    extract: Extract,
}

static RULES: [Rule; 3] = [
    Rule {
        format: Format::Physiological,
        detect: physio::detect,
        extract: physio::extract,
    },
    Rule {
        format: Format::ProductLog,
        detect: log::detect,
        extract: log::extract,
    },
    Rule {
        format: Format::ParticipantTable,
        detect: table::detect,
        extract: table::extract,
    },
];

fn rule_for(preview: &Preview) -> Result<Option<&'static Rule>> {
    if preview.is_empty() {
        exn::bail!(ErrorKind::EmptyFile);
    }
    Ok(RULES.iter().find(|rule| (rule.detect)(preview)))
}

/// Decide which format a (decompressed) file is in.
///
/// # Examples
///
/// ```
/// use sift_extract::{Format, classify};
///
/// assert_eq!(classify(b"% Start time: 2015-01-02 12:03:04.567890").unwrap(), Format::Physiological);
/// assert_eq!(classify(b"DICM\x00\x01binary").unwrap(), Format::Imaging);
/// assert!(classify(b"").is_err());
/// ```
pub fn classify(content: &[u8]) -> Result<Format> {
    classify_preview(&Preview::new(content))
}

pub fn classify_preview(preview: &Preview) -> Result<Format> {
    Ok(rule_for(preview)?.map(|rule| rule.format).unwrap_or(Format::Imaging))
}

/// Run the extractor of whichever text format `preview` is in.
///
/// `path` is the path of the decompressed content; extractors read the
/// subject code from the file or folder name. Imaging content has no text
/// extractor and fails with [`UnrecognizedFormat`](ErrorKind::UnrecognizedFormat).
pub fn extract_preview(preview: &Preview, path: &Path, zone: &ReportingZone) -> Result<ExtractedMetadata> {
    match rule_for(preview)? {
        Some(rule) => (rule.extract)(preview, path, zone),
        None => exn::bail!(ErrorKind::UnrecognizedFormat),
    }
}
