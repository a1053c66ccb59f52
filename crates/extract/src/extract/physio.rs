use crate::consts::PHYSIO_PREFIX;
use crate::error::{ErrorKind, Result};
use crate::{ExtractedMetadata, Format, Preview, ReportingZone, SubjectCode};
use exn::{OptionExt, ResultExt};
use std::path::Path;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::instrument;

const START_TIME_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");

pub(crate) fn detect(preview: &Preview) -> bool {
    preview.first_line().is_some_and(|line| line.starts_with(PHYSIO_PREFIX))
}

/// Physiological recordings live in a folder named after the subject
/// (`ex12345/recording.txt`) and start with a UTC timestamp with microsecond
/// precision, which is truncated to milliseconds.
#[instrument(level = "debug", skip(preview, _zone), fields(path = %path.display()))]
pub(crate) fn extract(preview: &Preview, path: &Path, _zone: &ReportingZone) -> Result<ExtractedMetadata> {
    let raw = preview
        .first_line()
        .and_then(|line| line.strip_prefix(PHYSIO_PREFIX))
        .map(str::trim)
        .ok_or_raise(|| ErrorKind::MissingField("start time"))?;
    let started = PrimitiveDateTime::parse(raw, START_TIME_FORMAT)
        .or_raise(|| ErrorKind::ParseError {
            field: "start time",
            value: raw.to_string(),
        })?
        .assume_utc();
    let timestamp = started.replace_millisecond(started.millisecond()).or_raise(|| ErrorKind::ParseError {
        field: "start time",
        value: raw.to_string(),
    })?;

    let folder = path
        .parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .ok_or_raise(|| ErrorKind::MissingField("subject folder"))?;
    let subject = SubjectCode::normalize(folder)?;

    Ok(ExtractedMetadata {
        subject,
        timestamp,
        format: Format::Physiological,
        visit: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn run(content: &str, path: &str) -> Result<ExtractedMetadata> {
        extract(&Preview::new(content.as_bytes()), Path::new(path), &ReportingZone::default())
    }

    #[test]
    fn test_detect() {
        assert!(detect(&Preview::new(b"% Start time: 2015-01-02 12:03:04.567890\n1,2,3")));
        assert!(detect(&Preview::new(b"\n% Start time: 2015-01-02 12:03:04.567890")));
        assert!(!detect(&Preview::new(b"Start time: 2015-01-02 12:03:04.567890")));
    }

    #[test]
    fn test_extract() {
        let metadata = run("% Start time: 2015-01-02 12:03:04.567890\n0.1\t0.2\n", "session/ex12345/physio.txt").unwrap();
        assert_eq!(metadata.subject.as_str(), "12345");
        assert_eq!(metadata.timestamp, datetime!(2015-01-02 12:03:04.567 UTC));
        assert_eq!(metadata.format, Format::Physiological);
        assert_eq!(metadata.visit, None);
    }

    #[test]
    fn test_bad_timestamp() {
        let err = run("% Start time: yesterday\n", "ex12345/physio.txt").unwrap_err();
        assert_eq!(
            *err,
            ErrorKind::ParseError {
                field: "start time",
                value: "yesterday".to_string()
            }
        );
    }

    #[test]
    fn test_subject_from_folder() {
        let err = run("% Start time: 2015-01-02 12:03:04.567890\n", "misc/physio.txt").unwrap_err();
        assert_eq!(*err, ErrorKind::UnparsableSubjectCode("misc".to_string()));
        let err = run("% Start time: 2015-01-02 12:03:04.567890\n", "physio.txt").unwrap_err();
        assert_eq!(*err, ErrorKind::MissingField("subject folder"));
    }
}
