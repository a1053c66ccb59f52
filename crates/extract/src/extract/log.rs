use super::file_name;
use crate::consts::{PRODUCT_LOG_DATETIME_PREFIX, PRODUCT_LOG_MARKER};
use crate::error::{ErrorKind, Result};
use crate::{ExtractedMetadata, Format, Preview, ReportingZone, SubjectCode};
use exn::{OptionExt, ResultExt};
use std::path::Path;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::instrument;

const DATETIME_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[year]/[month padding:none]/[day padding:none] [hour padding:none]:[minute]:[second]"
);

pub(crate) fn detect(preview: &Preview) -> bool {
    preview.lines().any(|line| line.trim_end() == PRODUCT_LOG_MARKER)
}

/// Product logs are named `<subject>_<anything>` and record local wall-clock
/// time in the reporting timezone.
#[instrument(level = "debug", skip(preview, zone), fields(path = %path.display()))]
pub(crate) fn extract(preview: &Preview, path: &Path, zone: &ReportingZone) -> Result<ExtractedMetadata> {
    let raw = preview
        .lines()
        .find_map(|line| line.strip_prefix(PRODUCT_LOG_DATETIME_PREFIX))
        .map(str::trim)
        .ok_or_raise(|| ErrorKind::MissingField("DateTime"))?;
    let local = PrimitiveDateTime::parse(raw, DATETIME_FORMAT).or_raise(|| ErrorKind::ParseError {
        field: "DateTime",
        value: raw.to_string(),
    })?;
    let timestamp = zone.resolve_local(local)?;

    let name = file_name(path)?;
    let token = name.split('_').next().unwrap_or(name);
    let subject = SubjectCode::normalize(token)?;

    Ok(ExtractedMetadata {
        subject,
        timestamp,
        format: Format::ProductLog,
        visit: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::datetime;

    const LOG: &str = "Header Start\nProduct = ispot\nDateTime = 2015/01/02 04:03:04\nHeader End\n";

    #[test]
    fn test_detect() {
        assert!(detect(&Preview::new(LOG.as_bytes())));
        assert!(detect(&Preview::new(b"Product = ispot\r\n")));
        assert!(!detect(&Preview::new(b"Product = something else\n")));
    }

    #[rstest]
    #[case("ex12345_task.log", "12345")]
    #[case("logs/00012345-1_ispot_run2.txt", "12345")]
    fn test_extract(#[case] path: &str, #[case] subject: &str) {
        let metadata = extract(&Preview::new(LOG.as_bytes()), Path::new(path), &ReportingZone::default()).unwrap();
        assert_eq!(metadata.subject.as_str(), subject);
        // 04:03:04 in Los Angeles during winter is 12:03:04 UTC.
        assert_eq!(metadata.timestamp, datetime!(2015-01-02 12:03:04 UTC));
        assert_eq!(metadata.format, Format::ProductLog);
    }

    #[test]
    fn test_missing_datetime() {
        let preview = Preview::new(b"Product = ispot\n");
        let err = extract(&preview, Path::new("ex12345_task.log"), &ReportingZone::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingField("DateTime"));
    }

    #[test]
    fn test_unparsable_subject() {
        let err = extract(&Preview::new(LOG.as_bytes()), Path::new("task_ex12345.log"), &ReportingZone::default())
            .unwrap_err();
        assert_eq!(*err, ErrorKind::UnparsableSubjectCode("task".to_string()));
    }
}
