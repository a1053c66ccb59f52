use super::Session;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use serde::Serialize;
use std::collections::HashMap;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Prefix of the series UID given to every non-imaging acquisition. The UID
/// is derived from the session so that uploading the same files twice always
/// lands on the same acquisition.
pub const SERIES_UID_PREFIX: &str = "behavioral_and_physiological:";
pub const SERIES_DESCRIPTION: &str = "Behavioral and Physiological";

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year][month][day]");
const TIME_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[hour][minute][second]");

/// Acquisition header, named after the imaging tags it stands in for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AcquisitionMetadata {
    /// `YYYYMMDD`, UTC
    pub acquisition_date: String,
    /// `HHMMSS`, UTC
    pub acquisition_time: String,
    #[serde(rename = "SeriesInstanceUID")]
    pub series_instance_uid: String,
    pub series_description: String,
    /// `YYYYMMDD`, UTC
    pub study_date: String,
    /// `HHMMSS`, UTC
    pub study_time: String,
    /// The archive's own (unnormalized) subject code, so the upload lands on
    /// the session it was matched to.
    #[serde(rename = "PatientID")]
    pub patient_id: String,
    #[serde(rename = "StudyInstanceUID")]
    pub study_instance_uid: String,
}

impl AcquisitionMetadata {
    /// Build the header for a file recorded at `timestamp` during `session`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sift_catalog::models::{AcquisitionMetadata, Session};
    /// use time::macros::datetime;
    ///
    /// let session = Session {
    ///     uid: Some("1.2.3".to_string()),
    ///     label: None,
    ///     timestamp: Some(datetime!(2015-01-02 17:00 UTC)),
    ///     timezone: None,
    ///     subject_code: "ex12345".to_string(),
    /// };
    /// let header = AcquisitionMetadata::derive(&session, datetime!(2015-01-02 12:03:04.567 UTC)).unwrap();
    /// assert_eq!(header.series_instance_uid, "behavioral_and_physiological:1.2.3");
    /// assert_eq!(header.acquisition_time, "120304");
    /// ```
    pub fn derive(session: &Session, timestamp: OffsetDateTime) -> Result<Self> {
        let incomplete = |missing| ErrorKind::IncompleteSession {
            session: session.describe(),
            missing,
        };
        let uid = session.uid.as_deref().ok_or_raise(|| incomplete("uid"))?;
        let started = session.timestamp.ok_or_raise(|| incomplete("timestamp"))?;
        let (acquisition_date, acquisition_time) = format_utc(timestamp)?;
        let (study_date, study_time) = format_utc(started)?;
        Ok(Self {
            acquisition_date,
            acquisition_time,
            series_instance_uid: format!("{SERIES_UID_PREFIX}{uid}"),
            series_description: SERIES_DESCRIPTION.to_string(),
            study_date,
            study_time,
            patient_id: session.subject_code.clone(),
            study_instance_uid: uid.to_string(),
        })
    }

    /// Pick the acquisition fields out of an imaging header's tag map.
    /// Tags the header doesn't have are left empty.
    pub fn from_tags(tags: &HashMap<String, String>) -> Self {
        let tag = |name: &str| tags.get(name).cloned().unwrap_or_default();
        Self {
            acquisition_date: tag("AcquisitionDate"),
            acquisition_time: tag("AcquisitionTime"),
            series_instance_uid: tag("SeriesInstanceUID"),
            series_description: tag("SeriesDescription"),
            study_date: tag("StudyDate"),
            study_time: tag("StudyTime"),
            patient_id: tag("PatientID"),
            study_instance_uid: tag("StudyInstanceUID"),
        }
    }
}

fn format_utc(instant: OffsetDateTime) -> Result<(String, String)> {
    let utc = instant.to_offset(UtcOffset::UTC);
    let date = utc.format(DATE_FORMAT).or_raise(|| ErrorKind::InvalidData("timestamp"))?;
    let time = utc.format(TIME_FORMAT).or_raise(|| ErrorKind::InvalidData("timestamp"))?;
    Ok((date, time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn session() -> Session {
        Session {
            uid: Some("1.2.840.113619".to_string()),
            label: Some("Visit 1".to_string()),
            timestamp: Some(datetime!(2015-01-02 09:30:00 -08:00)),
            timezone: None,
            subject_code: "EX12345".to_string(),
        }
    }

    #[test]
    fn test_derive() {
        let header = AcquisitionMetadata::derive(&session(), datetime!(2015-01-02 12:03:04.567 UTC)).unwrap();
        assert_eq!(header.acquisition_date, "20150102");
        assert_eq!(header.acquisition_time, "120304");
        assert_eq!(header.series_instance_uid, "behavioral_and_physiological:1.2.840.113619");
        assert_eq!(header.series_description, "Behavioral and Physiological");
        assert_eq!(header.study_date, "20150102");
        assert_eq!(header.study_time, "173000");
        assert_eq!(header.patient_id, "EX12345");
        assert_eq!(header.study_instance_uid, "1.2.840.113619");
    }

    #[test]
    fn test_derive_is_deterministic() {
        let first = AcquisitionMetadata::derive(&session(), datetime!(2015-01-02 12:03:04 UTC)).unwrap();
        let second = AcquisitionMetadata::derive(&session(), datetime!(2015-01-02 12:03:04 UTC)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_derive_incomplete_session() {
        let mut session = session();
        session.uid = None;
        let err = AcquisitionMetadata::derive(&session, datetime!(2015-01-02 12:03:04 UTC)).unwrap_err();
        assert_eq!(
            *err,
            ErrorKind::IncompleteSession {
                session: "None:Visit 1".to_string(),
                missing: "uid"
            }
        );

        let mut session = self::session();
        session.timestamp = None;
        let err = AcquisitionMetadata::derive(&session, datetime!(2015-01-02 12:03:04 UTC)).unwrap_err();
        assert!(matches!(*err, ErrorKind::IncompleteSession { missing: "timestamp", .. }));
    }

    #[test]
    fn test_from_tags() {
        let tags = HashMap::from([
            ("SeriesInstanceUID".to_string(), "1.2.3.4".to_string()),
            ("StudyInstanceUID".to_string(), "1.2.3".to_string()),
            ("Modality".to_string(), "MR".to_string()),
        ]);
        let header = AcquisitionMetadata::from_tags(&tags);
        assert_eq!(header.series_instance_uid, "1.2.3.4");
        assert_eq!(header.study_instance_uid, "1.2.3");
        assert_eq!(header.series_description, "");
    }

    #[test]
    fn test_serialize_uses_tag_names() {
        let header = AcquisitionMetadata::derive(&session(), datetime!(2015-01-02 12:03:04 UTC)).unwrap();
        let json = serde_json::to_value(&header).unwrap();
        assert_eq!(json["SeriesInstanceUID"], "behavioral_and_physiological:1.2.840.113619");
        assert_eq!(json["PatientID"], "EX12345");
        assert_eq!(json["AcquisitionDate"], "20150102");
    }
}
