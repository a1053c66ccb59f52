//! Search result rows, as the archive returns them.
//!
//! Every field is optional on the wire. Conversion to the catalog models never
//! fails: a record the archive can't describe fully is still useful for
//! deduplication, and matching deals with the gaps.

use super::{Acquisition, Session};
use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub acquisitions: Vec<SearchHit>,
}

/// Search hits are wrapped in the search engine's envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchHit {
    #[serde(rename = "_source")]
    pub source: AcquisitionRow,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AcquisitionRow {
    uid: Option<String>,
    label: Option<String>,
    session: SessionRow,
    files: Vec<FileRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SessionRow {
    uid: Option<String>,
    label: Option<String>,
    timestamp: Option<String>,
    timezone: Option<String>,
    subject: SubjectRow,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SubjectRow {
    code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FileRow {
    hash: Option<String>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        let timestamp = row.timestamp.as_deref().and_then(|raw| match OffsetDateTime::parse(raw, &Rfc3339) {
            Ok(timestamp) => Some(timestamp),
            Err(err) => {
                tracing::warn!(session = ?row.uid, timestamp = raw, %err, "ignoring unparsable session timestamp");
                None
            },
        });
        Session {
            uid: row.uid,
            label: row.label,
            timestamp,
            timezone: row.timezone,
            subject_code: row.subject.code.unwrap_or_default(),
        }
    }
}

impl From<AcquisitionRow> for Acquisition {
    fn from(row: AcquisitionRow) -> Self {
        Acquisition {
            uid: row.uid,
            label: row.label,
            session: row.session.into(),
            file_hashes: row.files.into_iter().filter_map(|file| file.hash).collect(),
        }
    }
}

impl SearchResponse {
    pub(crate) fn into_acquisitions(self) -> Vec<Acquisition> {
        self.acquisitions.into_iter().map(|hit| hit.source.into()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_unwrap_search_response() {
        let json = r#"{
            "acquisitions": [
                {"_id": "x", "_source": {
                    "uid": "1.2.3", "label": "Behavioral and Physiological",
                    "session": {
                        "uid": "9.8.7", "label": "Visit 1",
                        "timestamp": "2015-01-02T17:00:00Z",
                        "timezone": "America/New_York",
                        "subject": {"code": "ex12345"}
                    },
                    "files": [{"hash": "v0-sha384-aa", "name": "a.csv"}, {"name": "unhashed"}]
                }},
                {"_source": {}}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let acquisitions = response.into_acquisitions();
        assert_eq!(acquisitions.len(), 2);

        let first = &acquisitions[0];
        assert_eq!(first.uid.as_deref(), Some("1.2.3"));
        assert_eq!(first.file_hashes, ["v0-sha384-aa"]);
        assert_eq!(first.session.uid.as_deref(), Some("9.8.7"));
        assert_eq!(first.session.timestamp, Some(datetime!(2015-01-02 17:00 UTC)));
        assert_eq!(first.session.timezone.as_deref(), Some("America/New_York"));
        assert_eq!(first.session.subject_code, "ex12345");

        let empty = &acquisitions[1];
        assert_eq!(empty.uid, None);
        assert_eq!(empty.session.subject_code, "");
        assert!(empty.file_hashes.is_empty());
    }

    #[test]
    fn test_bad_session_timestamp_is_dropped() {
        let row = SessionRow {
            uid: Some("9.8.7".to_string()),
            timestamp: Some("last tuesday".to_string()),
            ..Default::default()
        };
        let session = Session::from(row);
        assert_eq!(session.timestamp, None);
        assert_eq!(session.uid.as_deref(), Some("9.8.7"));
    }
}
