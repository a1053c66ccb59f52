use sift_extract::ReportingZone;
use time::{Date, OffsetDateTime};

/// A subject's visit, as recorded by the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub uid: Option<String>,
    pub label: Option<String>,
    pub timestamp: Option<OffsetDateTime>,
    /// IANA timezone the session took place in, when it differs from the
    /// reporting timezone.
    pub timezone: Option<String>,
    /// Subject code exactly as the archive has it (not normalized).
    pub subject_code: String,
}
impl Session {
    /// The zone this session's calendar day is judged in: its own timezone
    /// when it has a valid one, otherwise `fallback`.
    pub fn zone(&self, fallback: ReportingZone) -> ReportingZone {
        let Some(name) = self.timezone.as_deref() else {
            return fallback;
        };
        match name.parse() {
            Ok(zone) => zone,
            Err(_) => {
                tracing::warn!(session = ?self.uid, timezone = name, "ignoring unknown session timezone");
                fallback
            },
        }
    }

    /// Calendar day of the session, or `None` when it has no timestamp.
    pub fn local_date(&self, fallback: ReportingZone) -> Option<Date> {
        // Timezone lookups only fail for instants chrono can't represent.
        self.zone(fallback).local_date(self.timestamp?).ok()
    }

    /// `uid:label`, for messages.
    pub fn describe(&self) -> String {
        format!("{}:{}", self.uid.as_deref().unwrap_or("None"), self.label.as_deref().unwrap_or("None"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn session(timezone: Option<&str>) -> Session {
        Session {
            uid: Some("9.8.7".to_string()),
            label: Some("Visit 1".to_string()),
            // 02:00 UTC on the 3rd: the evening of the 2nd on the west coast,
            // the night of the 2nd on the east coast.
            timestamp: Some(datetime!(2015-01-03 02:00 UTC)),
            timezone: timezone.map(str::to_string),
            subject_code: "ex12345".to_string(),
        }
    }

    #[test]
    fn test_local_date_uses_own_timezone() {
        let fallback = ReportingZone::default();
        assert_eq!(session(None).local_date(fallback), Some(date!(2015-01-02)));
        assert_eq!(session(Some("UTC")).local_date(fallback), Some(date!(2015-01-03)));
        assert_eq!(session(Some("Nowhere/Special")).local_date(fallback), Some(date!(2015-01-02)));
    }

    #[test]
    fn test_no_timestamp() {
        let mut session = session(None);
        session.timestamp = None;
        assert_eq!(session.local_date(ReportingZone::default()), None);
    }

    #[test]
    fn test_describe() {
        assert_eq!(session(None).describe(), "9.8.7:Visit 1");
        let mut session = session(None);
        session.uid = None;
        assert_eq!(session.describe(), "None:Visit 1");
    }
}
