//! Reporting timezone.
//!
//! Instruments record wall-clock time where the study runs, and sessions are
//! matched by calendar day in that same zone. The IANA database comes from
//! `chrono-tz`; everything else stays in `time`.

use crate::error::{Error, ErrorKind, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone};
use chrono_tz::Tz;
use exn::{OptionExt, ResultExt};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// An IANA timezone used for day comparisons and to interpret local
/// timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingZone(Tz);

impl ReportingZone {
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// The UTC offset in effect in this zone at `instant`.
    pub fn offset_at(&self, instant: OffsetDateTime) -> Result<UtcOffset> {
        let naive = chrono::DateTime::from_timestamp(instant.unix_timestamp(), 0)
            .ok_or_raise(|| ErrorKind::ParseError {
                field: "timestamp",
                value: instant.to_string(),
            })?
            .naive_utc();
        let seconds = self.0.offset_from_utc_datetime(&naive).fix().local_minus_utc();
        UtcOffset::from_whole_seconds(seconds).or_raise(|| ErrorKind::UnknownTimezone(self.name().to_string()))
    }

    /// The calendar day `instant` falls on in this zone.
    ///
    /// # Examples
    ///
    /// ```
    /// use sift_extract::ReportingZone;
    /// use time::macros::{date, datetime};
    ///
    /// let zone = ReportingZone::default();
    /// // 04:00 UTC is still the previous evening in California.
    /// assert_eq!(zone.local_date(datetime!(2015-01-03 04:00 UTC)).unwrap(), date!(2015-01-02));
    /// ```
    pub fn local_date(&self, instant: OffsetDateTime) -> Result<Date> {
        Ok(instant.to_offset(self.offset_at(instant)?).date())
    }

    /// Interpret a wall-clock time in this zone, returning the UTC instant.
    ///
    /// Ambiguous times (the repeated hour when clocks go back) resolve to the
    /// earlier instant. Times that don't exist (the skipped hour when clocks
    /// go forward) are an error.
    pub fn resolve_local(&self, local: PrimitiveDateTime) -> Result<OffsetDateTime> {
        let invalid = || ErrorKind::ParseError {
            field: "timestamp",
            value: format!("{local} in {}", self.name()),
        };
        let date = NaiveDate::from_ymd_opt(local.year(), u8::from(local.month()).into(), local.day().into())
            .ok_or_raise(invalid)?;
        let time = NaiveTime::from_hms_nano_opt(
            local.hour().into(),
            local.minute().into(),
            local.second().into(),
            local.nanosecond(),
        )
        .ok_or_raise(invalid)?;
        let seconds = self
            .0
            .offset_from_local_datetime(&NaiveDateTime::new(date, time))
            .earliest()
            .ok_or_raise(invalid)?
            .fix()
            .local_minus_utc();
        let offset = UtcOffset::from_whole_seconds(seconds).or_raise(invalid)?;
        Ok(local.assume_offset(offset).to_offset(UtcOffset::UTC))
    }
}
impl Default for ReportingZone {
    fn default() -> Self {
        Self(Tz::America__Los_Angeles)
    }
}
impl FromStr for ReportingZone {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse::<Tz>().ok().map(Self).ok_or_raise(|| ErrorKind::UnknownTimezone(s.to_string()))
    }
}
impl Display for ReportingZone {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}
