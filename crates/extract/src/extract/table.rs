use super::file_name;
use crate::consts::{NAMING_CONVENTION_REGEX, TABLE_DATE_COLUMN, TABLE_DATE_REGEX, TABLE_PARTICIPANT_COLUMN};
use crate::error::{ErrorKind, Result};
use crate::{ExtractedMetadata, Format, Preview, ReportingZone, SubjectCode};
use csv::{ReaderBuilder, StringRecord, Trim};
use exn::{OptionExt, ResultExt};
use std::path::Path;
use time::{Date, Month, PrimitiveDateTime, Time};
use tracing::instrument;

fn header(line: &str) -> Option<StringRecord> {
    ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|record| record.ok())
}

pub(crate) fn detect(preview: &Preview) -> bool {
    preview.first_line().and_then(header).is_some_and(|header| {
        header.iter().any(|column| column == TABLE_DATE_COLUMN)
            && header.iter().any(|column| column == TABLE_PARTICIPANT_COLUMN)
    })
}

/// Participant tables are CSV exports from the task software. The subject
/// and start time come from the first data row; the file name must have
/// been renamed to `000<subject>-<visit>_...` to be accepted.
#[instrument(level = "debug", skip(preview, zone), fields(path = %path.display()))]
pub(crate) fn extract(preview: &Preview, path: &Path, zone: &ReportingZone) -> Result<ExtractedMetadata> {
    let text = preview.text();
    let mut reader = ReaderBuilder::new().flexible(true).trim(Trim::All).from_reader(text.as_bytes());
    let headers = reader.headers().or_raise(|| ErrorKind::MissingField("header"))?.clone();
    let date_column = column(&headers, TABLE_DATE_COLUMN)?;
    let participant_column = column(&headers, TABLE_PARTICIPANT_COLUMN)?;

    let row = reader.records().next().ok_or_raise(|| ErrorKind::HeaderOnly)?.or_raise(|| ErrorKind::ParseError {
        field: "row",
        value: "first data row is not valid CSV".to_string(),
    })?;
    let raw_date = row.get(date_column).ok_or_raise(|| ErrorKind::MissingField(TABLE_DATE_COLUMN))?;
    let raw_participant =
        row.get(participant_column).ok_or_raise(|| ErrorKind::MissingField(TABLE_PARTICIPANT_COLUMN))?;

    // An export that was never renamed is skipped whatever its contents.
    let subject = SubjectCode::normalize(raw_participant)?;
    let visit = check_naming_convention(file_name(path)?, &subject)?;
    let timestamp = zone.resolve_local(parse_date(raw_date)?)?;

    Ok(ExtractedMetadata {
        subject,
        timestamp,
        format: Format::ParticipantTable,
        visit,
    })
}

fn column(headers: &StringRecord, name: &'static str) -> Result<usize> {
    headers.iter().position(|column| column == name).ok_or_raise(|| ErrorKind::MissingField(name))
}

/// `2015_Jan_02_0403`, local time.
fn parse_date(raw: &str) -> Result<PrimitiveDateTime> {
    let invalid = || ErrorKind::ParseError {
        field: TABLE_DATE_COLUMN,
        value: raw.to_string(),
    };
    let captures = TABLE_DATE_REGEX.captures(raw).ok_or_raise(invalid)?;
    let number = |index: usize| -> Result<u16> {
        captures.get(index).and_then(|m| m.as_str().parse::<u16>().ok()).ok_or_raise(invalid)
    };
    let month = captures.get(2).and_then(|m| month_from_abbreviation(m.as_str())).ok_or_raise(invalid)?;
    let year = i32::from(number(1)?);
    let day = u8::try_from(number(3)?).or_raise(invalid)?;
    let hour = u8::try_from(number(4)?).or_raise(invalid)?;
    let minute = u8::try_from(number(5)?).or_raise(invalid)?;
    let date = Date::from_calendar_date(year, month, day).or_raise(invalid)?;
    let time = Time::from_hms(hour, minute, 0).or_raise(invalid)?;
    Ok(PrimitiveDateTime::new(date, time))
}

fn month_from_abbreviation(abbreviation: &str) -> Option<Month> {
    Some(match abbreviation.to_ascii_lowercase().as_str() {
        "jan" => Month::January,
        "feb" => Month::February,
        "mar" => Month::March,
        "apr" => Month::April,
        "may" => Month::May,
        "jun" => Month::June,
        "jul" => Month::July,
        "aug" => Month::August,
        "sep" => Month::September,
        "oct" => Month::October,
        "nov" => Month::November,
        "dec" => Month::December,
        _ => return None,
    })
}

/// Returns the visit number from the file name.
///
/// Test subjects are exempt from the convention (their visit is still picked
/// up when the name happens to follow it).
fn check_naming_convention(name: &str, subject: &SubjectCode) -> Result<Option<u32>> {
    let captures = NAMING_CONVENTION_REGEX.captures(name);
    let visit = captures.as_ref().and_then(|c| c.get(2)).and_then(|m| m.as_str().parse::<u32>().ok());
    if subject.is_test() {
        return Ok(visit);
    }
    let named_subject = captures.as_ref().and_then(|c| c.get(1)).map(|m| m.as_str());
    match (named_subject, visit) {
        (Some(named), Some(visit)) if named == subject.as_str() => Ok(Some(visit)),
        _ => exn::bail!(ErrorKind::NamingConvention {
            file: name.to_string(),
            expected: format!("000{subject}-<visit>_*"),
        }),
    }
}
