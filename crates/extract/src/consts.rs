use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Only this many lines of a file are ever looked at for classification and
/// text-based extraction.
pub(crate) const PREVIEW_LINES: usize = 30;

pub(crate) const PHYSIO_PREFIX: &str = "% Start time: ";
pub(crate) const PRODUCT_LOG_MARKER: &str = "Product = ispot";
pub(crate) const PRODUCT_LOG_DATETIME_PREFIX: &str = "DateTime = ";
pub(crate) const TABLE_DATE_COLUMN: &str = "date";
pub(crate) const TABLE_PARTICIPANT_COLUMN: &str = "participant";

// Subject codes: a two-letter site prefix (`ex12345`), or zero-padded with an
// optional visit number (`00012345-2`).
regex!(SUBJECT_PREFIXED_REGEX, r"[a-zA-Z]{2}(\d{5})");
regex!(SUBJECT_ZERO_PADDED_REGEX, r"\b000(\d{5})(?:-\d+)?\b");
// Renamed participant table exports: `00012345-2_whatever.csv`
regex!(NAMING_CONVENTION_REGEX, r"^000(\d{5})-(\d+)_");
// `2015_Jan_02_0403`; some exports use a space before the time.
regex!(TABLE_DATE_REGEX, r"^(\d{4})_([A-Za-z]{3})_(\d{1,2})[_ ](\d{2})(\d{2})$");
