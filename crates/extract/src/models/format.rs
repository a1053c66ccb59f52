use std::fmt::{Display, Formatter, Result as FmtResult};

/// Source format of a session file, as decided by content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "kebab-case"))]
pub enum Format {
    /// Binary imaging file; everything that isn't one of the text formats.
    Imaging,
    /// Physiological recording (`% Start time: ...` header).
    Physiological,
    /// Behavioral task product log (`Product = ispot`).
    ProductLog,
    /// Behavioral task participant table (CSV with `date` and `participant`
    /// columns).
    ParticipantTable,
}
impl Format {
    /// Returns the short name (for displaying to user)
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Imaging => "imaging",
            Format::Physiological => "physiological",
            Format::ProductLog => "product-log",
            Format::ParticipantTable => "participant-table",
        }
    }
}
impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
