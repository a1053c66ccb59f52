//! Session matching.
//!
//! A file belongs to the session its subject had on the same calendar day.
//! Days are compared in the reporting timezone for the file, and in the
//! session's own timezone (falling back to the reporting one) for the session.

use crate::SessionCatalog;
use crate::error::{ErrorKind, Result};
use crate::models::Session;
use exn::ResultExt;
use sift_extract::{ReportingZone, SubjectCode};
use std::fmt::{Display, Formatter, Result as FmtResult};
use time::{Date, OffsetDateTime};
use tracing::instrument;

/// Default number of "did you mean" subjects offered when nothing matches.
pub const DEFAULT_SUGGESTIONS: usize = 3;

/// Why no session could be found, with enough context to fix it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoMatch {
    pub subject: String,
    pub date: Date,
    /// Whether the subject has any sessions at all.
    pub has_sessions: bool,
    /// Subjects that *do* have a session on `date`, closest code first.
    pub suggestions: Vec<String>,
}
impl Display for NoMatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.has_sessions {
            true => write!(f, "could not find session for {} on {}", self.subject, self.date)?,
            false => write!(f, "subject {} has no sessions (none on {})", self.subject, self.date)?,
        }
        if !self.suggestions.is_empty() {
            write!(f, "; did you mean {}?", self.suggestions.join(", "))?;
        }
        Ok(())
    }
}

/// Finds the session a file belongs to.
#[derive(Debug, Clone, Copy)]
pub struct SessionMatcher<'a> {
    catalog: &'a SessionCatalog,
    zone: ReportingZone,
    suggestions: usize,
}
impl<'a> SessionMatcher<'a> {
    pub fn new(catalog: &'a SessionCatalog, zone: ReportingZone) -> Self {
        Self {
            catalog,
            zone,
            suggestions: DEFAULT_SUGGESTIONS,
        }
    }

    /// Maximum number of suggestions in a [`NoMatch`]; `0` disables them.
    pub fn with_suggestions(mut self, suggestions: usize) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// The first session (in catalog order) of `subject` on the calendar day
    /// of `timestamp`.
    #[instrument(level = "debug", skip(self), fields(subject = %subject))]
    pub fn find(&self, subject: &SubjectCode, timestamp: OffsetDateTime) -> Result<&'a Session> {
        let date = self.zone.local_date(timestamp).or_raise(|| ErrorKind::InvalidData("file timestamp"))?;
        let sessions = self.catalog.sessions(subject);
        if let Some(session) = sessions.iter().find(|session| self.on(session, date)) {
            return Ok(session);
        }
        exn::bail!(ErrorKind::NoMatchingSession(NoMatch {
            subject: subject.to_string(),
            date,
            has_sessions: !sessions.is_empty(),
            suggestions: self.suggest(subject, date),
        }))
    }

    fn on(&self, session: &Session, date: Date) -> bool {
        session.local_date(self.zone) == Some(date)
    }

    fn suggest(&self, subject: &SubjectCode, date: Date) -> Vec<String> {
        if self.suggestions == 0 {
            return Vec::new();
        }
        let mut candidates: Vec<(usize, &SubjectCode)> = self
            .catalog
            .subjects()
            .filter(|(candidate, _)| *candidate != subject)
            .filter(|(_, sessions)| sessions.iter().any(|session| self.on(session, date)))
            .map(|(candidate, _)| (strsim::levenshtein(subject.as_str(), candidate.as_str()), candidate))
            .collect();
        candidates.sort();
        candidates.into_iter().take(self.suggestions).map(|(_, candidate)| candidate.to_string()).collect()
    }
}
