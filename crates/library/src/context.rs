use crate::error::{ErrorKind, Result};
use crate::header::{HeaderParser, NoHeaders};
use exn::ResultExt;
use sift_catalog::source::CatalogSource;
use sift_catalog::{DEFAULT_SUGGESTIONS, SessionMatcher, Snapshot};
use sift_extract::ReportingZone;
use std::sync::Arc;

/// Default number of files processed at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Everything a batch needs besides the folder itself.
///
/// Read-only for the duration of a batch, and shared by every file in it.
pub struct Context {
    pub snapshot: Snapshot,
    pub zone: ReportingZone,
    /// Maximum number of files processed at once (at least one).
    pub concurrency: usize,
    /// Maximum number of "did you mean" subjects per unmatched file.
    pub suggestions: usize,
    pub header_parser: Arc<dyn HeaderParser>,
}

impl Context {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            zone: ReportingZone::default(),
            concurrency: DEFAULT_CONCURRENCY,
            suggestions: DEFAULT_SUGGESTIONS,
            header_parser: Arc::new(NoHeaders),
        }
    }

    /// Fetch the catalog from `source` and build a context around it.
    pub async fn fetch(source: &dyn CatalogSource) -> Result<Self> {
        let snapshot = Snapshot::fetch(source).await.or_raise(|| ErrorKind::Catalog)?;
        Ok(Self::new(snapshot))
    }

    pub fn with_zone(mut self, zone: ReportingZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_suggestions(mut self, suggestions: usize) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_header_parser(mut self, parser: impl HeaderParser + 'static) -> Self {
        self.header_parser = Arc::new(parser);
        self
    }

    pub(crate) fn matcher(&self) -> SessionMatcher<'_> {
        SessionMatcher::new(&self.snapshot.sessions, self.zone).with_suggestions(self.suggestions)
    }
}
