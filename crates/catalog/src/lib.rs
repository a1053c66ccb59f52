//! The archive side of a scan.
//!
//! Before a single local file is read, the project's acquisitions are fetched
//! once from a [`CatalogSource`](source::CatalogSource) and turned into two
//! read-only lookups:
//!
//! - a [`SessionCatalog`] of imaging sessions keyed by subject code, which the
//!   [`SessionMatcher`] searches for the session a file belongs to, and
//! - an [`UploadIndex`] of file content hashes already present on the archive,
//!   used to decide whether a file still needs uploading.

mod catalog;
pub mod error;
mod index;
mod matcher;
pub mod models;
pub mod source;

pub use crate::catalog::SessionCatalog;
pub use crate::index::{PriorUpload, UploadIndex, UploadStatus};
pub use crate::matcher::{DEFAULT_SUGGESTIONS, NoMatch, SessionMatcher};
use crate::error::Result;
use crate::models::Acquisition;
use crate::source::CatalogSource;
use tracing::instrument;

/// Both lookups, built from a single acquisition listing.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub sessions: SessionCatalog,
    pub uploads: UploadIndex,
}
impl Snapshot {
    pub fn from_acquisitions(acquisitions: &[Acquisition]) -> Self {
        Self {
            sessions: SessionCatalog::from_acquisitions(acquisitions),
            uploads: UploadIndex::from_acquisitions(acquisitions),
        }
    }

    #[instrument(skip(source), fields(source = source.name()))]
    pub async fn fetch(source: &dyn CatalogSource) -> Result<Self> {
        let acquisitions = source.acquisitions().await?;
        let snapshot = Self::from_acquisitions(&acquisitions);
        tracing::info!(
            acquisitions = acquisitions.len(),
            sessions = snapshot.sessions.len(),
            uploads = snapshot.uploads.len(),
            "fetched catalog"
        );
        Ok(snapshot)
    }
}
