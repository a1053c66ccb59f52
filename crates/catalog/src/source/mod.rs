//! Where the acquisition listing comes from.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use self::http::HttpSource;
use crate::error::{ErrorKind, Result};
use crate::models::{Acquisition, SearchResponse};
use async_trait::async_trait;
use exn::ResultExt;

/// A listing of every acquisition (with its session and file hashes) in the
/// project being uploaded to.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Name of the source (used for logging only).
    fn name(&self) -> &str;

    async fn acquisitions(&self) -> Result<Vec<Acquisition>>;
}

/// A fixed, in-memory listing, for tests and offline runs against a saved
/// search response.
///
/// # Examples
///
/// ```
/// use sift_catalog::source::{CatalogSource, StaticSource};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let source = StaticSource::from_json(r#"{"acquisitions": [{"_source": {"uid": "1.2.3"}}]}"#).unwrap();
/// assert_eq!(source.acquisitions().await.unwrap().len(), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    acquisitions: Vec<Acquisition>,
}
impl StaticSource {
    pub fn new(acquisitions: Vec<Acquisition>) -> Self {
        Self { acquisitions }
    }

    /// Parse a saved search response (`{"acquisitions": [{"_source": ...}]}`).
    pub fn from_json(json: &str) -> Result<Self> {
        let response: SearchResponse =
            serde_json::from_str(json).or_raise(|| ErrorKind::InvalidData("search response"))?;
        Ok(Self::new(response.into_acquisitions()))
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn acquisitions(&self) -> Result<Vec<Acquisition>> {
        Ok(self.acquisitions.clone())
    }
}
