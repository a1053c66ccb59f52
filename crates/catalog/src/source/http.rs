//! Archive search over HTTP.

use super::CatalogSource;
use crate::error::{ErrorKind, Result};
use crate::models::{Acquisition, SearchResponse};
use async_trait::async_trait;
use exn::ResultExt;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::instrument;

const LOCAL_HOSTNAMES: [&str; 1] = ["localhost"];

/// Lists acquisitions through the archive's search endpoint.
///
/// Requests share a semaphore so that however many callers hold a clone of
/// the source, no more than the configured number of requests are in flight.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    instance: String,
    api_key: String,
    group: String,
    project: String,
    permits: Arc<Semaphore>,
}
impl HttpSource {
    /// `instance` is a host with an optional port (`archive.example.org`,
    /// `localhost:8080`).
    pub fn new(
        instance: impl Into<String>,
        api_key: impl Into<String>,
        group: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            instance: instance.into(),
            api_key: api_key.into(),
            group: group.into(),
            project: project.into(),
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// Maximum number of concurrent requests (at least one).
    pub fn with_concurrency(mut self, requests: usize) -> Self {
        self.permits = Arc::new(Semaphore::new(requests.max(1)));
        self
    }

    /// `http` for local development instances, `https` everywhere else.
    fn url(&self, path: &str) -> String {
        let hostname = self.instance.split(':').next().unwrap_or_default();
        let scheme = match LOCAL_HOSTNAMES.contains(&hostname) {
            true => "http",
            false => "https",
        };
        format!("{scheme}://{}/api{path}", self.instance)
    }

    fn search_body(&self) -> serde_json::Value {
        json!({
            "groups": {"filtered": {"filter": {"query": {"match": {"name": self.group}}}}},
            "projects": {"filtered": {"filter": {"query": {"match": {"label": self.project}}}}},
            "path": "acquisitions",
        })
    }
}

#[async_trait]
impl CatalogSource for HttpSource {
    fn name(&self) -> &str {
        &self.instance
    }

    #[instrument(skip(self), fields(instance = %self.instance, group = %self.group, project = %self.project, count))]
    async fn acquisitions(&self) -> Result<Vec<Acquisition>> {
        let _permit = self.permits.acquire().await.or_raise(|| ErrorKind::Network("request pool closed".to_string()))?;
        let response = self
            .client
            .post(self.url("/search"))
            .header(reqwest::header::AUTHORIZATION, format!("scitran-user {}", self.api_key))
            .json(&self.search_body())
            .send()
            .await
            .map_err(|err| ErrorKind::Network(err.to_string()))?
            .error_for_status()
            .map_err(|err| ErrorKind::Network(err.to_string()))?;
        let body: SearchResponse =
            response.json().await.or_raise(|| ErrorKind::InvalidData("search response"))?;
        let acquisitions = body.into_acquisitions();
        tracing::Span::current().record("count", acquisitions.len());
        Ok(acquisitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("localhost", "http://localhost/api/search")]
    #[case("localhost:8080", "http://localhost:8080/api/search")]
    #[case("archive.example.org", "https://archive.example.org/api/search")]
    #[case("archive.example.org:8443", "https://archive.example.org:8443/api/search")]
    fn test_url(#[case] instance: &str, #[case] expected: &str) {
        let source = HttpSource::new(instance, "key", "group", "project");
        assert_eq!(source.url("/search"), expected);
    }

    #[test]
    fn test_search_body() {
        let source = HttpSource::new("localhost", "key", "neuro", "Emotion Study");
        let body = source.search_body();
        assert_eq!(body["groups"]["filtered"]["filter"]["query"]["match"]["name"], "neuro");
        assert_eq!(body["projects"]["filtered"]["filter"]["query"]["match"]["label"], "Emotion Study");
        assert_eq!(body["path"], "acquisitions");
    }
}
