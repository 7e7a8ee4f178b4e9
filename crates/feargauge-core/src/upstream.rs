use std::collections::BTreeMap;
use std::fmt::Formatter;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::feed::{FeedFuture, FetchError, SentimentFeed};
use crate::http_client::{HttpClient, HttpRequest};
use crate::FeedId;

/// Everything one upstream call needs: where, with which headers, how long.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    pub feed: FeedId,
    pub endpoint: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl UpstreamConfig {
    pub fn new(feed: FeedId, endpoint: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            feed,
            endpoint: endpoint.into(),
            headers: BTreeMap::new(),
            timeout_ms,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("feed", &self.feed)
            .field("endpoint", &self.endpoint)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Fetches and decodes the raw JSON body of one upstream provider.
#[derive(Clone)]
pub struct UpstreamClient {
    config: UpstreamConfig,
    http_client: Arc<dyn HttpClient>,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    async fn fetch_once(&self) -> Result<serde_json::Value, FetchError> {
        let feed = self.config.feed;
        let timeout_ms = self.config.timeout_ms;
        let request = HttpRequest::get(&self.config.endpoint)
            .with_headers(self.config.headers.clone())
            .with_timeout_ms(timeout_ms);

        let started = Instant::now();
        debug!(feed = %feed, endpoint = %self.config.endpoint, "fetching upstream feed");

        // The deadline is enforced here so every transport honours it, not only reqwest.
        let response = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.http_client.execute(request),
        )
        .await
        .map_err(|_| {
            FetchError::network_failure(feed, format!("{feed} request timed out after {timeout_ms}ms"))
        })?
        .map_err(|error| FetchError::from_transport(feed, &error))?;

        debug!(
            feed = %feed,
            status = response.status,
            latency_ms = started.elapsed().as_millis() as u64,
            "upstream feed responded"
        );

        if !response.is_success() {
            return Err(FetchError::non_success_status(feed, response.status));
        }

        serde_json::from_str(&response.body).map_err(|error| {
            FetchError::decode_failure(feed, format!("{feed} body is not valid JSON: {error}"))
        })
    }
}

impl SentimentFeed for UpstreamClient {
    fn id(&self) -> FeedId {
        self.config.feed
    }

    fn cache_key(&self) -> String {
        format!("{}:{}", self.config.feed, self.config.endpoint)
    }

    fn fetch<'a>(&'a self) -> FeedFuture<'a> {
        Box::pin(self.fetch_once())
    }
}
