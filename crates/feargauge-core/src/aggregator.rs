//! Concurrent two-feed aggregation.
//!
//! [`SnapshotAggregator`] fetches and validates both feeds concurrently and
//! merges them into one [`Snapshot`]. It is fail-fast: if either side fails,
//! the other in-flight call is dropped and no partial snapshot is returned.

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::adapters::{parse_crypto_payload, parse_stock_payload, CryptoIndex, ShapeError, StockIndex};
use crate::cache::{CacheStore, CachedFeed};
use crate::config::FeedConfig;
use crate::feed::{FetchError, SentimentFeed};
use crate::http_client::HttpClient;
use crate::insights::MarketReport;
use crate::retry::RetryingFeed;
use crate::upstream::UpstreamClient;
use crate::{FeedId, Snapshot, UtcDateTime, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationErrorKind {
    /// A feed call failed at the transport, status or decode level.
    UpstreamUnavailable,
    /// A feed answered with JSON that does not match its schema.
    InvalidShape,
    /// The caller cancelled the aggregation.
    Cancelled,
}

impl AggregationErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::UpstreamUnavailable => "aggregation.upstream_unavailable",
            Self::InvalidShape => "aggregation.invalid_shape",
            Self::Cancelled => "aggregation.cancelled",
        }
    }
}

/// Underlying failure behind an [`AggregationError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationCause {
    Fetch(FetchError),
    Shape(ShapeError),
}

impl Display for AggregationCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch(error) => Display::fmt(error, f),
            Self::Shape(error) => Display::fmt(error, f),
        }
    }
}

/// Aggregation failure naming the failing side and its cause.
///
/// `side` and `cause` are only absent for [`AggregationErrorKind::Cancelled`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationError {
    kind: AggregationErrorKind,
    side: Option<FeedId>,
    cause: Option<AggregationCause>,
}

impl AggregationError {
    pub fn upstream_unavailable(side: FeedId, error: FetchError) -> Self {
        Self {
            kind: AggregationErrorKind::UpstreamUnavailable,
            side: Some(side),
            cause: Some(AggregationCause::Fetch(error)),
        }
    }

    pub fn invalid_shape(side: FeedId, error: ShapeError) -> Self {
        Self {
            kind: AggregationErrorKind::InvalidShape,
            side: Some(side),
            cause: Some(AggregationCause::Shape(error)),
        }
    }

    pub const fn cancelled() -> Self {
        Self {
            kind: AggregationErrorKind::Cancelled,
            side: None,
            cause: None,
        }
    }

    pub const fn kind(&self) -> AggregationErrorKind {
        self.kind
    }

    pub const fn side(&self) -> Option<FeedId> {
        self.side
    }

    pub fn cause(&self) -> Option<&AggregationCause> {
        self.cause.as_ref()
    }

    pub fn fetch_error(&self) -> Option<&FetchError> {
        match &self.cause {
            Some(AggregationCause::Fetch(error)) => Some(error),
            _ => None,
        }
    }

    pub fn shape_error(&self) -> Option<&ShapeError> {
        match &self.cause {
            Some(AggregationCause::Shape(error)) => Some(error),
            _ => None,
        }
    }

    /// Most specific machine code: the fetch code for upstream failures,
    /// the aggregation code otherwise.
    pub fn code(&self) -> &'static str {
        match &self.cause {
            Some(AggregationCause::Fetch(error)) => error.code(),
            _ => self.kind.code(),
        }
    }

    /// Whether repeating the same aggregation may succeed.
    pub fn retryable(&self) -> bool {
        match &self.cause {
            Some(AggregationCause::Fetch(error)) => error.retryable(),
            _ => false,
        }
    }
}

impl Display for AggregationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, self.side, &self.cause) {
            (AggregationErrorKind::UpstreamUnavailable, Some(side), Some(cause)) => {
                write!(f, "{side} feed unavailable: {cause}")
            }
            (AggregationErrorKind::InvalidShape, Some(side), Some(cause)) => {
                write!(f, "{side} feed returned an invalid payload: {cause}")
            }
            _ => f.write_str("aggregation cancelled"),
        }
    }
}

impl std::error::Error for AggregationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            Some(AggregationCause::Fetch(error)) => Some(error),
            Some(AggregationCause::Shape(error)) => Some(error),
            None => None,
        }
    }
}

/// Fetches both feeds concurrently and merges them into a [`Snapshot`].
///
/// Sides are positional: the first feed fills the crypto side, the second
/// the stock side.
#[derive(Clone)]
pub struct SnapshotAggregator {
    crypto: Arc<dyn SentimentFeed>,
    stock: Arc<dyn SentimentFeed>,
}

impl SnapshotAggregator {
    pub fn new(crypto: Arc<dyn SentimentFeed>, stock: Arc<dyn SentimentFeed>) -> Self {
        Self { crypto, stock }
    }

    /// Builds both upstream clients from `config`, wrapping them in the
    /// retry and cache decorators when those are enabled.
    pub fn from_config(
        config: &FeedConfig,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, ValidationError> {
        let stock_upstream = config.stock_upstream()?;
        let crypto: Arc<dyn SentimentFeed> = Arc::new(UpstreamClient::new(
            config.crypto_upstream(),
            Arc::clone(&http_client),
        ));
        let stock: Arc<dyn SentimentFeed> =
            Arc::new(UpstreamClient::new(stock_upstream, http_client));

        let store = config.cache_ttl().map(CacheStore::new);
        let decorate = |feed: Arc<dyn SentimentFeed>| -> Arc<dyn SentimentFeed> {
            let feed: Arc<dyn SentimentFeed> = match config.retry() {
                Some(retry) => Arc::new(RetryingFeed::new(feed, retry.clone())),
                None => feed,
            };
            match &store {
                Some(store) => Arc::new(CachedFeed::new(feed, store.clone())),
                None => feed,
            }
        };

        Ok(Self::new(decorate(crypto), decorate(stock)))
    }

    /// Fetches, validates and merges both feeds.
    pub async fn build_snapshot(&self) -> Result<Snapshot, AggregationError> {
        let started = Instant::now();

        let (crypto, stock) = match tokio::try_join!(self.fetch_crypto(), self.fetch_stock()) {
            Ok(pair) => pair,
            Err(error) => {
                warn!(
                    side = ?error.side(),
                    code = error.code(),
                    retryable = error.retryable(),
                    "aggregation failed: {error}"
                );
                return Err(error);
            }
        };

        let snapshot = Snapshot::new(
            crypto.readings,
            crypto.next_update_secs,
            stock.reading,
            stock.history,
            UtcDateTime::now(),
        )
        .map_err(|error| {
            AggregationError::invalid_shape(
                FeedId::Crypto,
                ShapeError::new(FeedId::Crypto, "data", error.to_string()),
            )
        })?;

        for warning in snapshot.range_warnings() {
            warn!(
                feed = %warning.feed,
                field = %warning.field,
                value = warning.value,
                "sentiment value outside the 0-100 scale"
            );
        }

        debug!(
            latency_ms = elapsed_ms(started.elapsed()),
            crypto = snapshot.crypto.value,
            stock = snapshot.stock.value,
            "snapshot built"
        );
        Ok(snapshot)
    }

    /// Like [`build_snapshot`](Self::build_snapshot), but gives up with
    /// [`AggregationErrorKind::Cancelled`] once `token` is cancelled.
    pub async fn build_snapshot_until(
        &self,
        token: &CancellationToken,
    ) -> Result<Snapshot, AggregationError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("aggregation cancelled, dropping in-flight feed calls");
                Err(AggregationError::cancelled())
            }
            result = self.build_snapshot() => result,
        }
    }

    /// Snapshot plus derived insights.
    pub async fn report(&self) -> Result<MarketReport, AggregationError> {
        self.build_snapshot().await.map(MarketReport::new)
    }

    pub async fn report_until(
        &self,
        token: &CancellationToken,
    ) -> Result<MarketReport, AggregationError> {
        self.build_snapshot_until(token).await.map(MarketReport::new)
    }

    async fn fetch_crypto(&self) -> Result<CryptoIndex, AggregationError> {
        let side = FeedId::Crypto;
        let payload = self
            .crypto
            .fetch()
            .await
            .map_err(|error| AggregationError::upstream_unavailable(side, error))?;
        parse_crypto_payload(&payload).map_err(|error| AggregationError::invalid_shape(side, error))
    }

    async fn fetch_stock(&self) -> Result<StockIndex, AggregationError> {
        let side = FeedId::Stock;
        let payload = self
            .stock
            .fetch()
            .await
            .map_err(|error| AggregationError::upstream_unavailable(side, error))?;
        parse_stock_payload(&payload).map_err(|error| AggregationError::invalid_shape(side, error))
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
