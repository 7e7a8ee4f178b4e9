//! # Feargauge Core
//!
//! Fetches the crypto and stock fear & greed indices, validates both
//! payloads and merges them into one comparative [`Snapshot`] with derived
//! [`Insights`].
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider payload schemas (alternative.me, RapidAPI) |
//! | [`aggregator`] | Concurrent two-feed aggregation |
//! | [`cache`] | Opt-in payload cache decorator |
//! | [`config`] | Endpoints, credentials, timeout |
//! | [`domain`] | Readings, historical series, snapshot |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`feed`] | Feed trait and fetch errors |
//! | [`http_client`] | HTTP client abstraction |
//! | [`insights`] | Divergence, dominant side, overall sentiment |
//! | [`retry`] | Opt-in retry decorator |
//! | [`source`] | Feed identifiers |
//! | [`upstream`] | Upstream client for one provider |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use feargauge_core::{FeedConfig, ReqwestHttpClient, SnapshotAggregator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FeedConfig::builder().with_env().build()?;
//!     let aggregator = SnapshotAggregator::from_config(&config, Arc::new(ReqwestHttpClient::new()))?;
//!
//!     let report = aggregator.report().await?;
//!     println!("{} ({})", report.insights.overall.describe(), report.insights.average);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ CLI / caller         │
//! └──────────┬───────────┘
//!            │ report()
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────┐
//! │ SnapshotAggregator   │────▶│ InsightEngine    │
//! └──────────┬───────────┘     └──────────────────┘
//!            │ try_join!
//!      ┌─────┴──────┐
//!      ▼            ▼
//! ┌─────────┐  ┌─────────┐
//! │ crypto  │  │ stock   │   UpstreamClient (+ retry / cache)
//! └────┬────┘  └────┬────┘
//!      └─────┬──────┘
//!            ▼
//! ┌──────────────────────┐
//! │ HttpClient (reqwest) │
//! └──────────────────────┘
//! ```
//!
//! ## Security
//!
//! - The RapidAPI key is read from the environment and never logged
//! - `Debug` output of configs and requests lists header names only

pub mod adapters;
pub mod aggregator;
pub mod cache;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod feed;
pub mod http_client;
pub mod insights;
pub mod retry;
pub mod source;
pub mod upstream;

// Adapters
pub use adapters::{parse_crypto_payload, parse_stock_payload, CryptoIndex, ShapeError, StockIndex};

// Aggregation
pub use aggregator::{AggregationCause, AggregationError, AggregationErrorKind, SnapshotAggregator};

// Caching
pub use cache::{CacheStore, CachedFeed};

// Configuration
pub use config::{FeedConfig, FeedConfigBuilder, RapidApiCredentials};

// Domain models
pub use domain::{
    HistoricalPoint, HistoricalSeries, HistoryOffset, RangeWarning, SentimentLabel,
    SentimentReading, Snapshot, UtcDateTime, MAX_SENTIMENT, MIN_SENTIMENT,
};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};

// Error types
pub use error::ValidationError;

// Feed trait and fetch errors
pub use feed::{FeedFuture, FetchError, FetchErrorKind, RawPayload, SentimentFeed};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient, StaticHttpClient, StaticRoute,
};

// Insights
pub use insights::{derive_insights, DominantSide, Insights, MarketReport, OverallSentiment};

// Retry logic
pub use retry::{Backoff, RetryConfig, RetryingFeed};

// Feed identifiers
pub use source::FeedId;

// Upstream client
pub use upstream::{UpstreamClient, UpstreamConfig};
