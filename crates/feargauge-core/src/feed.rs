//! Sentiment feed trait and fetch error types.
//!
//! [`SentimentFeed`] is the contract shared by the two upstream clients and
//! by every decorator wrapped around them (cache, retry). The aggregator only
//! sees this trait, so decorating a feed never changes aggregation behavior.
//!
//! # Error kinds
//!
//! | Kind | Cause | Retryable |
//! |------|-------|-----------|
//! | [`FetchErrorKind::NetworkFailure`] | DNS, connect, reset, timeout | transport decides |
//! | [`FetchErrorKind::NonSuccessStatus`] | upstream answered outside 200-299 | 408, 429, 5xx |
//! | [`FetchErrorKind::DecodeFailure`] | body is not JSON | no |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::http_client::HttpError;
use crate::FeedId;

/// Decoded JSON body of an upstream response, before shape validation.
pub type RawPayload = Value;

pub type FeedFuture<'a> = Pin<Box<dyn Future<Output = Result<RawPayload, FetchError>> + Send + 'a>>;

/// Fetch-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    NetworkFailure,
    NonSuccessStatus,
    DecodeFailure,
}

impl FetchErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::NetworkFailure => "upstream.network_failure",
            Self::NonSuccessStatus => "upstream.non_success_status",
            Self::DecodeFailure => "upstream.decode_failure",
        }
    }
}

/// Structured error for a single upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    feed: FeedId,
    message: String,
    status: Option<u16>,
    retryable: bool,
}

impl FetchError {
    pub fn network_failure(feed: FeedId, message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::NetworkFailure,
            feed,
            message: message.into(),
            status: None,
            retryable: true,
        }
    }

    pub fn from_transport(feed: FeedId, error: &HttpError) -> Self {
        Self {
            retryable: error.retryable(),
            ..Self::network_failure(feed, format!("{feed} transport error: {}", error.message()))
        }
    }

    pub fn non_success_status(feed: FeedId, status: u16) -> Self {
        Self {
            kind: FetchErrorKind::NonSuccessStatus,
            feed,
            message: format!("{feed} feed returned status {status}"),
            status: Some(status),
            retryable: status == 408 || status == 429 || (500..600).contains(&status),
        }
    }

    pub fn decode_failure(feed: FeedId, message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::DecodeFailure,
            feed,
            message: message.into(),
            status: None,
            retryable: false,
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub const fn feed(&self) -> FeedId {
        self.feed
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status for [`FetchErrorKind::NonSuccessStatus`].
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

/// Upstream sentiment feed contract.
///
/// Implementations must be `Send + Sync`; the aggregator polls both feeds
/// concurrently from one task.
pub trait SentimentFeed: Send + Sync {
    /// Which side of the snapshot this feed supplies.
    fn id(&self) -> FeedId;

    /// Stable key identifying the request this feed issues. Used by the cache decorator.
    fn cache_key(&self) -> String {
        self.id().as_str().to_owned()
    }

    /// Performs one fetch. A failed attempt is terminal for this call.
    fn fetch<'a>(&'a self) -> FeedFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_keep_code_and_retry_hint() {
        let unavailable = FetchError::non_success_status(FeedId::Stock, 503);
        assert_eq!(unavailable.status(), Some(503));
        assert!(unavailable.retryable());
        assert_eq!(unavailable.code(), "upstream.non_success_status");

        let forbidden = FetchError::non_success_status(FeedId::Stock, 403);
        assert!(!forbidden.retryable());
        assert!(forbidden.to_string().contains("403"));
    }

    #[test]
    fn transport_errors_inherit_retryability() {
        let error = FetchError::from_transport(FeedId::Crypto, &HttpError::non_retryable("tls"));
        assert_eq!(error.kind(), FetchErrorKind::NetworkFailure);
        assert!(!error.retryable());
        assert!(error.message().contains("crypto transport error"));
    }

    #[test]
    fn decode_failures_are_not_retryable() {
        let error = FetchError::decode_failure(FeedId::Crypto, "expected value at line 1");
        assert_eq!(error.code(), "upstream.decode_failure");
        assert!(!error.retryable());
    }
}
