//! Per-provider payload adapters.
//!
//! Each provider publishes its own JSON schema. An adapter deserializes that
//! schema into provider DTOs and maps it onto the canonical
//! [`SentimentReading`](crate::SentimentReading). The two schemas are never
//! shared or merged.

pub mod crypto;
pub mod stock;

use std::fmt::{Display, Formatter};

use crate::FeedId;

pub use crypto::{parse_crypto_payload, CryptoIndex};
pub use stock::{parse_stock_payload, StockIndex};

/// A payload that decoded as JSON but does not match the provider schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError {
    feed: FeedId,
    field: String,
    reason: String,
}

impl ShapeError {
    pub fn new(feed: FeedId, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            feed,
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn from_serde(feed: FeedId, error: &serde_json::Error) -> Self {
        Self::new(feed, "<payload>", error.to_string())
    }

    pub const fn feed(&self) -> FeedId {
        self.feed
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for ShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} payload field '{}' is invalid: {}",
            self.feed, self.field, self.reason
        )
    }
}

impl std::error::Error for ShapeError {}
