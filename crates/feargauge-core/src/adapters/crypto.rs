//! alternative.me crypto fear & greed adapter.
//!
//! ```text
//! GET https://api.alternative.me/fng/?limit=100
//! { "name": "Fear and Greed Index",
//!   "data": [ { "value": "70", "value_classification": "Greed",
//!               "timestamp": "1704067200", "time_until_update": "3600" }, ... ] }
//! ```
//!
//! `value` and `timestamp` are string-encoded integers. Only the most recent
//! entry carries `time_until_update`.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::ShapeError;
use crate::{FeedId, SentimentReading, UtcDateTime};

const FEED: FeedId = FeedId::Crypto;

#[derive(Debug, Deserialize)]
struct CryptoIndexPayload {
    #[serde(default)]
    name: Option<String>,
    data: Vec<CryptoDataPoint>,
}

#[derive(Debug, Deserialize)]
struct CryptoDataPoint {
    value: String,
    value_classification: String,
    timestamp: String,
    #[serde(default)]
    time_until_update: Option<String>,
}

/// Normalized crypto series, most recent reading first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoIndex {
    pub name: Option<String>,
    pub readings: Vec<SentimentReading>,
    pub next_update_secs: Option<u64>,
}

impl CryptoIndex {
    pub fn latest(&self) -> Option<&SentimentReading> {
        self.readings.first()
    }
}

/// Validates a crypto payload and maps it onto canonical readings.
pub fn parse_crypto_payload(payload: &Value) -> Result<CryptoIndex, ShapeError> {
    let parsed = CryptoIndexPayload::deserialize(payload)
        .map_err(|error| ShapeError::from_serde(FEED, &error))?;

    if parsed.data.is_empty() {
        return Err(ShapeError::new(
            FEED,
            "data",
            "reading series must not be empty",
        ));
    }

    let next_update_secs = parsed
        .data
        .first()
        .and_then(|point| point.time_until_update.as_deref())
        .and_then(|raw| raw.trim().parse::<u64>().ok());

    let readings = parsed
        .data
        .into_iter()
        .enumerate()
        .map(|(index, point)| to_reading(index, point))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(latest) = readings.first() {
        if !latest.label_matches_band() {
            debug!(
                value = latest.value,
                label = %latest.label,
                band = %latest.canonical_label(),
                "crypto label differs from canonical band"
            );
        }
    }

    Ok(CryptoIndex {
        name: parsed.name,
        readings,
        next_update_secs,
    })
}

fn to_reading(index: usize, point: CryptoDataPoint) -> Result<SentimentReading, ShapeError> {
    let value = point.value.trim().parse::<i32>().map_err(|_| {
        ShapeError::new(
            FEED,
            format!("data[{index}].value"),
            format!("expected string-encoded integer, got '{}'", point.value),
        )
    })?;

    let seconds = point.timestamp.trim().parse::<i64>().map_err(|_| {
        ShapeError::new(
            FEED,
            format!("data[{index}].timestamp"),
            format!("expected unix seconds, got '{}'", point.timestamp),
        )
    })?;
    let observed_at = UtcDateTime::from_unix_seconds(seconds).map_err(|error| {
        ShapeError::new(FEED, format!("data[{index}].timestamp"), error.to_string())
    })?;

    Ok(SentimentReading::new(
        value,
        point.value_classification,
        observed_at,
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn maps_series_most_recent_first() {
        let payload = json!({
            "name": "Fear and Greed Index",
            "data": [
                { "value": "70", "value_classification": "Greed", "timestamp": "1704153600", "time_until_update": "3600" },
                { "value": "24", "value_classification": "Extreme Fear", "timestamp": "1704067200" }
            ],
            "metadata": { "error": null }
        });

        let index = parse_crypto_payload(&payload).expect("valid payload");

        assert_eq!(index.name.as_deref(), Some("Fear and Greed Index"));
        assert_eq!(index.readings.len(), 2);
        let latest = index.latest().expect("non-empty");
        assert_eq!(latest.value, 70);
        assert_eq!(latest.label, "Greed");
        assert_eq!(latest.observed_at.format_rfc3339(), "2024-01-02T00:00:00Z");
        assert_eq!(index.next_update_secs, Some(3600));
    }

    #[test]
    fn empty_series_is_invalid_shape() {
        let error = parse_crypto_payload(&json!({ "name": "x", "data": [] }))
            .expect_err("must fail");
        assert_eq!(error.field(), "data");
    }

    #[test]
    fn missing_data_is_invalid_shape() {
        let error = parse_crypto_payload(&json!({ "name": "x" })).expect_err("must fail");
        assert_eq!(error.feed(), FeedId::Crypto);
        assert!(error.reason().contains("data"));
    }

    #[test]
    fn non_numeric_value_names_the_entry() {
        let payload = json!({
            "data": [
                { "value": "70", "value_classification": "Greed", "timestamp": "1704153600" },
                { "value": "high", "value_classification": "Greed", "timestamp": "1704067200" }
            ]
        });

        let error = parse_crypto_payload(&payload).expect_err("must fail");
        assert_eq!(error.field(), "data[1].value");
    }

    #[test]
    fn out_of_range_value_is_accepted() {
        let payload = json!({
            "data": [
                { "value": "112", "value_classification": "Extreme Greed", "timestamp": "1704153600" }
            ]
        });

        let index = parse_crypto_payload(&payload).expect("range is not a shape concern");
        assert_eq!(index.readings[0].value, 112);
        assert!(!index.readings[0].in_range());
    }
}
