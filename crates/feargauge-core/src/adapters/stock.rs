//! RapidAPI stock market fear & greed adapter.
//!
//! ```text
//! GET https://fear-and-greed-index.p.rapidapi.com/v1/fgi
//! X-RapidAPI-Host: fear-and-greed-index.p.rapidapi.com
//! X-RapidAPI-Key: <key>
//! { "lastUpdated": { "epochUnixSeconds": 1704067200, "humanDate": "2024-01-01T00:00:00.000Z" },
//!   "fgi": { "now": { "value": 40, "valueText": "Fear" }, "previousClose": {...},
//!            "oneWeekAgo": {...}, "oneMonthAgo": {...}, "oneYearAgo": {...} } }
//! ```

use serde::Deserialize;
use serde_json::Value;

use super::ShapeError;
use crate::{FeedId, HistoricalSeries, HistoryOffset, SentimentReading, UtcDateTime};

const FEED: FeedId = FeedId::Stock;

/// Host header value the provider expects when none is configured.
pub const DEFAULT_RAPIDAPI_HOST: &str = "fear-and-greed-index.p.rapidapi.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockIndexPayload {
    last_updated: LastUpdated,
    fgi: FgiBlock,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LastUpdated {
    epoch_unix_seconds: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FgiBlock {
    now: FgiValue,
    previous_close: FgiValue,
    one_week_ago: FgiValue,
    one_month_ago: FgiValue,
    one_year_ago: FgiValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FgiValue {
    value: i32,
    value_text: String,
}

/// Normalized stock reading plus its four historical offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockIndex {
    pub reading: SentimentReading,
    pub history: HistoricalSeries,
    pub last_updated: UtcDateTime,
}

/// Validates a stock payload and maps it onto canonical readings.
///
/// Historical readings are stamped `last_updated` minus the offset's nominal lookback.
pub fn parse_stock_payload(payload: &Value) -> Result<StockIndex, ShapeError> {
    let parsed = StockIndexPayload::deserialize(payload)
        .map_err(|error| ShapeError::from_serde(FEED, &error))?;

    let last_updated = UtcDateTime::from_unix_seconds(parsed.last_updated.epoch_unix_seconds)
        .map_err(|error| {
            ShapeError::new(FEED, "lastUpdated.epochUnixSeconds", error.to_string())
        })?;

    let FgiBlock {
        now,
        previous_close,
        one_week_ago,
        one_month_ago,
        one_year_ago,
    } = parsed.fgi;

    let history = HistoricalSeries::new(
        [
            (HistoryOffset::PreviousClose, previous_close),
            (HistoryOffset::OneWeekAgo, one_week_ago),
            (HistoryOffset::OneMonthAgo, one_month_ago),
            (HistoryOffset::OneYearAgo, one_year_ago),
        ]
        .into_iter()
        .map(|(offset, point)| {
            let observed_at = last_updated.days_before(offset.lookback_days());
            (offset, SentimentReading::new(point.value, point.value_text, observed_at))
        })
        .collect(),
    )
    .map_err(|error| ShapeError::new(FEED, "fgi", error.to_string()))?;

    Ok(StockIndex {
        reading: SentimentReading::new(now.value, now.value_text, last_updated),
        history,
        last_updated,
    })
}
