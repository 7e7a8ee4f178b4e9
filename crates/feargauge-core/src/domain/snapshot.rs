use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{FeedId, HistoricalSeries, SentimentReading, UtcDateTime, ValidationError};

/// Merged result of one successful fetch of both feeds.
///
/// Constructed once per aggregation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord")]
pub struct Snapshot {
    pub crypto: SentimentReading,
    /// Full crypto series as published, most recent first. `crypto_history[0] == crypto`.
    pub crypto_history: Vec<SentimentReading>,
    /// Seconds until the crypto provider publishes its next reading, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crypto_next_update_secs: Option<u64>,
    pub stock: SentimentReading,
    pub stock_history: HistoricalSeries,
    pub fetched_at: UtcDateTime,
}

/// Wire form of [`Snapshot`], checked before it becomes one.
#[derive(Deserialize)]
struct SnapshotRecord {
    crypto: SentimentReading,
    crypto_history: Vec<SentimentReading>,
    #[serde(default)]
    crypto_next_update_secs: Option<u64>,
    stock: SentimentReading,
    stock_history: HistoricalSeries,
    fetched_at: UtcDateTime,
}

impl TryFrom<SnapshotRecord> for Snapshot {
    type Error = ValidationError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        let snapshot = Self::new(
            record.crypto_history,
            record.crypto_next_update_secs,
            record.stock,
            record.stock_history,
            record.fetched_at,
        )?;
        if snapshot.crypto != record.crypto {
            return Err(ValidationError::CryptoHeadlineMismatch);
        }
        Ok(snapshot)
    }
}

impl Snapshot {
    pub fn new(
        crypto_history: Vec<SentimentReading>,
        crypto_next_update_secs: Option<u64>,
        stock: SentimentReading,
        stock_history: HistoricalSeries,
        fetched_at: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        let crypto = crypto_history
            .first()
            .cloned()
            .ok_or(ValidationError::EmptyCryptoSeries)?;

        Ok(Self {
            crypto,
            crypto_history,
            crypto_next_update_secs,
            stock,
            stock_history,
            fetched_at,
        })
    }

    /// Readings whose value falls outside 0-100.
    ///
    /// Upstream values are kept as-is; callers surface these as warnings.
    pub fn range_warnings(&self) -> Vec<RangeWarning> {
        let crypto = self
            .crypto_history
            .iter()
            .enumerate()
            .filter(|(_, reading)| !reading.in_range())
            .map(|(index, reading)| RangeWarning {
                feed: FeedId::Crypto,
                field: format!("data[{index}]"),
                value: reading.value,
            });

        let stock_now = std::iter::once(("now".to_owned(), &self.stock));
        let stock_history = self
            .stock_history
            .iter()
            .map(|point| (point.offset.as_str().to_owned(), &point.reading));
        let stock = stock_now
            .chain(stock_history)
            .filter(|(_, reading)| !reading.in_range())
            .map(|(field, reading)| RangeWarning {
                feed: FeedId::Stock,
                field,
                value: reading.value,
            });

        crypto.chain(stock).collect()
    }
}

/// A structurally valid reading whose value is off the 0-100 scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeWarning {
    pub feed: FeedId,
    pub field: String,
    pub value: i32,
}

impl Display for RangeWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} feed reported {}={} outside the 0-100 scale",
            self.feed, self.field, self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HistoryOffset;

    fn reading(value: i32) -> SentimentReading {
        SentimentReading::new(
            value,
            "Neutral",
            UtcDateTime::parse("2024-01-01T00:00:00Z").expect("valid"),
        )
    }

    fn history(values: [i32; 4]) -> HistoricalSeries {
        HistoricalSeries::new(
            HistoryOffset::ALL
                .into_iter()
                .zip(values)
                .map(|(offset, value)| (offset, reading(value)))
                .collect(),
        )
        .expect("complete")
    }

    #[test]
    fn headline_crypto_reading_is_first_in_series() {
        let snapshot = Snapshot::new(
            vec![reading(70), reading(65)],
            Some(3600),
            reading(40),
            history([41, 42, 43, 44]),
            UtcDateTime::now(),
        )
        .expect("valid snapshot");

        assert_eq!(snapshot.crypto.value, 70);
        assert_eq!(snapshot.crypto_history.len(), 2);
    }

    #[test]
    fn empty_crypto_series_is_rejected() {
        let err = Snapshot::new(
            Vec::new(),
            None,
            reading(40),
            history([41, 42, 43, 44]),
            UtcDateTime::now(),
        )
        .expect_err("must fail");
        assert_eq!(err, ValidationError::EmptyCryptoSeries);
    }

    #[test]
    fn range_warnings_name_feed_and_field() {
        let snapshot = Snapshot::new(
            vec![reading(50), reading(104)],
            None,
            reading(-2),
            history([41, 42, 430, 44]),
            UtcDateTime::now(),
        )
        .expect("valid snapshot");

        let warnings = snapshot.range_warnings();
        assert_eq!(warnings.len(), 3);
        assert_eq!(warnings[0].feed, FeedId::Crypto);
        assert_eq!(warnings[0].field, "data[1]");
        assert_eq!(warnings[1].field, "now");
        assert_eq!(warnings[2].field, "one_month_ago");
        assert!(warnings[2].to_string().contains("430"));
    }

    #[test]
    fn deserialization_keeps_snapshot_invariants() {
        let snapshot = Snapshot::new(
            vec![reading(70), reading(65)],
            None,
            reading(40),
            history([41, 42, 43, 44]),
            UtcDateTime::parse("2024-01-01T12:30:00Z").expect("valid"),
        )
        .expect("valid snapshot");
        let value = serde_json::to_value(&snapshot).expect("serializes");

        let restored: Snapshot = serde_json::from_value(value.clone()).expect("round trip");
        assert_eq!(restored, snapshot);

        let mut empty = value.clone();
        empty["crypto_history"] = serde_json::json!([]);
        let err = serde_json::from_value::<Snapshot>(empty).expect_err("empty series");
        assert!(err.to_string().contains("at least one reading"));

        let mut mismatched = value;
        mismatched["crypto"]["value"] = serde_json::json!(10);
        let err = serde_json::from_value::<Snapshot>(mismatched).expect_err("headline mismatch");
        assert!(err.to_string().contains("first entry of the crypto series"));
    }
}
