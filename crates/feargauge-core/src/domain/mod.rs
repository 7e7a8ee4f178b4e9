//! # Domain Models
//!
//! Canonical sentiment types shared by both feeds.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SentimentReading`] | One fear/greed value with its upstream label and time |
//! | [`SentimentLabel`] | Canonical five-band classification of a value |
//! | [`HistoricalSeries`] | Stock readings at the four fixed lookback offsets |
//! | [`Snapshot`] | Merged, validated result of both feeds |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Upstream values are trusted: a value outside 0-100 is kept and reported
//! through [`Snapshot::range_warnings`], never rejected.

mod history;
mod reading;
mod snapshot;
mod timestamp;

pub use history::{HistoricalPoint, HistoricalSeries, HistoryOffset};
pub use reading::{SentimentLabel, SentimentReading, MAX_SENTIMENT, MIN_SENTIMENT};
pub use snapshot::{RangeWarning, Snapshot};
pub use timestamp::UtcDateTime;
