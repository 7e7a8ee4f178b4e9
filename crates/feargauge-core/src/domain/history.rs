use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{SentimentReading, ValidationError};

/// Fixed lookback points published by the stock feed, most recent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOffset {
    PreviousClose,
    OneWeekAgo,
    OneMonthAgo,
    OneYearAgo,
}

impl HistoryOffset {
    pub const ALL: [Self; 4] = [
        Self::PreviousClose,
        Self::OneWeekAgo,
        Self::OneMonthAgo,
        Self::OneYearAgo,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreviousClose => "previous_close",
            Self::OneWeekAgo => "one_week_ago",
            Self::OneMonthAgo => "one_month_ago",
            Self::OneYearAgo => "one_year_ago",
        }
    }

    /// Nominal distance from the current reading.
    pub const fn lookback_days(self) -> i64 {
        match self {
            Self::PreviousClose => 1,
            Self::OneWeekAgo => 7,
            Self::OneMonthAgo => 30,
            Self::OneYearAgo => 365,
        }
    }
}

impl Display for HistoryOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reading tagged with the offset it was published under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub offset: HistoryOffset,
    pub reading: SentimentReading,
}

/// Stock history keyed by [`HistoryOffset`], always complete and ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<HistoricalPoint>")]
pub struct HistoricalSeries(Vec<HistoricalPoint>);

impl TryFrom<Vec<HistoricalPoint>> for HistoricalSeries {
    type Error = ValidationError;

    fn try_from(points: Vec<HistoricalPoint>) -> Result<Self, Self::Error> {
        Self::new(
            points
                .into_iter()
                .map(|point| (point.offset, point.reading))
                .collect(),
        )
    }
}

impl HistoricalSeries {
    /// Builds the series from unordered points.
    ///
    /// Every offset must appear exactly once; the result is sorted most recent first.
    pub fn new(points: Vec<(HistoryOffset, SentimentReading)>) -> Result<Self, ValidationError> {
        if points.len() != HistoryOffset::ALL.len() {
            return Err(ValidationError::IncompleteHistory {
                expected: HistoryOffset::ALL.len(),
                actual: points.len(),
            });
        }

        let mut ordered = points
            .into_iter()
            .map(|(offset, reading)| HistoricalPoint { offset, reading })
            .collect::<Vec<_>>();
        ordered.sort_by_key(|point| point.offset);

        for (point, expected) in ordered.iter().zip(HistoryOffset::ALL) {
            if point.offset != expected {
                return Err(ValidationError::MissingHistoryOffset {
                    offset: expected.as_str(),
                });
            }
        }

        Ok(Self(ordered))
    }

    pub fn get(&self, offset: HistoryOffset) -> &SentimentReading {
        // Completeness is checked in `new`, so the index is the offset position.
        &self.0[offset as usize].reading
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoricalPoint> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
