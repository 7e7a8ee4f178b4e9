//! Comparative analytics derived from a [`Snapshot`].
//!
//! Everything here is pure: no I/O, no state, deterministic for a given
//! snapshot.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Snapshot;

/// Market whose sentiment value is currently higher. Ties go to `Stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DominantSide {
    Crypto,
    Stock,
}

impl DominantSide {
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Crypto => "Crypto showing more optimism",
            Self::Stock => "Traditional markets showing more optimism",
        }
    }
}

impl Display for DominantSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Crypto => "crypto",
            Self::Stock => "stock",
        })
    }
}

/// Overall classification of the two-market average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallSentiment {
    Fearful,
    Greedy,
}

impl OverallSentiment {
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Fearful => "Generally Fearful",
            Self::Greedy => "Generally Greedy",
        }
    }
}

impl Display for OverallSentiment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Fearful => "fearful",
            Self::Greedy => "greedy",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    /// `|crypto - stock|`.
    pub divergence: u32,
    pub dominant_side: DominantSide,
    pub overall: OverallSentiment,
    /// Mean of the two headline values.
    pub average: f64,
}

/// Derives insights from the headline crypto and stock readings.
///
/// An average of exactly 50 is `Fearful`.
pub fn derive_insights(snapshot: &Snapshot) -> Insights {
    compare(snapshot.crypto.value, snapshot.stock.value)
}

pub(crate) fn compare(crypto: i32, stock: i32) -> Insights {
    let crypto = i64::from(crypto);
    let stock = i64::from(stock);
    let sum = crypto + stock;

    // Two i32 values differ by at most u32::MAX.
    let divergence = u32::try_from((crypto - stock).unsigned_abs()).unwrap_or(u32::MAX);

    let dominant_side = if crypto > stock {
        DominantSide::Crypto
    } else {
        DominantSide::Stock
    };

    // sum / 2 > 50 without truncating half points.
    let overall = if sum > 100 {
        OverallSentiment::Greedy
    } else {
        OverallSentiment::Fearful
    };

    Insights {
        divergence,
        dominant_side,
        overall,
        average: sum as f64 / 2.0,
    }
}

/// Snapshot and its insights, the single outbound result of an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketReport {
    pub snapshot: Snapshot,
    pub insights: Insights,
}

impl MarketReport {
    pub fn new(snapshot: Snapshot) -> Self {
        let insights = derive_insights(&snapshot);
        Self { snapshot, insights }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypto_greed_over_stock_fear() {
        let insights = compare(70, 40);

        assert_eq!(insights.divergence, 30);
        assert_eq!(insights.dominant_side, DominantSide::Crypto);
        assert_eq!(insights.average, 55.0);
        assert_eq!(insights.overall, OverallSentiment::Greedy);
    }

    #[test]
    fn equal_values_tie_to_stock_and_classify_fearful() {
        let insights = compare(50, 50);

        assert_eq!(insights.divergence, 0);
        assert_eq!(insights.dominant_side, DominantSide::Stock);
        assert_eq!(insights.average, 50.0);
        assert_eq!(insights.overall, OverallSentiment::Fearful);
    }

    #[test]
    fn half_point_above_fifty_is_greedy() {
        assert_eq!(compare(51, 50).overall, OverallSentiment::Greedy);
        assert_eq!(compare(50, 51).overall, OverallSentiment::Greedy);
        assert_eq!(compare(49, 51).overall, OverallSentiment::Fearful);
    }

    #[test]
    fn divergence_is_symmetric() {
        assert_eq!(compare(10, 90).divergence, compare(90, 10).divergence);
        assert_eq!(compare(10, 90).dominant_side, DominantSide::Stock);
    }

    #[test]
    fn extreme_out_of_range_values_do_not_overflow() {
        let insights = compare(i32::MIN, i32::MAX);
        assert_eq!(insights.divergence, u32::MAX);
        assert_eq!(insights.dominant_side, DominantSide::Stock);
    }

    #[test]
    fn descriptions_match_presentation_copy() {
        assert_eq!(DominantSide::Crypto.describe(), "Crypto showing more optimism");
        assert_eq!(OverallSentiment::Fearful.describe(), "Generally Fearful");
    }
}
