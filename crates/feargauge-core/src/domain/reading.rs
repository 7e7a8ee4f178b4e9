use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::UtcDateTime;

/// Lower bound of the sentiment scale.
pub const MIN_SENTIMENT: i32 = 0;
/// Upper bound of the sentiment scale.
pub const MAX_SENTIMENT: i32 = 100;

/// Canonical classification band of a 0-100 sentiment value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl SentimentLabel {
    pub const ALL: [Self; 5] = [
        Self::ExtremeFear,
        Self::Fear,
        Self::Neutral,
        Self::Greed,
        Self::ExtremeGreed,
    ];

    /// Bands a value with the fixed table 0-25, 26-45, 46-55, 56-75, 76-100.
    ///
    /// Values outside the scale clamp to the nearest extreme band.
    pub const fn from_value(value: i32) -> Self {
        match value {
            i32::MIN..=25 => Self::ExtremeFear,
            26..=45 => Self::Fear,
            46..=55 => Self::Neutral,
            56..=75 => Self::Greed,
            _ => Self::ExtremeGreed,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExtremeFear => "Extreme Fear",
            Self::Fear => "Fear",
            Self::Neutral => "Neutral",
            Self::Greed => "Greed",
            Self::ExtremeGreed => "Extreme Greed",
        }
    }

    /// Matches an upstream label against the band names, ignoring case and spacing.
    pub fn matches(self, label: &str) -> bool {
        let normalized: String = label
            .chars()
            .filter(|ch| !ch.is_whitespace() && *ch != '_' && *ch != '-')
            .collect();
        let expected: String = self.as_str().chars().filter(|ch| !ch.is_whitespace()).collect();
        normalized.eq_ignore_ascii_case(&expected)
    }
}

impl Display for SentimentLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized fear/greed observation from either feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentReading {
    pub value: i32,
    /// Upstream classification, kept verbatim.
    pub label: String,
    pub observed_at: UtcDateTime,
}

impl SentimentReading {
    pub fn new(value: i32, label: impl Into<String>, observed_at: UtcDateTime) -> Self {
        Self {
            value,
            label: label.into(),
            observed_at,
        }
    }

    pub const fn in_range(&self) -> bool {
        self.value >= MIN_SENTIMENT && self.value <= MAX_SENTIMENT
    }

    pub const fn canonical_label(&self) -> SentimentLabel {
        SentimentLabel::from_value(self.value)
    }

    pub fn label_matches_band(&self) -> bool {
        self.canonical_label().matches(&self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(value: i32, label: &str) -> SentimentReading {
        SentimentReading::new(
            value,
            label,
            UtcDateTime::parse("2024-01-01T00:00:00Z").expect("valid"),
        )
    }

    #[test]
    fn banding_table_boundaries() {
        let cases = [
            (0, SentimentLabel::ExtremeFear),
            (25, SentimentLabel::ExtremeFear),
            (26, SentimentLabel::Fear),
            (45, SentimentLabel::Fear),
            (46, SentimentLabel::Neutral),
            (55, SentimentLabel::Neutral),
            (56, SentimentLabel::Greed),
            (75, SentimentLabel::Greed),
            (76, SentimentLabel::ExtremeGreed),
            (100, SentimentLabel::ExtremeGreed),
        ];

        for (value, expected) in cases {
            assert_eq!(SentimentLabel::from_value(value), expected, "value={value}");
        }
    }

    #[test]
    fn out_of_scale_values_clamp_to_extremes() {
        assert_eq!(SentimentLabel::from_value(-3), SentimentLabel::ExtremeFear);
        assert_eq!(SentimentLabel::from_value(140), SentimentLabel::ExtremeGreed);
    }

    #[test]
    fn range_check_is_inclusive() {
        assert!(reading(0, "Extreme Fear").in_range());
        assert!(reading(100, "Extreme Greed").in_range());
        assert!(!reading(-1, "Extreme Fear").in_range());
        assert!(!reading(101, "Extreme Greed").in_range());
    }

    #[test]
    fn upstream_label_comparison_ignores_case_and_separators() {
        assert!(reading(80, "extreme greed").label_matches_band());
        assert!(reading(80, "EXTREME_GREED").label_matches_band());
        assert!(reading(30, "Fear").label_matches_band());
        assert!(!reading(30, "Greed").label_matches_band());
    }
}
