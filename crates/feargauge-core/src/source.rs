use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical upstream feed identifiers used in errors, metadata and envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedId {
    Crypto,
    Stock,
}

impl FeedId {
    pub const ALL: [Self; 2] = [Self::Crypto, Self::Stock];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::Stock => "stock",
        }
    }

    /// Human-readable provider name for diagnostics.
    pub const fn provider(self) -> &'static str {
        match self {
            Self::Crypto => "alternative.me",
            Self::Stock => "rapidapi fear-and-greed-index",
        }
    }
}

impl Display for FeedId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "crypto" => Ok(Self::Crypto),
            "stock" => Ok(Self::Stock),
            other => Err(ValidationError::InvalidFeed {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_feed_ids_case_insensitively() {
        assert_eq!(" Crypto ".parse::<FeedId>(), Ok(FeedId::Crypto));
        assert_eq!("STOCK".parse::<FeedId>(), Ok(FeedId::Stock));
    }

    #[test]
    fn rejects_unknown_feed() {
        let err = "forex".parse::<FeedId>().expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidFeed { .. }));
    }
}
