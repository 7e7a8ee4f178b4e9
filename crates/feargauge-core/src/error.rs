use thiserror::Error;

/// Validation and contract errors exposed by `feargauge-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid feed '{value}', expected one of crypto, stock")]
    InvalidFeed { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("unix timestamp {value} is out of range")]
    TimestampOutOfRange { value: i64 },

    #[error("crypto series must contain at least one reading")]
    EmptyCryptoSeries,
    #[error("crypto headline reading must be the first entry of the crypto series")]
    CryptoHeadlineMismatch,
    #[error("historical series must contain exactly {expected} readings, got {actual}")]
    IncompleteHistory { expected: usize, actual: usize },
    #[error("historical series is missing offset '{offset}'")]
    MissingHistoryOffset { offset: &'static str },

    #[error("crypto limit must be greater than zero")]
    InvalidCryptoLimit,
    #[error("timeout must be greater than zero milliseconds")]
    InvalidTimeout,
    #[error("endpoint '{value}' must be an http(s) URL")]
    InvalidEndpoint { value: String },
    #[error("missing credential: set {primary} or {fallback}")]
    MissingCredential {
        primary: &'static str,
        fallback: &'static str,
    },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("feeds must contain at least one feed")]
    EmptyFeedList,

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}
