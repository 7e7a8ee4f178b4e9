//! Machine-readable response wrapper.
//!
//! Every CLI command answers with one [`Envelope`]: request metadata, the
//! command's data, and zero or more errors. A failed aggregation still yields
//! an envelope, with `null` data and the failure in `errors`.

use serde::{Deserialize, Serialize};

use crate::aggregator::AggregationError;
use crate::{FeedId, UtcDateTime, ValidationError};

const MIN_REQUEST_ID_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    /// Assembles a response after checking the metadata and every error entry.
    pub fn new(
        meta: EnvelopeMeta,
        data: T,
        errors: Vec<EnvelopeError>,
    ) -> Result<Self, ValidationError> {
        meta.validate()?;
        errors.iter().try_for_each(EnvelopeError::validate)?;
        Ok(Self { meta, data, errors })
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub schema_version: String,
    pub generated_at: UtcDateTime,
    /// Feeds the command consulted, in aggregation order.
    pub feeds: Vec<FeedId>,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(
        request_id: impl Into<String>,
        schema_version: impl Into<String>,
        feeds: Vec<FeedId>,
        latency_ms: u64,
    ) -> Result<Self, ValidationError> {
        let meta = Self {
            request_id: request_id.into(),
            schema_version: schema_version.into(),
            generated_at: UtcDateTime::now(),
            feeds,
            latency_ms,
            warnings: Vec::new(),
        };
        meta.validate()?;
        Ok(meta)
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_id.trim().len() < MIN_REQUEST_ID_LEN {
            Err(ValidationError::InvalidRequestId)
        } else if !is_version_tag(&self.schema_version) {
            Err(ValidationError::InvalidSchemaVersion {
                value: self.schema_version.clone(),
            })
        } else if self.feeds.is_empty() {
            Err(ValidationError::EmptyFeedList)
        } else {
            Ok(())
        }
    }
}

/// One failure as rendered to the user. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    pub retryable: bool,
    /// Side that failed; absent for failures not tied to one feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed: Option<FeedId>,
}

impl EnvelopeError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Result<Self, ValidationError> {
        let error = Self {
            code: code.into(),
            message: message.into(),
            retryable,
            feed: None,
        };
        error.validate()?;
        Ok(error)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            Err(ValidationError::EmptyErrorCode)
        } else if self.message.trim().is_empty() {
            Err(ValidationError::EmptyErrorMessage)
        } else {
            Ok(())
        }
    }
}

impl From<&AggregationError> for EnvelopeError {
    fn from(error: &AggregationError) -> Self {
        Self {
            code: error.code().to_owned(),
            message: error.to_string(),
            retryable: error.retryable(),
            feed: error.side(),
        }
    }
}

/// `vMAJOR.MINOR.PATCH` with numeric components.
fn is_version_tag(value: &str) -> bool {
    value.strip_prefix('v').is_some_and(|version| {
        let parts = version.split('.').collect::<Vec<_>>();
        parts.len() == 3
            && parts
                .iter()
                .all(|part| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FetchError;

    fn meta() -> EnvelopeMeta {
        EnvelopeMeta::new("request-12345", "v1.0.0", FeedId::ALL.to_vec(), 11)
            .expect("meta should be valid")
    }

    #[test]
    fn accepts_version_tags_only() {
        assert!(is_version_tag("v1.0.0"));
        assert!(is_version_tag("v12.3.40"));
        for bad in ["1.0.0", "v1.0", "v1.0.0.0", "v1..0", "v1.0.x", "v"] {
            assert!(!is_version_tag(bad), "{bad}");
        }
    }

    #[test]
    fn meta_rejects_short_request_id_and_empty_feeds() {
        assert_eq!(
            EnvelopeMeta::new("short", "v1.0.0", vec![FeedId::Crypto], 1),
            Err(ValidationError::InvalidRequestId)
        );
        assert_eq!(
            EnvelopeMeta::new("request-12345", "v1.0.0", Vec::new(), 1),
            Err(ValidationError::EmptyFeedList)
        );
        assert!(matches!(
            EnvelopeMeta::new("request-12345", "1.0", vec![FeedId::Crypto], 1),
            Err(ValidationError::InvalidSchemaVersion { .. })
        ));
    }

    #[test]
    fn envelope_rejects_blank_error_entries() {
        let blank = EnvelopeError {
            code: String::from("upstream.network_failure"),
            message: String::from("  "),
            retryable: true,
            feed: None,
        };

        let err = Envelope::new(meta(), serde_json::Value::Null, vec![blank]).expect_err("must fail");

        assert_eq!(err, ValidationError::EmptyErrorMessage);
        assert_eq!(
            EnvelopeError::new("", "message", false),
            Err(ValidationError::EmptyErrorCode)
        );
    }

    #[test]
    fn aggregation_errors_map_to_envelope_errors() {
        let error = AggregationError::upstream_unavailable(
            FeedId::Crypto,
            FetchError::network_failure(FeedId::Crypto, "crypto transport error: reset"),
        );

        let envelope_error = EnvelopeError::from(&error);
        let envelope = Envelope::new(meta(), serde_json::Value::Null, vec![envelope_error.clone()])
            .expect("valid envelope");

        assert_eq!(envelope_error.code, "upstream.network_failure");
        assert_eq!(envelope_error.feed, Some(FeedId::Crypto));
        assert!(envelope_error.retryable);
        assert!(!envelope.is_success());
    }

    #[test]
    fn cancelled_error_omits_feed_when_serialized() {
        let envelope_error = EnvelopeError::from(&AggregationError::cancelled());
        let value = serde_json::to_value(&envelope_error).expect("serializes");

        assert_eq!(value["code"], "aggregation.cancelled");
        assert_eq!(value["retryable"], false);
        assert!(value.get("feed").is_none());
    }
}
