use std::fmt::{Display, Formatter};

use feargauge_core::{EnvelopeMeta, FeedId, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "v1.0.0";

/// Request identifier (UUID v4) for end-to-end request tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Command metadata used to construct envelope metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub request_id: RequestId,
    pub feeds: Vec<FeedId>,
    pub latency_ms: u64,
    pub warnings: Vec<String>,
}

impl Metadata {
    pub fn new(feeds: Vec<FeedId>, latency_ms: u64) -> Result<Self, ValidationError> {
        if feeds.is_empty() {
            return Err(ValidationError::EmptyFeedList);
        }

        Ok(Self {
            request_id: RequestId::new_v4(),
            feeds,
            latency_ms,
            warnings: Vec::new(),
        })
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn into_envelope_meta(self) -> Result<EnvelopeMeta, ValidationError> {
        let mut envelope_meta = EnvelopeMeta::new(
            self.request_id.to_string(),
            SCHEMA_VERSION,
            self.feeds,
            self.latency_ms,
        )?;

        for warning in self.warnings {
            envelope_meta.push_warning(warning);
        }

        Ok(envelope_meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_is_uuid_v4() {
        let request_id = RequestId::new_v4();
        assert_eq!(request_id.0.get_version_num(), 4);
    }

    #[test]
    fn metadata_carries_warnings_into_envelope() {
        let mut metadata = Metadata::new(FeedId::ALL.to_vec(), 42).expect("feeds present");
        metadata.push_warning("stock feed reported now=140 outside the 0-100 scale");

        let meta = metadata.into_envelope_meta().expect("valid meta");

        assert_eq!(meta.schema_version, SCHEMA_VERSION);
        assert_eq!(meta.latency_ms, 42);
        assert_eq!(meta.warnings.len(), 1);
        assert_eq!(meta.request_id.len(), 36);
    }

    #[test]
    fn rejects_empty_feed_list() {
        assert_eq!(
            Metadata::new(Vec::new(), 0),
            Err(ValidationError::EmptyFeedList)
        );
    }
}
