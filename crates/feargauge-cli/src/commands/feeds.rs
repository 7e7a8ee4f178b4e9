use serde::Serialize;

use feargauge_core::{FeedConfig, FeedId};

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum CredentialStatus {
    NotRequired,
    Configured,
    Missing,
}

#[derive(Debug, Serialize)]
struct FeedRow {
    feed: FeedId,
    provider: &'static str,
    endpoint: String,
    timeout_ms: u64,
    credentials: CredentialStatus,
}

#[derive(Debug, Serialize)]
struct FeedsResponseData {
    feeds: Vec<FeedRow>,
    retries: u32,
    cache_ttl_ms: Option<u64>,
}

pub fn run(config: &FeedConfig) -> Result<CommandResult, CliError> {
    let stock_credentials = if config.credentials().is_some() {
        CredentialStatus::Configured
    } else {
        CredentialStatus::Missing
    };

    let mut warnings = Vec::new();
    if let Err(error) = config.stock_upstream() {
        warnings.push(format!("stock feed is not usable: {error}"));
    }

    let data = FeedsResponseData {
        feeds: vec![
            FeedRow {
                feed: FeedId::Crypto,
                provider: FeedId::Crypto.provider(),
                endpoint: config.crypto_url(),
                timeout_ms: config.timeout_ms(),
                credentials: CredentialStatus::NotRequired,
            },
            FeedRow {
                feed: FeedId::Stock,
                provider: FeedId::Stock.provider(),
                endpoint: config.stock_endpoint().to_owned(),
                timeout_ms: config.timeout_ms(),
                credentials: stock_credentials,
            },
        ],
        retries: config.retry().map_or(0, |retry| retry.max_retries),
        cache_ttl_ms: config
            .cache_ttl()
            .map(|ttl| u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)),
    };

    Ok(CommandResult::ok(serde_json::to_value(data)?, FeedId::ALL.to_vec()).with_warnings(warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_missing_stock_credentials_as_warning() {
        let config = FeedConfig::builder().build().expect("defaults are valid");

        let result = run(&config).expect("feeds listing");

        assert_eq!(result.data["feeds"][1]["credentials"], "missing");
        assert_eq!(result.data["feeds"][0]["credentials"], "not_required");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("RAPIDAPI_KEY"));
    }

    #[test]
    fn never_prints_the_key() {
        let config = FeedConfig::builder()
            .with_rapidapi_key("very-secret-key")
            .build()
            .expect("valid");

        let result = run(&config).expect("feeds listing");

        assert!(result.warnings.is_empty());
        assert!(!result.data.to_string().contains("very-secret-key"));
    }
}
