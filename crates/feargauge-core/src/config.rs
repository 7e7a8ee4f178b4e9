//! Feed configuration: endpoints, credentials, timeout and optional decorators.
//!
//! Credentials are resolved by [`FeedConfigBuilder::with_env`] from
//! `FEARGAUGE_RAPIDAPI_KEY` (falling back to `RAPIDAPI_KEY`) and
//! `FEARGAUGE_RAPIDAPI_HOST` (falling back to `RAPIDAPI_HOST`). A missing key
//! is only reported when the stock upstream is actually built, so the crypto
//! feed stays usable without one.

use std::env;
use std::fmt::Formatter;
use std::time::Duration;

use crate::adapters::stock::DEFAULT_RAPIDAPI_HOST;
use crate::retry::RetryConfig;
use crate::upstream::UpstreamConfig;
use crate::{FeedId, ValidationError};

pub const DEFAULT_CRYPTO_ENDPOINT: &str = "https://api.alternative.me/fng/";
pub const DEFAULT_CRYPTO_LIMIT: u32 = 100;
pub const DEFAULT_STOCK_ENDPOINT: &str = "https://fear-and-greed-index.p.rapidapi.com/v1/fgi";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

pub const RAPIDAPI_KEY_ENV: &str = "FEARGAUGE_RAPIDAPI_KEY";
pub const RAPIDAPI_KEY_ENV_FALLBACK: &str = "RAPIDAPI_KEY";
pub const RAPIDAPI_HOST_ENV: &str = "FEARGAUGE_RAPIDAPI_HOST";
pub const RAPIDAPI_HOST_ENV_FALLBACK: &str = "RAPIDAPI_HOST";

/// RapidAPI credentials for the stock feed. `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct RapidApiCredentials {
    host: String,
    key: String,
}

impl RapidApiCredentials {
    pub fn new(host: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            key: key.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Debug for RapidApiCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RapidApiCredentials")
            .field("host", &self.host)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Validated configuration for both feeds.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    crypto_endpoint: String,
    crypto_limit: u32,
    stock_endpoint: String,
    credentials: Option<RapidApiCredentials>,
    timeout_ms: u64,
    cache_ttl: Option<Duration>,
    retry: Option<RetryConfig>,
}

impl FeedConfig {
    pub fn builder() -> FeedConfigBuilder {
        FeedConfigBuilder::new()
    }

    /// Crypto request URL including the `limit` query parameter.
    pub fn crypto_url(&self) -> String {
        let separator = if self.crypto_endpoint.contains('?') {
            '&'
        } else {
            '?'
        };
        format!("{}{separator}limit={}", self.crypto_endpoint, self.crypto_limit)
    }

    pub fn stock_endpoint(&self) -> &str {
        &self.stock_endpoint
    }

    pub fn crypto_limit(&self) -> u32 {
        self.crypto_limit
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn credentials(&self) -> Option<&RapidApiCredentials> {
        self.credentials.as_ref()
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl
    }

    pub fn retry(&self) -> Option<&RetryConfig> {
        self.retry.as_ref()
    }

    pub fn crypto_upstream(&self) -> UpstreamConfig {
        UpstreamConfig::new(FeedId::Crypto, self.crypto_url(), self.timeout_ms)
    }

    /// Stock upstream with RapidAPI headers attached.
    pub fn stock_upstream(&self) -> Result<UpstreamConfig, ValidationError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(ValidationError::MissingCredential {
                primary: RAPIDAPI_KEY_ENV,
                fallback: RAPIDAPI_KEY_ENV_FALLBACK,
            })?;

        Ok(
            UpstreamConfig::new(FeedId::Stock, self.stock_endpoint.clone(), self.timeout_ms)
                .with_header("X-RapidAPI-Host", credentials.host())
                .with_header("X-RapidAPI-Key", credentials.key()),
        )
    }
}

#[derive(Debug, Clone)]
pub struct FeedConfigBuilder {
    crypto_endpoint: String,
    crypto_limit: u32,
    stock_endpoint: String,
    rapidapi_host: Option<String>,
    rapidapi_key: Option<String>,
    timeout_ms: u64,
    cache_ttl: Option<Duration>,
    retry: Option<RetryConfig>,
}

impl Default for FeedConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedConfigBuilder {
    pub fn new() -> Self {
        Self {
            crypto_endpoint: DEFAULT_CRYPTO_ENDPOINT.to_owned(),
            crypto_limit: DEFAULT_CRYPTO_LIMIT,
            stock_endpoint: DEFAULT_STOCK_ENDPOINT.to_owned(),
            rapidapi_host: None,
            rapidapi_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            cache_ttl: None,
            retry: None,
        }
    }

    /// Reads credentials through `lookup`, primary names first.
    ///
    /// Blank values count as unset. Values already set on the builder win.
    pub fn with_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |primary: &str, fallback: &str| {
            lookup(primary)
                .filter(|value| !value.trim().is_empty())
                .or_else(|| lookup(fallback).filter(|value| !value.trim().is_empty()))
                .map(|value| value.trim().to_owned())
        };

        if self.rapidapi_key.is_none() {
            self.rapidapi_key = read(RAPIDAPI_KEY_ENV, RAPIDAPI_KEY_ENV_FALLBACK);
        }
        if self.rapidapi_host.is_none() {
            self.rapidapi_host = read(RAPIDAPI_HOST_ENV, RAPIDAPI_HOST_ENV_FALLBACK);
        }
        self
    }

    /// Reads credentials from the process environment.
    pub fn with_env(self) -> Self {
        self.with_lookup(|name| env::var(name).ok())
    }

    pub fn with_rapidapi_key(mut self, key: impl Into<String>) -> Self {
        self.rapidapi_key = Some(key.into());
        self
    }

    pub fn with_rapidapi_host(mut self, host: impl Into<String>) -> Self {
        self.rapidapi_host = Some(host.into());
        self
    }

    pub fn with_crypto_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.crypto_endpoint = endpoint.into();
        self
    }

    pub fn with_crypto_limit(mut self, limit: u32) -> Self {
        self.crypto_limit = limit;
        self
    }

    pub fn with_stock_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.stock_endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Enables payload caching for the given TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Enables retries for retryable fetch errors.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn build(self) -> Result<FeedConfig, ValidationError> {
        if self.crypto_limit == 0 {
            return Err(ValidationError::InvalidCryptoLimit);
        }
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        validate_endpoint(&self.crypto_endpoint)?;
        validate_endpoint(&self.stock_endpoint)?;

        let credentials = self.rapidapi_key.map(|key| {
            let host = self
                .rapidapi_host
                .unwrap_or_else(|| DEFAULT_RAPIDAPI_HOST.to_owned());
            RapidApiCredentials::new(host, key)
        });

        Ok(FeedConfig {
            crypto_endpoint: self.crypto_endpoint,
            crypto_limit: self.crypto_limit,
            stock_endpoint: self.stock_endpoint,
            credentials,
            timeout_ms: self.timeout_ms,
            cache_ttl: self.cache_ttl.filter(|ttl| !ttl.is_zero()),
            retry: self.retry,
        })
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), ValidationError> {
    let trimmed = endpoint.trim();
    let valid = ["https://", "http://"]
        .iter()
        .any(|scheme| trimmed.len() > scheme.len() && trimmed.starts_with(scheme));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidEndpoint {
            value: endpoint.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_point_at_public_providers() {
        let config = FeedConfig::builder().build().expect("defaults are valid");

        assert_eq!(config.crypto_url(), "https://api.alternative.me/fng/?limit=100");
        assert_eq!(config.stock_endpoint(), DEFAULT_STOCK_ENDPOINT);
        assert_eq!(config.timeout_ms(), 5_000);
        assert!(config.cache_ttl().is_none());
        assert!(config.retry().is_none());
    }

    #[test]
    fn primary_names_win_over_fallbacks() {
        let config = FeedConfig::builder()
            .with_lookup(lookup(&[
                ("FEARGAUGE_RAPIDAPI_KEY", "primary-key"),
                ("RAPIDAPI_KEY", "fallback-key"),
                ("RAPIDAPI_HOST", "custom.host"),
            ]))
            .build()
            .expect("valid");

        let credentials = config.credentials().expect("credentials resolved");
        assert_eq!(credentials.key(), "primary-key");
        assert_eq!(credentials.host(), "custom.host");
    }

    #[test]
    fn blank_values_fall_through_to_fallback() {
        let config = FeedConfig::builder()
            .with_lookup(lookup(&[
                ("FEARGAUGE_RAPIDAPI_KEY", "  "),
                ("RAPIDAPI_KEY", "fallback-key"),
            ]))
            .build()
            .expect("valid");

        let credentials = config.credentials().expect("credentials resolved");
        assert_eq!(credentials.key(), "fallback-key");
        assert_eq!(credentials.host(), DEFAULT_RAPIDAPI_HOST);
    }

    #[test]
    fn stock_upstream_requires_a_key() {
        let config = FeedConfig::builder()
            .with_lookup(lookup(&[]))
            .build()
            .expect("valid");

        assert_eq!(
            config.stock_upstream(),
            Err(ValidationError::MissingCredential {
                primary: RAPIDAPI_KEY_ENV,
                fallback: RAPIDAPI_KEY_ENV_FALLBACK,
            })
        );
    }

    #[test]
    fn stock_upstream_carries_rapidapi_headers() {
        let config = FeedConfig::builder()
            .with_rapidapi_key("key-123")
            .build()
            .expect("valid");

        let upstream = config.stock_upstream().expect("credentials present");
        assert_eq!(
            upstream.headers.get("X-RapidAPI-Host").map(String::as_str),
            Some(DEFAULT_RAPIDAPI_HOST)
        );
        assert_eq!(
            upstream.headers.get("X-RapidAPI-Key").map(String::as_str),
            Some("key-123")
        );
    }

    #[test]
    fn rejects_invalid_settings() {
        assert_eq!(
            FeedConfig::builder().with_crypto_limit(0).build(),
            Err(ValidationError::InvalidCryptoLimit)
        );
        assert_eq!(
            FeedConfig::builder().with_timeout_ms(0).build(),
            Err(ValidationError::InvalidTimeout)
        );
        assert!(matches!(
            FeedConfig::builder().with_stock_endpoint("ftp://x").build(),
            Err(ValidationError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn crypto_url_appends_to_existing_query() {
        let config = FeedConfig::builder()
            .with_crypto_endpoint("http://localhost:9000/fng/?format=json")
            .with_crypto_limit(10)
            .build()
            .expect("valid");

        assert_eq!(config.crypto_url(), "http://localhost:9000/fng/?format=json&limit=10");
    }

    #[test]
    fn debug_redacts_key() {
        let credentials = RapidApiCredentials::new("h", "super-secret");
        assert!(!format!("{credentials:?}").contains("super-secret"));
    }
}
