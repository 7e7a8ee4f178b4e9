//! Canned provider payloads for `--mock`.

use feargauge_core::{FeedConfig, StaticHttpClient, StaticRoute};

pub const MOCK_RAPIDAPI_KEY: &str = "mock-rapidapi-key";

const CRYPTO_PAYLOAD: &str = r#"{
  "name": "Fear and Greed Index",
  "data": [
    { "value": "72", "value_classification": "Greed", "timestamp": "1704067200", "time_until_update": "43200" },
    { "value": "65", "value_classification": "Greed", "timestamp": "1703980800" },
    { "value": "51", "value_classification": "Neutral", "timestamp": "1703894400" },
    { "value": "38", "value_classification": "Fear", "timestamp": "1703808000" },
    { "value": "22", "value_classification": "Extreme Fear", "timestamp": "1703721600" }
  ],
  "metadata": { "error": null }
}"#;

const STOCK_PAYLOAD: &str = r#"{
  "lastUpdated": { "epochUnixSeconds": 1704067200, "humanDate": "2024-01-01T00:00:00.000Z" },
  "fgi": {
    "now": { "value": 44, "valueText": "Fear" },
    "previousClose": { "value": 47, "valueText": "Neutral" },
    "oneWeekAgo": { "value": 58, "valueText": "Greed" },
    "oneMonthAgo": { "value": 63, "valueText": "Greed" },
    "oneYearAgo": { "value": 29, "valueText": "Fear" }
  }
}"#;

/// Transport answering the configured crypto and stock URLs with fixed payloads.
pub fn http_client(config: &FeedConfig) -> StaticHttpClient {
    StaticHttpClient::new()
        .with_route(config.crypto_url(), StaticRoute::json(CRYPTO_PAYLOAD))
        .with_route(config.stock_endpoint(), StaticRoute::json(STOCK_PAYLOAD))
}
