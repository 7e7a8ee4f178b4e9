mod feeds;
mod history;
mod insights;
mod mock;
mod report;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use feargauge_core::{
    Envelope, EnvelopeError, FeedConfig, FeedId, HttpClient, MarketReport, ReqwestHttpClient,
    RetryConfig, SnapshotAggregator,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub feeds: Vec<FeedId>,
}

impl CommandResult {
    pub fn ok(data: Value, feeds: Vec<FeedId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            feeds,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

pub async fn run(cli: &Cli, token: &CancellationToken) -> Result<Envelope<Value>, CliError> {
    let file_vars = match &cli.env_file {
        Some(path) => read_env_file(path)?,
        None => HashMap::new(),
    };
    let config = build_config(cli, |name| {
        std::env::var(name)
            .ok()
            .or_else(|| file_vars.get(name).cloned())
    })?;

    let command_result = match &cli.command {
        Command::Feeds => feeds::run(&config)?,
        Command::Report => report::run(&aggregator(cli, &config)?, token).await?,
        Command::Insights => insights::run(&aggregator(cli, &config)?, token).await?,
        Command::History(args) => history::run(args, &aggregator(cli, &config)?, token).await?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        feeds,
    } = command_result;

    let mut metadata = Metadata::new(feeds, latency_ms)?;
    if cli.mock {
        metadata.push_warning("--mock served canned payloads; no provider was called");
    }
    for warning in warnings {
        metadata.push_warning(warning);
    }

    let meta = metadata.into_envelope_meta()?;
    Envelope::new(meta, data, errors).map_err(CliError::from)
}

/// Reads `KEY=value` pairs from a dotenv file without touching the process environment.
pub(crate) fn read_env_file(path: &Path) -> Result<HashMap<String, String>, CliError> {
    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path)? {
        let (name, value) = item?;
        vars.insert(name, value);
    }
    debug!(path = %path.display(), count = vars.len(), "loaded env file");
    Ok(vars)
}

pub(crate) fn build_config<F>(cli: &Cli, lookup: F) -> Result<FeedConfig, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = FeedConfig::builder()
        .with_timeout_ms(cli.timeout_ms)
        .with_crypto_limit(cli.crypto_limit);

    if cli.retries > 0 {
        builder = builder.with_retry(RetryConfig::exponential(cli.retries));
    }

    builder = if cli.mock {
        builder.with_rapidapi_key(mock::MOCK_RAPIDAPI_KEY)
    } else {
        builder.with_lookup(lookup)
    };

    Ok(builder.build()?)
}

fn aggregator(cli: &Cli, config: &FeedConfig) -> Result<SnapshotAggregator, CliError> {
    let http_client: Arc<dyn HttpClient> = if cli.mock {
        Arc::new(mock::http_client(config))
    } else {
        Arc::new(ReqwestHttpClient::new())
    };
    Ok(SnapshotAggregator::from_config(config, http_client)?)
}

/// Runs one aggregation and shapes the report with `render`.
///
/// Aggregation failures become envelope errors with `null` data rather than
/// CLI errors, so callers still receive a well-formed envelope.
async fn with_report<F>(
    aggregator: &SnapshotAggregator,
    token: &CancellationToken,
    render: F,
) -> Result<CommandResult, CliError>
where
    F: FnOnce(&MarketReport) -> Result<Value, serde_json::Error>,
{
    let started = Instant::now();
    let outcome = aggregator.report_until(token).await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(report) => {
            let warnings = report
                .snapshot
                .range_warnings()
                .iter()
                .map(ToString::to_string)
                .collect();
            let data = render(&report)?;
            Ok(CommandResult::ok(data, FeedId::ALL.to_vec())
                .with_warnings(warnings)
                .with_latency(latency_ms))
        }
        Err(error) => Ok(CommandResult::ok(Value::Null, FeedId::ALL.to_vec())
            .with_errors(vec![EnvelopeError::from(&error)])
            .with_latency(latency_ms)),
    }
}
