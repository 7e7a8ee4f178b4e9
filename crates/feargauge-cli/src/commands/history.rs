use serde::Serialize;

use feargauge_core::{HistoricalPoint, MarketReport, SentimentReading, SnapshotAggregator};
use tokio_util::sync::CancellationToken;

use crate::cli::{FeedSelector, HistoryArgs};
use crate::error::CliError;

use super::{with_report, CommandResult};

#[derive(Debug, Serialize)]
struct HistoryResponseData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    crypto: Option<&'a [SentimentReading]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stock: Option<Vec<&'a HistoricalPoint>>,
}

pub async fn run(
    args: &HistoryArgs,
    aggregator: &SnapshotAggregator,
    token: &CancellationToken,
) -> Result<CommandResult, CliError> {
    let feed = args.feed;
    let limit = args.limit;

    with_report(aggregator, token, |report: &MarketReport| {
        let snapshot = &report.snapshot;
        let crypto = matches!(feed, FeedSelector::All | FeedSelector::Crypto).then(|| {
            let end = limit.map_or(snapshot.crypto_history.len(), |limit| {
                limit.min(snapshot.crypto_history.len())
            });
            &snapshot.crypto_history[..end]
        });
        let stock = matches!(feed, FeedSelector::All | FeedSelector::Stock)
            .then(|| snapshot.stock_history.iter().collect());

        serde_json::to_value(HistoryResponseData { crypto, stock })
    })
    .await
}
