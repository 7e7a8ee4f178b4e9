use serde::Serialize;

use feargauge_core::{DominantSide, MarketReport, OverallSentiment, SnapshotAggregator};
use tokio_util::sync::CancellationToken;

use crate::error::CliError;

use super::{with_report, CommandResult};

#[derive(Debug, Serialize)]
struct HeadlineData<'a> {
    value: i32,
    label: &'a str,
}

#[derive(Debug, Serialize)]
struct InsightsResponseData<'a> {
    crypto: HeadlineData<'a>,
    stock: HeadlineData<'a>,
    divergence: u32,
    dominant_side: DominantSide,
    dominant_side_text: &'static str,
    overall: OverallSentiment,
    overall_text: &'static str,
    average: f64,
}

pub async fn run(
    aggregator: &SnapshotAggregator,
    token: &CancellationToken,
) -> Result<CommandResult, CliError> {
    with_report(aggregator, token, |report: &MarketReport| {
        let insights = report.insights;
        serde_json::to_value(InsightsResponseData {
            crypto: HeadlineData {
                value: report.snapshot.crypto.value,
                label: &report.snapshot.crypto.label,
            },
            stock: HeadlineData {
                value: report.snapshot.stock.value,
                label: &report.snapshot.stock.label,
            },
            divergence: insights.divergence,
            dominant_side: insights.dominant_side,
            dominant_side_text: insights.dominant_side.describe(),
            overall: insights.overall,
            overall_text: insights.overall.describe(),
            average: insights.average,
        })
    })
    .await
}
