use feargauge_core::{MarketReport, SnapshotAggregator};
use tokio_util::sync::CancellationToken;

use crate::error::CliError;

use super::{with_report, CommandResult};

pub async fn run(
    aggregator: &SnapshotAggregator,
    token: &CancellationToken,
) -> Result<CommandResult, CliError> {
    with_report(aggregator, token, |report: &MarketReport| serde_json::to_value(report)).await
}
