//! CLI argument definitions for feargauge.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `report` | Snapshot of both markets plus insights |
//! | `insights` | Divergence, dominant side and overall sentiment only |
//! | `history` | Crypto series and stock historical offsets |
//! | `feeds` | Configured feeds, endpoints and credential status |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings and errors as failures |
//! | `--timeout-ms` | `5000` | Per-feed request timeout in ms |
//! | `--crypto-limit` | `100` | Crypto readings requested |
//! | `--retries` | `0` | Retries for retryable feed errors |
//! | `--mock` | `false` | Serve canned payloads, no network |
//! | `--env-file` | none | Load variables from a dotenv file |
//! | `--verbose` | `false` | Debug-level logs on stderr |
//!
//! # Examples
//!
//! ```bash
//! feargauge report --pretty
//! feargauge insights --format table
//! RAPIDAPI_KEY=... feargauge history --feed stock
//! feargauge report --mock --strict
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Crypto and stock fear & greed, side by side.
#[derive(Debug, Parser)]
#[command(
    name = "feargauge",
    author,
    version,
    about = "Crypto and stock fear & greed snapshot CLI",
    long_about = "feargauge fetches the crypto fear & greed index (alternative.me) and the \
stock fear & greed index (RapidAPI) concurrently, and reports both readings with \
their divergence and overall sentiment.\n\
\n\
The stock feed needs a RapidAPI key: set FEARGAUGE_RAPIDAPI_KEY or RAPIDAPI_KEY."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Per-feed request timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// Number of crypto readings to request.
    #[arg(long, global = true, default_value_t = 100)]
    pub crypto_limit: u32,

    /// Retries for retryable feed errors (0 disables retrying).
    #[arg(long, global = true, default_value_t = 0)]
    pub retries: u32,

    /// Serve canned payloads instead of calling the providers.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Load environment variables from this dotenv file before reading credentials.
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Emit debug-level logs on stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Table,
    /// Single JSON object output.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch both feeds and report readings, history and insights.
    ///
    /// # Examples
    ///
    ///   feargauge report
    ///   feargauge report --pretty --retries 2
    Report,

    /// Fetch both feeds and report only the comparative insights.
    Insights,

    /// Fetch both feeds and report their historical readings.
    ///
    /// # Examples
    ///
    ///   feargauge history --feed crypto --limit 7
    History(HistoryArgs),

    /// List configured feeds without calling them.
    Feeds,
}

/// Which feeds `history` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedSelector {
    All,
    Crypto,
    Stock,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Restrict output to one feed.
    #[arg(long, value_enum, default_value_t = FeedSelector::All)]
    pub feed: FeedSelector,

    /// Maximum number of crypto readings to show, most recent first.
    #[arg(long)]
    pub limit: Option<usize>,
}
