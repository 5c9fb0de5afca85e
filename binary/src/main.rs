//! Command-line front end of `merge_miner`
//!
//! - `discover`: bounded DFG of a single event log
//! - `compare`: comparison DFG of two or more event logs
//!
//! Logs may be gzipped (`.csv.gz`). Without `--output` the DFG is printed to stdout as JSON.
//! Set `RUST_LOG` (e.g. `RUST_LOG=debug`) to control log output.

use std::{
    error::Error,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use merge_miner::{
    analysis::case_centric::backbone::{dfg_backbone, DEFAULT_BACKBONE_SEARCH_LIMIT},
    core::event_data::case_centric::{
        constants::{ACTIVITY_NAME, CASE_CONCEPT_NAME, TIMESTAMP_NAME},
        io::EventLogColumns,
    },
    discover_bounded_dfg, discover_comparison_dfg,
    discovery::case_centric::bounded_dfg::islands::IslandStrategy,
    ComparisonConfig, CSVImportOptions, DirectlyFollowsGraph, DiscoveryConfig, EventLog,
    Exportable, Importable,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Bounded directly-follows graph discovery and multi-log comparison
#[derive(Parser, Debug)]
#[command(name = "binary", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover a bounded DFG from one event log
    Discover(DiscoverArgs),
    /// Discover the comparison DFG of two or more event logs
    Compare(CompareArgs),
}

/// CSV column layout shared by all commands
#[derive(Args, Debug, Clone)]
struct ColumnArgs {
    /// Case identifier column
    #[arg(long, default_value = CASE_CONCEPT_NAME)]
    case_column: String,

    /// Activity column
    #[arg(long, default_value = ACTIVITY_NAME)]
    activity_column: String,

    /// Timestamp column
    #[arg(long, default_value = TIMESTAMP_NAME)]
    timestamp_column: String,

    /// Date format tried first when parsing timestamps (chrono syntax)
    #[arg(long)]
    date_format: Option<String>,

    /// Fail on malformed rows instead of skipping them
    #[arg(long)]
    strict: bool,
}

impl ColumnArgs {
    fn import_options(&self) -> CSVImportOptions {
        CSVImportOptions {
            columns: EventLogColumns {
                case_id: self.case_column.clone(),
                activity: self.activity_column.clone(),
                timestamp: self.timestamp_column.clone(),
            },
            date_format: self.date_format.clone(),
            strict: self.strict,
            ..Default::default()
        }
    }
}

/// Handling of disconnected islands
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum IslandsArg {
    /// Keep all islands
    Keep,
    /// Keep only the largest island
    Largest,
    /// Reconnect islands with the best unused relations
    Reconnect,
    /// Reconnect, then keep only the largest island
    #[default]
    ReconnectLargest,
}

impl From<IslandsArg> for IslandStrategy {
    fn from(value: IslandsArg) -> Self {
        match value {
            IslandsArg::Keep => IslandStrategy::Keep,
            IslandsArg::Largest => IslandStrategy::LargestOnly,
            IslandsArg::Reconnect => IslandStrategy::Reconnect,
            IslandsArg::ReconnectLargest => IslandStrategy::ReconnectThenLargest,
        }
    }
}

#[derive(Args, Debug)]
struct DiscoverArgs {
    /// Event log (.csv or .csv.gz)
    log: PathBuf,

    /// Maximal number of distinct activities in the result
    #[arg(long)]
    max_activities: Option<usize>,

    /// Activities to include whenever they connect to the graph (comma separated)
    #[arg(long, value_delimiter = ',')]
    keep: Vec<String>,

    /// Fraction of each case treated as its start and end segment
    #[arg(long)]
    trim: Option<f64>,

    /// Handling of disconnected islands
    #[arg(long, value_enum, default_value_t)]
    islands: IslandsArg,

    /// Also log the backbone (longest path) of the result
    #[arg(long)]
    backbone: bool,

    /// Write the DFG to this JSON file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    columns: ColumnArgs,
}

impl DiscoverArgs {
    fn config(&self) -> DiscoveryConfig {
        let default = DiscoveryConfig::default();
        DiscoveryConfig {
            max_edges: self.max_activities.unwrap_or(default.max_edges),
            must_keep: self
                .keep
                .iter()
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .map(String::from)
                .collect(),
            trim_percentage: self.trim.unwrap_or(default.trim_percentage),
            islands: self.islands.into(),
        }
    }
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Event logs to compare (.csv or .csv.gz)
    #[arg(num_args = 2.., required = true)]
    logs: Vec<PathBuf>,

    /// Fraction of a relation's highest normalized frequency a log must reach, in (0, 1]
    #[arg(long)]
    threshold: Option<f64>,

    /// Minimal number of logs a relation must be present in
    #[arg(long)]
    filter_count: Option<u64>,

    /// Fraction of each case treated as its start and end segment
    #[arg(long)]
    trim: Option<f64>,

    /// Write the DFG to this JSON file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    columns: ColumnArgs,
}

impl CompareArgs {
    fn config(&self) -> ComparisonConfig {
        let default = ComparisonConfig::default();
        ComparisonConfig {
            similarity_threshold: self.threshold.unwrap_or(default.similarity_threshold),
            participation_threshold: self
                .filter_count
                .unwrap_or(default.participation_threshold),
            trim_percentage: self.trim.unwrap_or(default.trim_percentage),
        }
    }
}

fn import_log(path: &Path, options: &CSVImportOptions) -> CliResult<EventLog> {
    let now = Instant::now();
    let log = EventLog::import_from_path_with_options(path, options.clone())?;
    info!(
        path = %path.display(),
        cases = log.num_cases(),
        events = log.num_events(),
        elapsed = ?now.elapsed(),
        "Imported event log"
    );
    Ok(log)
}

fn write_dfg(dfg: &DirectlyFollowsGraph, output: Option<&Path>) -> CliResult<()> {
    match output {
        Some(path) => {
            dfg.export_to_path(path)?;
            info!(path = %path.display(), "Wrote DFG");
        }
        None => println!("{}", serde_json::to_string_pretty(dfg)?),
    }
    Ok(())
}

fn run(command: Command) -> CliResult<()> {
    match command {
        Command::Discover(args) => {
            let log = import_log(&args.log, &args.columns.import_options())?;
            let now = Instant::now();
            let dfg = discover_bounded_dfg(&log, &args.config())?;
            info!(
                activities = dfg.activities.len(),
                relations = dfg.directly_follows_relations.len(),
                elapsed = ?now.elapsed(),
                "Discovered bounded DFG"
            );
            if args.backbone {
                match dfg_backbone(&dfg) {
                    Some(backbone) => info!(?backbone, "Backbone of discovered DFG"),
                    None => warn!(
                        limit = DEFAULT_BACKBONE_SEARCH_LIMIT,
                        "Backbone search gave up, graph too dense"
                    ),
                }
            }
            write_dfg(&dfg, args.output.as_deref())
        }
        Command::Compare(args) => {
            let options = args.columns.import_options();
            let logs = args
                .logs
                .iter()
                .map(|path| import_log(path, &options))
                .collect::<CliResult<Vec<_>>>()?;
            let now = Instant::now();
            let dfg = discover_comparison_dfg(&logs, &args.config())?;
            info!(
                logs = logs.len(),
                activities = dfg.activities.len(),
                relations = dfg.directly_follows_relations.len(),
                elapsed = ?now.elapsed(),
                "Discovered comparison DFG"
            );
            write_dfg(&dfg, args.output.as_deref())
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
