//! ledgerdiff CLI - diff and summarize ledger state snapshots
//!
//! Reads a snapshot file and prints diffs between two state roots or the
//! summary line of one root. Roots are given as hex hashes or by the names
//! stored in the snapshot (usually ledger sequence numbers).

use clap::{Parser, Subcommand, ValueEnum};
use ledger_diff::{fold, Config, DiffEngine, LedgerState, SnapshotFile, Summary};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "ledgerdiff")]
#[command(about = "Structural diffs and summaries over ledger state snapshots")]
#[command(version)]
struct Cli {
    /// Path to the snapshot file
    #[arg(short, long, default_value = "ledgers.lds")]
    snapshot: PathBuf,

    /// Output format (json or text)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Config file (defaults to ~/.config/ledgerdiff/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log verbosity, written to stderr
    #[arg(long, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the nodes that changed between two state roots
    Diff {
        /// Old state root (hash or root name)
        old: String,
        /// New state root (hash or root name)
        new: String,
        /// Drop leaves that only moved within the tree
        #[arg(long)]
        fold: bool,
    },

    /// Count the nodes of one state root by kind
    Summary {
        /// State root (hash or root name)
        root: String,
    },

    /// List the named roots stored in the snapshot
    Roots,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.log_level);
    debug!(?cli, "parsed arguments");

    let config = Config::load(cli.config.as_deref())?;
    let snapshot = SnapshotFile::open(&cli.snapshot)?;

    match cli.command {
        Commands::Diff { old, new, fold: fold_log } => {
            let old_root = snapshot.resolve(&old)?;
            let new_root = snapshot.resolve(&new)?;

            let mut log = DiffEngine::new(&snapshot)
                .with_max_depth(config.max_depth)
                .diff(old_root, new_root)?;
            if fold_log {
                log = fold(&log);
            }

            match cli.format {
                OutputFormat::Text => {
                    for line in log.lines() {
                        println!("{}", line);
                    }
                }
                OutputFormat::Json => output_json(&serde_json::json!({
                    "old": old_root.to_hex(),
                    "new": new_root.to_hex(),
                    "folded": fold_log,
                    "added": log.added_count(),
                    "deleted": log.deleted_count(),
                    "entries": log.lines(),
                })),
            }
        }

        Commands::Summary { root } => {
            let root_hash = snapshot.resolve(&root)?;
            let mut state =
                LedgerState::from_store(root_hash, &snapshot)?.with_max_depth(config.max_depth);
            state.fill()?;

            match cli.format {
                OutputFormat::Text => println!("{}", state.summary()?),
                OutputFormat::Json => {
                    let counts = state.counts()?;
                    let fields: serde_json::Map<String, serde_json::Value> = Summary::field_names()
                        .into_iter()
                        .zip(counts.fields())
                        .map(|(name, value)| (name.to_string(), value.into()))
                        .collect();
                    output_json(&serde_json::json!({
                        "root": root_hash.to_hex(),
                        "summary": counts.to_string(),
                        "fields": fields,
                    }));
                }
            }
        }

        Commands::Roots => {
            let roots = snapshot.roots();
            match cli.format {
                OutputFormat::Text => {
                    for (name, hash) in &roots {
                        println!("{} {}", name, hash);
                    }
                }
                OutputFormat::Json => {
                    let items: Vec<_> = roots
                        .iter()
                        .map(|(name, hash)| {
                            serde_json::json!({ "name": name, "hash": hash.to_hex() })
                        })
                        .collect();
                    output_json(&serde_json::json!({
                        "count": items.len(),
                        "roots": items,
                    }));
                }
            }
        }
    }

    Ok(())
}

fn setup_tracing(level: LogLevel) {
    if let Some(level) = level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
    }
}

fn output_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("failed to render output: {}", e),
    }
}
