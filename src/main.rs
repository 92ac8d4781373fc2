use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use record_search::config::Config;
use record_search::record::{StaticRecords, sample_records};
use record_search::search::SearchManager;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{self, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "record-search", about = "Index records and run ranked free-text searches")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Index directory (overrides the config)
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,

    /// Write logs to daily files in this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rebuild the whole index from a record source
    Index {
        #[command(flatten)]
        records: RecordArgs,
    },
    /// Search the index
    Search {
        query: String,

        /// Number of results wanted
        #[arg(long, default_value_t = 10)]
        count: usize,

        #[command(flatten)]
        records: RecordArgs,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show document count and commit metadata
    Stats,
}

#[derive(Debug, Args)]
struct RecordArgs {
    /// JSON array of {id, title, contents} records
    #[arg(long, conflicts_with = "sample")]
    records: Option<PathBuf>,

    /// Use the built-in sample records
    #[arg(long)]
    sample: bool,
}

impl RecordArgs {
    fn load(&self) -> Result<StaticRecords> {
        match (&self.records, self.sample) {
            (Some(path), _) => StaticRecords::from_json_file(path),
            (None, true) => Ok(StaticRecords::new(sample_records())),
            (None, false) => Ok(StaticRecords::default()),
        }
    }
}

fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "record-search.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .init();
            None
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_dir.as_deref());

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.index_dir {
        config.index_dir = Some(dir.clone());
    }

    match cli.command {
        Command::Index { records } => {
            let source = records.load()?;
            if source.is_empty() {
                tracing::warn!("Record source is empty; the index will be cleared");
            }

            let manager = SearchManager::new_with_config(&config, source);
            manager
                .rebuild_from_source()
                .context("Failed to rebuild index")?;
            println!("Indexed {} records into {}", manager.source().len(), config.index_path().display());
        }
        Command::Search {
            query,
            count,
            records,
            json,
        } => {
            let manager = SearchManager::new_with_config(&config, records.load()?);
            let results = manager
                .search(&query, count)
                .context("Search temporarily unavailable")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No results for '{}'", query);
            } else {
                for (i, result) in results.iter().enumerate() {
                    println!("{}. [{}] {} (score {:.3})", i + 1, result.id, result.title, result.score);
                    if !result.contents.is_empty() {
                        println!("   {}", result.contents);
                    }
                }
            }
        }
        Command::Stats => {
            let manager = SearchManager::new_with_config(&config, StaticRecords::default());
            let stats = manager.stats().context("Failed to open index")?;

            println!("Index: {}", config.index_path().display());
            println!("Documents: {}", stats.total_documents);
            println!("Segments: {}", stats.segment_count);
            if let Some(meta) = stats.metadata {
                println!("Records at last rebuild: {}", meta.record_count);
                println!("Built at: {}", meta.built_at);
                println!("Built by version: {}", meta.version);
            }
        }
    }

    Ok(())
}
