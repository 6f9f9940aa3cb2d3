//! revtrack CLI: review document tracker.
//!
//! Commands: init, sync, list, summary, set-status

mod logging;
mod output;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use revtrack_core::config::CONFIG_FILE;
use revtrack_core::{rank, Config, Status, StatusOverride, Summary, TrackingStore};
use revtrack_source::{identity_of, FolderSource};
use revtrack_store::SqliteLedger;
use revtrack_sync::{SyncEngine, SyncScheduler};

use output::{format_rows, format_summary, ListRow, OutputFormat};

#[derive(Parser)]
#[command(name = "revtrack")]
#[command(version)]
#[command(about = "Track review documents and rank them by staleness")]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file and create the document folder
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Reconcile the document folder into the ledger on a fixed interval
    Sync {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },
    /// Tracked documents, most urgent first
    #[command(alias = "ls")]
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Only show documents with this status
        #[arg(long)]
        status: Option<String>,
    },
    /// Counts by status and priority tier
    Summary {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Queue a status change, applied at the next sync cycle
    SetStatus {
        /// Document link, or the path of a file in the document folder
        link: String,
        /// One of: Pending, "In Review", Approved, "Needs Changes", Completed, Archived
        status: String,
        /// Replace the document's notes
        #[arg(long)]
        notes: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let load = || {
        Config::load(&cli.config).with_context(|| format!("cannot load {}", cli.config.display()))
    };

    match cli.command {
        Commands::Init { force } => cmd_init(&cli.config, force),
        Commands::Sync { once } => {
            let config = load()?;
            logging::init("info", config.sync.log_file.as_deref())?;
            if once {
                cmd_sync_once(&config)
            } else {
                cmd_sync(&config)
            }
        }
        Commands::List { format, status } => {
            logging::init("warn", None)?;
            cmd_list(&load()?, format, status.as_deref())
        }
        Commands::Summary { format } => {
            logging::init("warn", None)?;
            cmd_summary(&load()?, format)
        }
        Commands::SetStatus {
            link,
            status,
            notes,
        } => {
            logging::init("warn", None)?;
            cmd_set_status(&load()?, &link, &status, notes)
        }
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(config_path, Config::default().to_toml()?)
        .with_context(|| format!("cannot write {}", config_path.display()))?;

    let config = Config::load(config_path)?;
    fs::create_dir_all(&config.source.folder)
        .with_context(|| format!("cannot create {}", config.source.folder.display()))?;

    println!(
        "Initialized revtrack: config {}, documents in {}",
        config_path.display(),
        config.source.folder.display()
    );
    Ok(())
}

fn engine(config: &Config) -> Result<SyncEngine<FolderSource, SqliteLedger>> {
    let source = FolderSource::new(&config.source.folder, &config.source.extensions);
    let store = SqliteLedger::open(&config.store.path)
        .with_context(|| format!("cannot open ledger {}", config.store.path.display()))?;
    Ok(SyncEngine::new(source, store))
}

fn cmd_sync_once(config: &Config) -> Result<()> {
    let report = engine(config)?.run_cycle().context("sync cycle failed")?;
    println!(
        "Synced {} documents ({} new, {} archived, {} rejected, {} status changes applied)",
        report.written,
        report.stats.created,
        report.stats.archived,
        report.rejected,
        report.overrides_applied
    );
    Ok(())
}

fn cmd_sync(config: &Config) -> Result<()> {
    let scheduler = SyncScheduler::new(engine(config)?, config.sync.interval());
    info!(
        folder = %config.source.folder.display(),
        ledger = %config.store.path.display(),
        interval_minutes = config.sync.interval_minutes,
        "starting sync daemon, press Ctrl-C to stop"
    );

    let runtime = tokio::runtime::Runtime::new().context("cannot start async runtime")?;
    let state = runtime.block_on(scheduler.run(shutdown_signal()));

    println!(
        "Stopped after {} successful and {} failed cycles ({} ticks skipped)",
        state.succeeded(),
        state.failed(),
        state.skipped_ticks()
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for Ctrl-C, stop the process to exit");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

fn read_ranked(config: &Config) -> Result<Vec<revtrack_core::TrackedRecord>> {
    let store = SqliteLedger::open(&config.store.path)
        .with_context(|| format!("cannot open ledger {}", config.store.path.display()))?;
    let now = Utc::now();
    let mut records = store.read_all()?.into_records();
    for record in &mut records {
        record.rescore(now);
    }
    Ok(rank(records))
}

fn cmd_list(config: &Config, format: OutputFormat, status: Option<&str>) -> Result<()> {
    let status: Option<Status> = status.map(str::parse::<Status>).transpose()?;
    let rows: Vec<ListRow> = read_ranked(config)?
        .iter()
        .filter(|r| status.map_or(true, |s| r.status == s))
        .map(ListRow::from)
        .collect();
    print!("{}", with_newline(format_rows(&rows, format)));
    Ok(())
}

fn cmd_summary(config: &Config, format: OutputFormat) -> Result<()> {
    let records = read_ranked(config)?;
    let summary = Summary::from_records(&records);
    print!("{}", with_newline(format_summary(&summary, format)));
    Ok(())
}

fn cmd_set_status(config: &Config, link: &str, status: &str, notes: Option<String>) -> Result<()> {
    let status: Status = status.parse()?;
    let path = Path::new(link);
    let identity = if path.is_file() {
        identity_of(path).with_context(|| format!("cannot resolve {link}"))?
    } else {
        link.to_string()
    };

    let mut store = SqliteLedger::open(&config.store.path)
        .with_context(|| format!("cannot open ledger {}", config.store.path.display()))?;
    if !store.read_all()?.contains(&identity) {
        eprintln!("warning: {identity} is not tracked yet; the change waits until it is");
    }

    let status_override = StatusOverride {
        identity,
        status,
        notes,
    };
    store.submit_override(&status_override, Utc::now())?;
    println!(
        "Queued {} for {}; applied at the next sync",
        status_override.status, status_override.identity
    );
    Ok(())
}

fn with_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
