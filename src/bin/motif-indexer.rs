//! Motif Indexer CLI
//!
//! Replays a decoded event feed into a snapshot store and inspects the result.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use alloy_primitives::{Address, U256};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};

use motif_indexer::config::IndexerConfig;
use motif_indexer::events::MarketEvent;
use motif_indexer::metadata::StaticChain;
use motif_indexer::model::{Item, ItemId, Transfer};
use motif_indexer::router::{EventRouter, ProcessOutcome};
use motif_indexer::storage::{EntityKind, EntityStore, SnapshotFormat, SnapshotStore};

/// Motif Indexer - NFT marketplace event-to-state core
#[derive(Parser)]
#[command(name = "motif-indexer")]
#[command(author = "Motif Team")]
#[command(version = motif_indexer::VERSION)]
#[command(about = "Replay and inspect Motif marketplace events", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding the state snapshot
    #[arg(short, long, env = "MOTIF_DATA_DIR", default_value = "./motif-data")]
    data_dir: PathBuf,

    /// Snapshot encoding
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Bincode,
}

impl From<Format> for SnapshotFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => SnapshotFormat::Json,
            Format::Bincode => SnapshotFormat::Bincode,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines event file into the store
    Replay {
        /// Event feed, one JSON event per line
        #[arg(short, long)]
        events: PathBuf,

        /// Indexer configuration (JSON); MOTIF_* variables apply on top
        #[arg(short, long, env = "MOTIF_CONFIG")]
        config: Option<PathBuf>,

        /// Contract-call fixture (JSON)
        #[arg(long, env = "MOTIF_CHAIN_FIXTURE")]
        chain: Option<PathBuf>,
    },

    /// Print entity counts
    Stats,

    /// Print one item and its transfer history
    Item {
        /// Item contract address
        #[arg(short, long)]
        contract: String,

        /// Token id (decimal or 0x-prefixed hex)
        #[arg(short, long)]
        token_id: String,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let term = Term::stdout();

    if let Err(e) = run_command(&cli, &term) {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run_command(cli: &Cli, term: &Term) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Replay {
            events,
            config,
            chain,
        } => cmd_replay(cli, events, config.as_deref(), chain.as_deref(), term),
        Commands::Stats => cmd_stats(cli, term),
        Commands::Item { contract, token_id } => cmd_item(cli, contract, token_id, term),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMMAND HANDLERS
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_replay(
    cli: &Cli,
    events_path: &Path,
    config_path: Option<&Path>,
    chain_path: Option<&Path>,
    term: &Term,
) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => IndexerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?
            .with_env_overrides()?,
        None => IndexerConfig::from_env()?,
    };

    let chain = match chain_path {
        Some(path) => StaticChain::load(path)
            .with_context(|| format!("loading chain fixture {}", path.display()))?,
        None => StaticChain::new(),
    };

    let events = read_events(events_path)?;
    let _ = term.write_line(&format!(
        "{} Replaying {} events into {}",
        style("→").cyan(),
        style(events.len()).yellow(),
        cli.data_dir.display()
    ));

    let store = EntityStore::new(open_store(cli)?);
    let mut router = EventRouter::from_config(store, chain, &config)?;

    let progress = create_progress(events.len() as u64);
    for event in &events {
        let outcome = router.process(event)?;
        if let ProcessOutcome::Degraded(errors) = &outcome {
            for error in errors {
                progress.println(format!(
                    "{} block {} {}: {}",
                    style("⚠").yellow(),
                    event.meta.block_number,
                    event.kind.name(),
                    error
                ));
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();
    router.store().flush()?;

    let stats = router.statistics();
    let _ = term.write_line(&format!(
        "{} Applied {} ({} degraded), skipped {}, latest block {}",
        style("✓").green(),
        style(stats.applied + stats.degraded).green(),
        style(stats.degraded).yellow(),
        style(stats.skipped).dim(),
        stats.latest_block
    ));
    for (name, count) in &stats.events_by_type {
        let _ = term.write_line(&format!("  {:<36} {}", name, count));
    }

    Ok(())
}

fn cmd_stats(cli: &Cli, term: &Term) -> anyhow::Result<()> {
    let store = EntityStore::new(open_store(cli)?);

    let _ = term.write_line(&format!(
        "{} Entities in {}",
        style("→").cyan(),
        cli.data_dir.display()
    ));
    for kind in EntityKind::ALL {
        let count = store.count(kind)?;
        let _ = term.write_line(&format!("  {:<28} {}", kind.name(), style(count).cyan()));
    }

    Ok(())
}

fn cmd_item(cli: &Cli, contract: &str, token_id: &str, term: &Term) -> anyhow::Result<()> {
    let contract: Address = contract
        .parse()
        .with_context(|| format!("invalid contract address {}", contract))?;
    let token_id: U256 = token_id
        .parse()
        .with_context(|| format!("invalid token id {}", token_id))?;
    let id = ItemId::new(contract, token_id);

    let store = EntityStore::new(open_store(cli)?);
    let item = store
        .load::<Item>(&id)?
        .ok_or_else(|| anyhow::anyhow!("Item not found: {}", id))?;

    let mut transfers: Vec<Transfer> = store
        .load_all::<Transfer>()?
        .into_iter()
        .filter(|t| t.item == id)
        .collect();
    transfers.sort_by_key(|t| (t.created.block_number, t.id.log_index));

    let output = serde_json::json!({
        "item": item,
        "transfers": transfers,
    });
    let _ = term.write_line(&serde_json::to_string_pretty(&output)?);

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPER FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

fn open_store(cli: &Cli) -> anyhow::Result<SnapshotStore> {
    SnapshotStore::open(&cli.data_dir, cli.format.into())
        .with_context(|| format!("opening store at {}", cli.data_dir.display()))
}

fn read_events(path: &Path) -> anyhow::Result<Vec<MarketEvent>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

    let mut events = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: MarketEvent = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed event", path.display(), number + 1))?;
        events.push(event);
    }

    Ok(events)
}

fn create_progress(len: u64) -> ProgressBar {
    let progress = ProgressBar::new(len);
    if let Ok(progress_style) = ProgressStyle::default_bar()
        .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} events ({eta})")
    {
        progress.set_style(progress_style.progress_chars("=> "));
    }
    progress
}
