//! Explorer daemon: entry point for serving and maintaining the reference
//! indices.

mod chain;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use explorer_index::IndexedStore;
use explorer_rpc::{ExplorerContext, RpcServer};
use explorer_store::{BlockStore, DocumentStore, MemoryDocumentStore};
use explorer_store_lmdb::{IntegrityReport, IndexStoreConfig, LmdbBaseStore, LmdbDocumentStore};
use explorer_utils::{init_logging, LogFormat};

use crate::chain::select_chain;
use crate::config::ExplorerConfig;

#[derive(Parser)]
#[command(name = "explorer-daemon", about = "Blockchain explorer reference index daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base store directory. The index store lives in its `ext/` subdirectory.
    #[arg(long, global = true, env = "EXPLORER_STORE")]
    store: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "EXPLORER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "EXPLORER_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Serve the query API.
    Serve {
        /// Chain to serve. Omittable if the store holds only one chain.
        #[arg(long, env = "EXPLORER_CHAIN_ID")]
        chain_id: Option<String>,

        /// Address to bind the API to.
        #[arg(long, env = "EXPLORER_BIND")]
        bind: Option<String>,

        /// Open both stores read-only.
        #[arg(long)]
        read_only: bool,

        /// Keep the indices in memory, rebuilt from the base store at startup.
        #[arg(long)]
        memory_index: bool,
    },
    /// Re-derive every reference from the base store.
    Reindex,
    /// Check every database and report entry counts.
    Check,
}

fn load_config(cli: &Cli) -> anyhow::Result<ExplorerConfig> {
    let mut config = match &cli.config {
        Some(path) => ExplorerConfig::from_toml_file(path)?,
        None => ExplorerConfig::default(),
    };
    if let Some(store) = &cli.store {
        config.store_path = store.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Command::Serve {
        chain_id,
        bind,
        read_only,
        memory_index,
    } = &cli.command
    {
        if chain_id.is_some() {
            config.chain_id = chain_id.clone();
        }
        if let Some(bind) = bind {
            config.bind_address = bind.clone();
        }
        config.index.read_only |= *read_only;
        config.memory_index |= *memory_index;
    }
    Ok(config)
}

/// Stores opened for serving or reindexing.
struct OpenedStores {
    indexed: IndexedStore,
    base: Arc<LmdbBaseStore>,
    /// `None` when the indices live in memory.
    index: Option<Arc<LmdbDocumentStore>>,
}

fn open_stores(config: &ExplorerConfig) -> anyhow::Result<OpenedStores> {
    let base = Arc::new(
        LmdbBaseStore::open(&config.store_path, config.index.read_only)
            .with_context(|| format!("opening base store at {}", config.store_path.display()))?,
    );
    let index = match config.index_path() {
        Some(path) => Some(Arc::new(
            LmdbDocumentStore::open(&path, &config.index)
                .with_context(|| format!("opening index store at {}", path.display()))?,
        )),
        None => {
            info!("index store running in memory");
            None
        }
    };
    let documents: Arc<dyn DocumentStore> = match &index {
        Some(index) => index.clone(),
        None => Arc::new(MemoryDocumentStore::new()),
    };
    Ok(OpenedStores {
        indexed: IndexedStore::new(base.clone(), documents),
        base,
        index,
    })
}

fn log_report(what: &str, report: &IntegrityReport) {
    info!(
        store = what,
        databases = report.databases_checked,
        entries = report.total_entries,
        "integrity check"
    );
    for error in &report.errors {
        warn!(store = what, %error, "integrity problem");
    }
}

/// Count every database of both stores, logging what was found.
///
/// Returns whether both stores are healthy.
fn integrity_check(base: &LmdbBaseStore, index: Option<&LmdbDocumentStore>) -> anyhow::Result<bool> {
    let base_report = base.integrity_report()?;
    log_report("base", &base_report);
    let mut healthy = base_report.is_healthy();
    if let Some(index) = index {
        let index_report = index.integrity_report()?;
        log_report("index", &index_report);
        healthy &= index_report.is_healthy();
    }
    Ok(healthy)
}

async fn serve(config: ExplorerConfig) -> anyhow::Result<()> {
    let OpenedStores { indexed: store, base, index } = open_stores(&config)?;
    if !integrity_check(&base, index.as_deref())? {
        anyhow::bail!("integrity check found problems; run `check` for details");
    }

    let chains = base.chain_ids().context("listing chains")?;
    let chain_id = select_chain(config.chain_id.as_deref(), &chains)?;

    if config.memory_index {
        let report = store.rebuild()?;
        info!(
            blocks = report.blocks,
            transactions = report.transactions,
            "in-memory index populated"
        );
    }

    let context = Arc::new(ExplorerContext::new(Arc::new(store), chain_id));
    RpcServer::new(config.bind_address, context).start().await?;
    Ok(())
}

fn reindex(config: &ExplorerConfig) -> anyhow::Result<()> {
    if config.index.read_only {
        anyhow::bail!("cannot reindex a read-only store");
    }
    let store = open_stores(config)?.indexed;
    let report = store.rebuild()?;
    info!(
        blocks = report.blocks,
        transactions = report.transactions,
        "reindex complete"
    );
    Ok(())
}

fn check(config: &ExplorerConfig) -> anyhow::Result<()> {
    let base = LmdbBaseStore::open(&config.store_path, true)
        .with_context(|| format!("opening base store at {}", config.store_path.display()))?;
    let index = match config.index_path() {
        Some(index_path) => {
            let read_only = IndexStoreConfig {
                read_only: true,
                ..config.index.clone()
            };
            Some(
                LmdbDocumentStore::open(&index_path, &read_only)
                    .with_context(|| format!("opening index store at {}", index_path.display()))?,
            )
        }
        None => None,
    };

    if !integrity_check(&base, index.as_ref())? {
        anyhow::bail!("integrity check found problems");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level)?;

    if let Some(path) = &cli.config {
        info!(path = %path.display(), "loaded config");
    }

    match cli.command {
        Command::Serve { .. } => serve(config).await,
        Command::Reindex => reindex(&config),
        Command::Check => check(&config),
    }
}
