//! Snapshot source server.
//!
//! Loads the configuration directory, keeps the snapshot cache in sync with
//! it and logs every published version until interrupted.
//!
//! Run with:
//! ```bash
//! cargo run --bin mcp-snapshot-server -- --config-dir ./config
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use mcp_snapshot::prelude::*;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Serve Istio configuration documents as versioned snapshots")]
struct Args {
    /// Istio config directory (or a single file)
    #[arg(short, long = "config-dir", alias = "configDir")]
    config_dir: PathBuf,

    /// Capacity of the filesystem event queue
    #[arg(long, default_value_t = mcp_snapshot::source::DEFAULT_EVENT_BUFFER)]
    event_buffer: usize,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("{}", mcp_snapshot::version::version_string());

    let config = SourceConfig::new(&args.config_dir).with_event_buffer(args.event_buffer);
    let cache = Arc::new(SnapshotCache::new());
    let watcher = ConfigWatcher::new(config, Arc::clone(&cache)).with_context(|| {
        format!(
            "can't read configuration from {}",
            args.config_dir.display()
        )
    })?;

    let snapshot = cache.snapshot();
    info!(
        version = %snapshot.version(),
        resources = snapshot.total_resources(),
        collections = TypeUrl::COLLECTIONS.len(),
        "serving snapshot"
    );
    for type_url in TypeUrl::collections() {
        debug!(
            collection = %type_url,
            resources = snapshot.resources(type_url.as_str()).len(),
            "collection"
        );
    }

    let mut rebuilds = watcher.subscribe();
    let monitor = tokio::spawn(async move {
        loop {
            match rebuilds.recv().await {
                Ok(RebuildEvent::Published { version }) => info!(%version, "configuration reloaded"),
                Ok(RebuildEvent::Failed { version, error }) => {
                    error!(%version, %error, "configuration reload failed")
                }
                Err(RecvError::Lagged(missed)) => warn!(missed, "missed rebuild events"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    info!("shutting down");

    watcher.stop();
    monitor.abort();

    let stats = cache.stats();
    info!(
        snapshots = stats.snapshots_published(),
        watches_fulfilled = stats.watches_fulfilled(),
        "stopped"
    );
    Ok(())
}
