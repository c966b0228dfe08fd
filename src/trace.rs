//! Installs the `tracing_subscriber` registry. Output goes to a file because the
//! terminal belongs to the map; without a file nothing is logged.
//!
//! ```bash
//! TUI_CLUSTER_LOG=cluster.log RUST_LOG=tui_cluster=trace tui-cluster
//! ```

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

const DEFAULT_FILTER: &str = "tui_cluster=debug";

pub fn initialize_tracer(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("installing tracing subscriber")?;
    Ok(())
}
