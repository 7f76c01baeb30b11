//! qdb CLI
//!
//! Command-line front end for the qdb client, running against a simulated
//! cluster whose state is kept in a JSON snapshot between invocations.
//!
//! # Usage
//!
//! ```bash
//! # Store a blob, then try to use it as a set
//! qdb blob put foo X
//! qdb hset insert foo X        # error: incompatible type
//!
//! # Expiry
//! qdb expiry set foo --seconds 60
//! qdb expiry get foo
//!
//! # Node introspection
//! qdb node port qdb://127.0.0.1:2836
//! ```

mod commands;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use qdb_core::{ClientConfig, Cluster, SimCluster, SimSnapshot, SystemClock};

use crate::commands::{execute, Commands};

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Default snapshot location
pub const STATE_PATH_DEFAULT: &str = "~/.qdb-sim.json";

/// Application name
pub const APP_NAME: &str = "qdb";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// CLI
// =============================================================================

/// qdb client CLI
#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(about = "qdb client against a simulated cluster")]
#[command(version)]
struct Cli {
    /// Cluster URI (defaults to QDB_URI, then qdb://127.0.0.1:2836)
    #[arg(long)]
    uri: Option<String>,

    /// Snapshot file holding the simulated cluster
    #[arg(long, default_value = STATE_PATH_DEFAULT)]
    state: String,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

// =============================================================================
// State
// =============================================================================

/// Load the simulated cluster, or create a one-node cluster for `config`.
fn load_cluster(path: &Path, config: &ClientConfig) -> anyhow::Result<SimCluster> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no snapshot, starting empty cluster");
        return Ok(SimCluster::single(config.endpoint()?));
    }
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot: SimSnapshot = serde_json::from_slice(&bytes)
        .with_context(|| format!("invalid snapshot {}", path.display()))?;
    let sim = SimCluster::from_snapshot(snapshot, Arc::new(SystemClock))
        .with_context(|| format!("unusable snapshot {}", path.display()))?;
    Ok(sim)
}

/// Persist the simulated cluster.
fn save_cluster(path: &Path, sim: &SimCluster) -> anyhow::Result<()> {
    let bytes = serde_json::to_vec_pretty(&sim.snapshot())?;
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    Ok(())
}

// =============================================================================
// Main
// =============================================================================

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn,qdb_core=info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("qdb v{}", APP_VERSION);

    let config = match cli.uri {
        Some(uri) => ClientConfig::with_uri(uri),
        None => ClientConfig::from_env(),
    };
    let state_path = PathBuf::from(shellexpand::tilde(&cli.state).to_string());

    let sim = load_cluster(&state_path, &config)?;
    let cluster = Cluster::connect_with_config(&config, &sim)?;

    let outcome = execute(&cli.command, &cluster);
    cluster.close();
    save_cluster(&state_path, &sim)?;

    println!("{}", outcome?);
    Ok(())
}
