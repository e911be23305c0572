//! # github-provider
//!
//! ## Startup Sequence
//!
//! 1. **Manifest** - Load declared objects into the in-memory stores
//! 2. **Controllers** - Spawn the Repo, Collaborator and TeamRepo controllers
//! 3. **Resync** - Re-read the manifest every sync period
//!
//! Any failure during startup halts with a clear error message. After
//! that, errors only ever affect the resource they concern.
//!
//! ## Shutdown
//!
//! SIGTERM/SIGINT initiate shutdown through the `ShutdownCoordinator`:
//! no new reconcile pass starts and in-flight passes are abandoned.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ghp_controllers::{FileSecretResolver, Stores, setup};
use ghp_reconciler::{ShutdownCoordinator, TracingRecorder, install_signal_handlers};
use github_provider::cli::Cli;
use github_provider::manifest::{self, Manifest};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    info!(
        sync = ?cli.sync,
        poll = ?cli.poll,
        max_reconcile_rate = cli.max_reconcile_rate,
        manifests = %cli.manifests.display(),
        "github-provider starting"
    );

    let stores = Stores::new();
    let manifest = Manifest::load(&cli.manifests)
        .await
        .with_context(|| format!("Cannot load manifests from {}", cli.manifests.display()))?;
    let summary = manifest.apply(&stores).await;
    info!(
        applied = summary.applied,
        rejected = summary.rejected,
        "Manifest loaded"
    );

    let shutdown = ShutdownCoordinator::shared();
    let _signals = install_signal_handlers(Arc::clone(&shutdown));

    let mut handles = setup(
        &stores,
        Arc::new(FileSecretResolver::new(&cli.secrets_dir)),
        Arc::new(TracingRecorder),
        &cli.controller_options(),
        &shutdown,
    )
    .context("Cannot setup controllers")?;

    handles.push(tokio::spawn(manifest::sync_loop(
        cli.manifests.clone(),
        stores,
        cli.sync,
        Arc::clone(&shutdown),
    )));

    info!("github-provider is running. Press Ctrl+C to stop.");

    for handle in handles {
        if let Err(e) = handle.await {
            error!(error = %e, "Task ended abnormally");
        }
    }

    info!("github-provider stopped");
    Ok(())
}

/// Initialize tracing subscriber with environment filter.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
