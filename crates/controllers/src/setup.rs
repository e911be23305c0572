//! Wires one controller per managed kind.

use std::sync::Arc;

use ghp_core::{Collaborator, Managed, Repo, Result, TeamRepo};
use ghp_reconciler::{
    Connector, Controller, ControllerOptions, EventRecorder, InMemoryStore, RateLimiter,
    ReconcilerBuilder, ShutdownCoordinator,
};
use tokio::task::JoinHandle;
use tracing::info;

use crate::connector::GithubConnector;
use crate::secrets::SecretResolver;

/// Object stores for every managed kind.
#[derive(Clone, Default)]
pub struct Stores {
    pub repos: Arc<InMemoryStore<Repo>>,
    pub collaborators: Arc<InMemoryStore<Collaborator>>,
    pub team_repos: Arc<InMemoryStore<TeamRepo>>,
}

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Start the Repo, Collaborator and TeamRepo controllers.
///
/// All three share one rate limiter, so `max_concurrent_reconciles` bounds
/// passes across kinds.
pub fn setup(
    stores: &Stores,
    secrets: Arc<dyn SecretResolver>,
    recorder: Arc<dyn EventRecorder>,
    options: &ControllerOptions,
    shutdown: &Arc<ShutdownCoordinator>,
) -> Result<Vec<JoinHandle<()>>> {
    let connector = GithubConnector::new(secrets);
    let limiter = RateLimiter::new(options.max_concurrent_reconciles);

    info!(
        max_concurrent_reconciles = limiter.capacity(),
        "Setting up controllers"
    );

    Ok(vec![
        spawn_controller(
            connector.clone(),
            Arc::clone(&stores.repos),
            Arc::clone(&recorder),
            limiter.clone(),
            options,
            shutdown,
        )?,
        spawn_controller(
            connector.clone(),
            Arc::clone(&stores.collaborators),
            Arc::clone(&recorder),
            limiter.clone(),
            options,
            shutdown,
        )?,
        spawn_controller(
            connector,
            Arc::clone(&stores.team_repos),
            recorder,
            limiter,
            options,
            shutdown,
        )?,
    ])
}

fn spawn_controller<R>(
    connector: GithubConnector,
    store: Arc<InMemoryStore<R>>,
    recorder: Arc<dyn EventRecorder>,
    limiter: RateLimiter,
    options: &ControllerOptions,
    shutdown: &Arc<ShutdownCoordinator>,
) -> Result<JoinHandle<()>>
where
    R: Managed,
    GithubConnector: Connector<R>,
{
    let reconciler = ReconcilerBuilder::<R, GithubConnector>::new(connector)
        .with_store(store)
        .with_recorder(recorder)
        .build()?;

    let controller = Controller::new(reconciler, limiter, options);
    Ok(tokio::spawn(controller.run(Arc::clone(shutdown))))
}
