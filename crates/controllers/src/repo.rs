//! Repo adapter.

use async_trait::async_trait;
use ghp_core::{Repo, Result};
use ghp_github::{Client, NewRepo};
use ghp_reconciler::{Connector, EventReason, ExternalClient, ExternalObservation};
use tracing::debug;

use crate::connector::GithubConnector;

/// [`ExternalClient`] for repositories.
pub struct RepoExternal {
    client: Client,
}

#[async_trait]
impl Connector<Repo> for GithubConnector {
    type External = RepoExternal;

    async fn connect(&self, resource: &Repo) -> Result<RepoExternal> {
        Ok(RepoExternal {
            client: self.client_for(resource).await?,
        })
    }
}

#[async_trait]
impl ExternalClient<Repo> for RepoExternal {
    async fn exists(&self, resource: &Repo) -> Result<bool> {
        let id = resource.spec.identity()?;
        Ok(self.client.repos().exists(&id).await?)
    }

    async fn observe(&self, resource: &mut Repo) -> Result<ExternalObservation> {
        let id = resource.spec.identity()?;

        let Some(info) = self.client.repos().get(&id).await? else {
            debug!(org = %id.org, repo = %id.name, "Repo does not exist");
            return Ok(ExternalObservation::missing());
        };

        resource.status.url = info.html_url;
        resource.status.private = Some(info.private);
        Ok(ExternalObservation::up_to_date().with_note(
            EventReason::AlreadyExists,
            format!("Repo '{}/{}' already exists", id.org, id.name),
        ))
    }

    async fn create(&self, resource: &Repo) -> Result<()> {
        let id = resource.spec.identity()?;
        let new_repo = NewRepo {
            name: &id.name,
            private: resource.spec.private,
            auto_init: resource.spec.initialize(),
        };

        self.client.repos().create(&id.org, &new_repo).await?;
        debug!(org = %id.org, repo = %id.name, "Repo created");
        Ok(())
    }

    /// Repositories have no mutable fields that are converged.
    async fn update(&self, resource: &Repo) -> Result<()> {
        debug!(repo = %resource.metadata.key(), "Repo update is a no-op");
        Ok(())
    }

    async fn delete(&self, resource: &Repo) -> Result<()> {
        let id = resource.spec.identity()?;
        self.client.repos().delete(&id).await?;
        debug!(org = %id.org, repo = %id.name, "Repo deleted");
        Ok(())
    }
}
