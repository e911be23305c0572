//! Collaborator adapter.

use async_trait::async_trait;
use ghp_core::{Collaborator, Result};
use ghp_github::Client;
use ghp_reconciler::{Connector, ExternalClient, ExternalObservation};
use tracing::debug;

use crate::connector::GithubConnector;

/// [`ExternalClient`] for repository collaborators.
pub struct CollaboratorExternal {
    client: Client,
}

#[async_trait]
impl Connector<Collaborator> for GithubConnector {
    type External = CollaboratorExternal;

    async fn connect(&self, resource: &Collaborator) -> Result<CollaboratorExternal> {
        Ok(CollaboratorExternal {
            client: self.client_for(resource).await?,
        })
    }
}

#[async_trait]
impl ExternalClient<Collaborator> for CollaboratorExternal {
    async fn exists(&self, resource: &Collaborator) -> Result<bool> {
        let id = resource.spec.identity()?;
        Ok(self.client.collaborators().exists(&id).await?)
    }

    async fn observe(&self, resource: &mut Collaborator) -> Result<ExternalObservation> {
        let id = resource.spec.identity()?;
        let collaborators = self.client.collaborators();

        if !collaborators.exists(&id).await? {
            debug!(org = %id.org, repo = %id.repo, username = %id.username, "Collaborator does not exist");
            resource.status.permission = None;
            return Ok(ExternalObservation::missing());
        }

        let granted = collaborators.permission(&id).await?;
        let up_to_date = granted.permission == resource.spec.permission;
        debug!(
            org = %id.org,
            repo = %id.repo,
            username = %id.username,
            granted = %granted.permission,
            desired = %resource.spec.permission,
            up_to_date,
            "Observed collaborator"
        );
        resource.status.permission = Some(granted.permission);

        Ok(if up_to_date {
            ExternalObservation::up_to_date()
        } else {
            ExternalObservation::drifted()
        })
    }

    async fn create(&self, resource: &Collaborator) -> Result<()> {
        let id = resource.spec.identity()?;
        self.client
            .collaborators()
            .grant(&id, &resource.spec.permission)
            .await?;
        debug!(org = %id.org, repo = %id.repo, username = %id.username, "Collaborator granted");
        Ok(())
    }

    /// The grant call is an upsert, so drift is fixed by granting again.
    async fn update(&self, resource: &Collaborator) -> Result<()> {
        self.create(resource).await
    }

    async fn delete(&self, resource: &Collaborator) -> Result<()> {
        let id = resource.spec.identity()?;
        self.client.collaborators().revoke(&id).await?;
        debug!(org = %id.org, repo = %id.repo, username = %id.username, "Collaborator revoked");
        Ok(())
    }
}
