//! TeamRepo adapter.

use async_trait::async_trait;
use ghp_core::{Result, TeamRepo};
use ghp_github::{Client, PermissionSet};
use ghp_reconciler::{Connector, EventReason, ExternalClient, ExternalObservation};
use tracing::debug;

use crate::connector::GithubConnector;

/// Whether `granted` holds exactly the `desired` permission: its flag is set
/// and every other flag is clear.
pub fn permissions_up_to_date(granted: &PermissionSet, desired: &str) -> bool {
    granted.get(desired).copied().unwrap_or(false)
        && granted
            .iter()
            .all(|(name, given)| name == desired || !*given)
}

/// [`ExternalClient`] for team permissions on a repository.
pub struct TeamRepoExternal {
    client: Client,
}

#[async_trait]
impl Connector<TeamRepo> for GithubConnector {
    type External = TeamRepoExternal;

    async fn connect(&self, resource: &TeamRepo) -> Result<TeamRepoExternal> {
        Ok(TeamRepoExternal {
            client: self.client_for(resource).await?,
        })
    }
}

#[async_trait]
impl ExternalClient<TeamRepo> for TeamRepoExternal {
    async fn exists(&self, resource: &TeamRepo) -> Result<bool> {
        let id = resource.spec.identity()?;
        let granted = self.client.team_repos().permissions(&id).await?;
        Ok(!granted.permissions.is_empty())
    }

    async fn observe(&self, resource: &mut TeamRepo) -> Result<ExternalObservation> {
        let id = resource.spec.identity()?;
        let granted = self.client.team_repos().permissions(&id).await?;

        resource.status.role_name = granted.role_name;
        if granted.permissions.is_empty() {
            debug!(org = %id.org, team = %id.team_slug, owner = %id.owner, repo = %id.repo, "Team has no access");
            return Ok(ExternalObservation::absent().with_note(
                EventReason::NotPermitted,
                format!(
                    "Team {}/{} not permitted any access to repo {}/{}",
                    id.org, id.team_slug, id.owner, id.repo
                ),
            ));
        }

        let up_to_date = permissions_up_to_date(&granted.permissions, &resource.spec.permission);
        debug!(
            org = %id.org,
            team = %id.team_slug,
            owner = %id.owner,
            repo = %id.repo,
            desired = %resource.spec.permission,
            up_to_date,
            "Observed team permissions"
        );

        Ok(if up_to_date {
            ExternalObservation::up_to_date().with_note(
                EventReason::AlreadyPermitted,
                format!(
                    "Team {}/{} already permitted access to repo {}/{}",
                    id.org, id.team_slug, id.owner, id.repo
                ),
            )
        } else {
            ExternalObservation::drifted().with_note(
                EventReason::NotPermitted,
                format!(
                    "Team {}/{} misses exact {} permission to repo {}/{}",
                    id.org, id.team_slug, resource.spec.permission, id.owner, id.repo
                ),
            )
        })
    }

    async fn create(&self, resource: &TeamRepo) -> Result<()> {
        let id = resource.spec.identity()?;
        self.client
            .team_repos()
            .grant(&id, &resource.spec.permission)
            .await?;
        debug!(org = %id.org, team = %id.team_slug, owner = %id.owner, repo = %id.repo, "Team access granted");
        Ok(())
    }

    /// The grant call is an upsert, so drift is fixed by granting again.
    async fn update(&self, resource: &TeamRepo) -> Result<()> {
        self.create(resource).await
    }

    async fn delete(&self, resource: &TeamRepo) -> Result<()> {
        let id = resource.spec.identity()?;
        self.client.team_repos().revoke(&id).await?;
        debug!(org = %id.org, team = %id.team_slug, owner = %id.owner, repo = %id.repo, "Team access revoked");
        Ok(())
    }
}
