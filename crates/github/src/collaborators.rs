//! Repository collaborator endpoints.

use ghp_core::CollaboratorIdentity;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::client::Client;
use crate::error::{Error, Result};

/// Permission GitHub reports for a collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct CollaboratorPermission {
    pub permission: String,
    #[serde(default)]
    pub role_name: Option<String>,
}

/// Provides methods for granting, reading and revoking collaborators.
#[derive(Debug, Clone, Copy)]
pub struct CollaboratorService<'a> {
    client: &'a Client,
}

impl<'a> CollaboratorService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn collaborator_url(&self, id: &CollaboratorIdentity) -> Result<Url> {
        self.client
            .endpoint(&["repos", &id.org, &id.repo, "collaborators", &id.username])
    }

    /// Add or update a collaborator. The owner must be an organization.
    ///
    /// GitHub API docs: <https://docs.github.com/en/rest/collaborators/collaborators#add-a-repository-collaborator>
    pub async fn grant(&self, id: &CollaboratorIdentity, permission: &str) -> Result<()> {
        if !self.client.is_org(&id.org).await? {
            return Err(Error::not_organization(&id.org));
        }

        let url = self.collaborator_url(id)?;
        let body = serde_json::json!({ "permission": permission });
        let reply = self.client.send(Method::PUT, url, Some(body), None).await?;

        if reply.status.is_success() {
            Ok(())
        } else {
            Err(reply.into_error())
        }
    }

    /// Check if a user is a collaborator of a repository.
    ///
    /// GitHub API docs: <https://docs.github.com/en/rest/collaborators/collaborators#check-if-a-user-is-a-repository-collaborator>
    pub async fn exists(&self, id: &CollaboratorIdentity) -> Result<bool> {
        let url = self.collaborator_url(id)?;
        let reply = self.client.send(Method::GET, url, None, None).await?;

        match reply.status {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(reply.into_error()),
        }
    }

    /// Get repository permissions for a user.
    ///
    /// GitHub API docs: <https://docs.github.com/en/rest/collaborators/collaborators#get-repository-permissions-for-a-user>
    pub async fn permission(&self, id: &CollaboratorIdentity) -> Result<CollaboratorPermission> {
        let url = self.client.endpoint(&[
            "repos",
            &id.org,
            &id.repo,
            "collaborators",
            &id.username,
            "permission",
        ])?;
        let reply = self.client.send(Method::GET, url, None, None).await?;

        if reply.status == StatusCode::OK {
            reply.json()
        } else {
            Err(reply.into_error())
        }
    }

    /// Remove a collaborator; an absent grant is not an error.
    ///
    /// GitHub API docs: <https://docs.github.com/en/rest/collaborators/collaborators#remove-a-repository-collaborator>
    pub async fn revoke(&self, id: &CollaboratorIdentity) -> Result<()> {
        let url = self.collaborator_url(id)?;
        let reply = self.client.send(Method::DELETE, url, None, None).await?;

        if reply.status.is_success() || reply.status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(reply.into_error())
        }
    }
}
