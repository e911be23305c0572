//! Team repository permission endpoints.

use std::collections::BTreeMap;

use ghp_core::TeamRepoIdentity;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::client::Client;
use crate::error::{Error, Result};

/// Permission name to granted flag, as reported for a team on a repository.
pub type PermissionSet = BTreeMap<String, bool>;

const REPOSITORY_MEDIA_TYPE: &str = "application/vnd.github.v3.repository+json";

/// Permissions of a team on one repository.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamRepoPermissions {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub permissions: PermissionSet,
    #[serde(default)]
    pub role_name: Option<String>,
}

/// Reads an explicit `null` the same as an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<PermissionSet, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PermissionSet>::deserialize(deserializer)?.unwrap_or_default())
}

/// Provides methods for granting, reading and revoking team permissions.
#[derive(Debug, Clone, Copy)]
pub struct TeamRepoService<'a> {
    client: &'a Client,
}

impl<'a> TeamRepoService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn binding_url(&self, id: &TeamRepoIdentity) -> Result<Url> {
        self.client.endpoint(&[
            "orgs",
            &id.org,
            "teams",
            &id.team_slug,
            "repos",
            &id.owner,
            &id.repo,
        ])
    }

    /// Add or update team repository permissions. `org` must be an
    /// organization.
    ///
    /// GitHub API docs: <https://docs.github.com/en/rest/teams/teams#add-or-update-team-repository-permissions>
    pub async fn grant(&self, id: &TeamRepoIdentity, permission: &str) -> Result<()> {
        if !self.client.is_org(&id.org).await? {
            return Err(Error::not_organization(&id.org));
        }

        let url = self.binding_url(id)?;
        let body = serde_json::json!({ "permission": permission });
        let reply = self.client.send(Method::PUT, url, Some(body), None).await?;

        if reply.status.is_success() {
            Ok(())
        } else {
            Err(reply.into_error())
        }
    }

    /// Check team permissions for a repository.
    ///
    /// A missing binding (or a missing repository) yields an empty
    /// permission set rather than an error.
    ///
    /// GitHub API docs: <https://docs.github.com/en/rest/teams/teams#check-team-permissions-for-a-repository>
    pub async fn permissions(&self, id: &TeamRepoIdentity) -> Result<TeamRepoPermissions> {
        let url = self.binding_url(id)?;
        let reply = self
            .client
            .send(Method::GET, url, None, Some(REPOSITORY_MEDIA_TYPE))
            .await?;

        match reply.status {
            StatusCode::OK => reply.json(),
            StatusCode::NOT_FOUND => Ok(TeamRepoPermissions::default()),
            _ => Err(reply.into_error()),
        }
    }

    /// Remove a repository from a team; an absent binding is not an error.
    ///
    /// GitHub API docs: <https://docs.github.com/en/rest/teams/teams#remove-a-repository-from-a-team>
    pub async fn revoke(&self, id: &TeamRepoIdentity) -> Result<()> {
        let url = self.binding_url(id)?;
        let reply = self.client.send(Method::DELETE, url, None, None).await?;

        if reply.status.is_success() || reply.status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(reply.into_error())
        }
    }
}
