//! Repository endpoints.

use ghp_core::RepoIdentity;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;

/// Subset of the repository document the provider reports back.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub private: bool,
}

/// Body of the create-repository call.
#[derive(Debug, Clone, Serialize)]
pub struct NewRepo<'a> {
    pub name: &'a str,
    pub private: bool,
    pub auto_init: bool,
}

/// Provides methods for creating, reading and deleting repositories.
#[derive(Debug, Clone, Copy)]
pub struct RepoService<'a> {
    client: &'a Client,
}

impl<'a> RepoService<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetch a repository, `None` when it does not exist.
    ///
    /// GitHub API docs: <https://docs.github.com/en/rest/repos/repos#get-a-repository>
    pub async fn get(&self, id: &RepoIdentity) -> Result<Option<RepoInfo>> {
        let url = self.client.endpoint(&["repos", &id.org, &id.name])?;
        let reply = self.client.send(Method::GET, url, None, None).await?;

        match reply.status {
            StatusCode::OK => reply.json().map(Some),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(reply.into_error()),
        }
    }

    pub async fn exists(&self, id: &RepoIdentity) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }

    /// Create a repository in an organization.
    ///
    /// GitHub API docs: <https://docs.github.com/en/rest/repos/repos#create-an-organization-repository>
    pub async fn create(&self, org: &str, repo: &NewRepo<'_>) -> Result<()> {
        let url = self.client.endpoint(&["orgs", org, "repos"])?;
        let body = serde_json::to_value(repo)
            .map_err(|e| crate::error::Error::config_error(e.to_string()))?;
        let reply = self.client.send(Method::POST, url, Some(body), None).await?;

        if reply.status.is_success() {
            Ok(())
        } else {
            Err(reply.into_error())
        }
    }

    /// Delete a repository; an already missing repository is not an error.
    ///
    /// Deleting a repository requires admin access. If OAuth is used, the
    /// `delete_repo` scope is required.
    pub async fn delete(&self, id: &RepoIdentity) -> Result<()> {
        let url = self.client.endpoint(&["repos", &id.org, &id.name])?;
        let reply = self.client.send(Method::DELETE, url, None, None).await?;

        if reply.status.is_success() || reply.status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(reply.into_error())
        }
    }
}
