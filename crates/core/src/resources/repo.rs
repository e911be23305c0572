//! Repository kind.

use serde::{Deserialize, Serialize};

use crate::condition::Conditions;
use crate::credentials::CredentialSelectors;
use crate::managed::path_segment;
use crate::meta::ObjectMeta;
use crate::result::Result;

/// Desired state of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default)]
    pub credentials: Option<CredentialSelectors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    /// Owning organization. Immutable.
    pub org: String,
    /// Repository name. Immutable.
    pub name: String,
    #[serde(default)]
    pub private: bool,
    /// Create the repository with an initial commit (default: true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialize: Option<bool>,
}

impl RepoSpec {
    #[must_use]
    pub fn initialize(&self) -> bool {
        self.initialize.unwrap_or(true)
    }

    pub fn identity(&self) -> Result<RepoIdentity> {
        Ok(RepoIdentity {
            org: path_segment("org", &self.org)?,
            name: path_segment("name", &self.name)?,
        })
    }

    fn identity_key(&self) -> [&str; 2] {
        [self.org.trim(), self.name.trim()]
    }

    fn external_name(&self) -> String {
        format!("{}/{}", self.org, self.name)
    }
}

/// Addresses a repository on GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIdentity {
    pub org: String,
    pub name: String,
}

/// Observed state of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStatus {
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
}

/// A declared GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    pub metadata: ObjectMeta,
    pub spec: RepoSpec,
    #[serde(default)]
    pub status: RepoStatus,
}

impl Repo {
    pub fn new(metadata: ObjectMeta, spec: RepoSpec) -> Self {
        Self {
            metadata,
            spec,
            status: RepoStatus::default(),
        }
    }
}

super::managed_kind!(Repo, "Repo", RepoSpec, RepoStatus);
