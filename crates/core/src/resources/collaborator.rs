//! Repository collaborator kind.

use serde::{Deserialize, Serialize};

use crate::condition::Conditions;
use crate::credentials::CredentialSelectors;
use crate::managed::path_segment;
use crate::meta::ObjectMeta;
use crate::result::Result;

/// Desired grant of a user on a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default)]
    pub credentials: Option<CredentialSelectors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    pub org: String,
    pub repo: String,
    /// GitHub handle of the user.
    pub username: String,
    /// `pull`, `triage`, `push`, `maintain`, `admin` or a custom role name.
    pub permission: String,
}

impl CollaboratorSpec {
    pub fn identity(&self) -> Result<CollaboratorIdentity> {
        Ok(CollaboratorIdentity {
            org: path_segment("org", &self.org)?,
            repo: path_segment("repo", &self.repo)?,
            username: path_segment("username", &self.username)?,
        })
    }

    fn identity_key(&self) -> [&str; 3] {
        [self.org.trim(), self.repo.trim(), self.username.trim()]
    }

    fn external_name(&self) -> String {
        format!("{}/{}/{}", self.org, self.repo, self.username)
    }
}

/// Addresses a collaborator grant on GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorIdentity {
    pub org: String,
    pub repo: String,
    pub username: String,
}

/// Observed state of a collaborator grant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorStatus {
    #[serde(default)]
    pub conditions: Conditions,
    /// Permission currently granted on GitHub.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}

/// A declared repository collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub metadata: ObjectMeta,
    pub spec: CollaboratorSpec,
    #[serde(default)]
    pub status: CollaboratorStatus,
}

impl Collaborator {
    pub fn new(metadata: ObjectMeta, spec: CollaboratorSpec) -> Self {
        Self {
            metadata,
            spec,
            status: CollaboratorStatus::default(),
        }
    }
}

super::managed_kind!(Collaborator, "Collaborator", CollaboratorSpec, CollaboratorStatus);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialSelectors;
    use crate::managed::Managed;

    #[test]
    fn test_deserialize_camel_case_manifest() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let yaml = r"
metadata:
  name: bob-widgets
spec:
  credentials:
    secretRef:
      namespace: default
      name: github
      key: token
  org: acme
  repo: widgets
  username: bob
  permission: push
";
        let collaborator: Collaborator = serde_yaml::from_str(yaml)?;

        assert_eq!(collaborator.external_name(), "acme/widgets/bob");
        assert_eq!(
            collaborator.spec.credentials,
            Some(CredentialSelectors::secret("default", "github", "token"))
        );
        assert!(!collaborator.verbose());
        assert!(collaborator.api_url().is_none());
        assert!(collaborator.status.conditions.is_empty());
        Ok(())
    }

    #[test]
    fn test_identity_trims_fields() {
        let spec = CollaboratorSpec {
            org: "acme ".into(),
            repo: "widgets".into(),
            username: " bob".into(),
            permission: "push".into(),
            ..Default::default()
        };
        let identity = spec.identity().ok();
        assert_eq!(identity.map(|i| i.username), Some("bob".to_string()));
    }
}
