//! Team repository permission kind.

use serde::{Deserialize, Serialize};

use crate::condition::Conditions;
use crate::credentials::CredentialSelectors;
use crate::managed::path_segment;
use crate::meta::ObjectMeta;
use crate::result::Result;

/// Desired permission of a team on a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRepoSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default)]
    pub credentials: Option<CredentialSelectors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    /// Organization owning the team. Not case sensitive on GitHub.
    pub org: String,
    pub team_slug: String,
    /// Account owning the repository.
    pub owner: String,
    pub repo: String,
    pub permission: String,
}

impl TeamRepoSpec {
    pub fn identity(&self) -> Result<TeamRepoIdentity> {
        Ok(TeamRepoIdentity {
            org: path_segment("org", &self.org)?,
            team_slug: path_segment("teamSlug", &self.team_slug)?,
            owner: path_segment("owner", &self.owner)?,
            repo: path_segment("repo", &self.repo)?,
        })
    }

    fn identity_key(&self) -> [&str; 4] {
        [
            self.org.trim(),
            self.team_slug.trim(),
            self.owner.trim(),
            self.repo.trim(),
        ]
    }

    fn external_name(&self) -> String {
        format!(
            "{}/{} on {}/{}",
            self.org, self.team_slug, self.owner, self.repo
        )
    }
}

/// Addresses a team/repository binding on GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRepoIdentity {
    pub org: String,
    pub team_slug: String,
    pub owner: String,
    pub repo: String,
}

/// Observed state of a team/repository binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRepoStatus {
    #[serde(default)]
    pub conditions: Conditions,
    /// Role name GitHub reports for the binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
}

/// A declared team permission on a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRepo {
    pub metadata: ObjectMeta,
    pub spec: TeamRepoSpec,
    #[serde(default)]
    pub status: TeamRepoStatus,
}

impl TeamRepo {
    pub fn new(metadata: ObjectMeta, spec: TeamRepoSpec) -> Self {
        Self {
            metadata,
            spec,
            status: TeamRepoStatus::default(),
        }
    }
}

super::managed_kind!(TeamRepo, "TeamRepo", TeamRepoSpec, TeamRepoStatus);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managed::Managed;

    #[test]
    fn test_external_name_and_identity() {
        let team_repo = TeamRepo::new(
            ObjectMeta::new("default", "platform-widgets"),
            TeamRepoSpec {
                org: "acme".into(),
                team_slug: "platform".into(),
                owner: "acme".into(),
                repo: "widgets".into(),
                permission: "maintain".into(),
                verbose: Some(true),
                ..Default::default()
            },
        );

        assert_eq!(team_repo.external_name(), "acme/platform on acme/widgets");
        assert!(team_repo.verbose());
        let identity = team_repo.spec.identity().ok();
        assert_eq!(identity.map(|i| i.team_slug), Some("platform".to_string()));
    }
}
