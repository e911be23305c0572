//! Declared objects read from a YAML manifest.
//!
//! The manifest is a multi-document YAML file; every document carries a
//! `kind` of `Repo`, `Collaborator` or `TeamRepo`, a `metadata` block and a
//! `spec`. Objects that disappear from the manifest are marked for deletion.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ghp_controllers::Stores;
use ghp_core::{Collaborator, Managed, Repo, ResourceKey, TeamRepo};
use ghp_reconciler::{InMemoryStore, ShutdownCoordinator};
use serde::Deserialize;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Manifest loading errors.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest document {index}: {source}")]
    Parse {
        index: usize,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{kind} {key} is declared more than once")]
    Duplicate { kind: &'static str, key: ResourceKey },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind")]
enum Document {
    Repo(Repo),
    Collaborator(Collaborator),
    TeamRepo(TeamRepo),
}

/// Every object declared in one manifest, grouped by kind.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub repos: Vec<Repo>,
    pub collaborators: Vec<Collaborator>,
    pub team_repos: Vec<TeamRepo>,
}

impl Manifest {
    /// Parse a multi-document YAML manifest. Empty documents are skipped.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut manifest = Self::default();

        for (index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
            let value = serde_yaml::Value::deserialize(document)
                .map_err(|source| ManifestError::Parse { index, source })?;
            if value.is_null() {
                continue;
            }

            match serde_yaml::from_value(value)
                .map_err(|source| ManifestError::Parse { index, source })?
            {
                Document::Repo(repo) => manifest.repos.push(repo),
                Document::Collaborator(collaborator) => manifest.collaborators.push(collaborator),
                Document::TeamRepo(team_repo) => manifest.team_repos.push(team_repo),
            }
        }

        check_unique(&manifest.repos)?;
        check_unique(&manifest.collaborators)?;
        check_unique(&manifest.team_repos)?;
        Ok(manifest)
    }

    pub async fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ManifestError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&text)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.repos.len() + self.collaborators.len() + self.team_repos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply every object to its store and request deletion of tracked
    /// objects no longer declared. Objects whose identity differs from the
    /// tracked copy are skipped and counted as rejected.
    pub async fn apply(self, stores: &Stores) -> ApplySummary {
        let mut summary = ApplySummary::default();
        apply_kind(&stores.repos, self.repos, &mut summary).await;
        apply_kind(&stores.collaborators, self.collaborators, &mut summary).await;
        apply_kind(&stores.team_repos, self.team_repos, &mut summary).await;
        summary
    }
}

/// Counts from one [`Manifest::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub applied: usize,
    pub rejected: usize,
    pub deletions_requested: usize,
}

fn check_unique<R: Managed>(objects: &[R]) -> Result<(), ManifestError> {
    let mut seen = BTreeSet::new();
    for object in objects {
        let key = object.key();
        if !seen.insert(key.clone()) {
            return Err(ManifestError::Duplicate { kind: R::KIND, key });
        }
    }
    Ok(())
}

async fn apply_kind<R: Managed>(
    store: &InMemoryStore<R>,
    objects: Vec<R>,
    summary: &mut ApplySummary,
) {
    let declared: BTreeSet<ResourceKey> = objects.iter().map(Managed::key).collect();

    for object in objects {
        let key = object.key();
        match store.apply(object).await {
            Ok(()) => summary.applied += 1,
            Err(e) => {
                warn!(kind = R::KIND, resource = %key, error = %e, "Declaration rejected");
                summary.rejected += 1;
            }
        }
    }

    for key in store.keys().await {
        if !declared.contains(&key) && store.request_deletion(&key).await {
            debug!(kind = R::KIND, resource = %key, "No longer declared");
            summary.deletions_requested += 1;
        }
    }
}

/// Re-read the manifest every `period` until shutdown. A manifest that fails
/// to load leaves the stores untouched.
pub async fn sync_loop(
    path: PathBuf,
    stores: Stores,
    period: Duration,
    shutdown: Arc<ShutdownCoordinator>,
) {
    let mut ticker = tokio::time::interval(period.max(Duration::from_millis(10)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick is immediate; startup has already applied the manifest.
    ticker.tick().await;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match Manifest::load(&path).await {
            Ok(manifest) => {
                let summary = manifest.apply(&stores).await;
                info!(
                    path = %path.display(),
                    applied = summary.applied,
                    rejected = summary.rejected,
                    deletions_requested = summary.deletions_requested,
                    "Manifest resynced"
                );
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Manifest resync failed, keeping previous state"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghp_reconciler::ResourceStore;

    const MANIFEST: &str = r"
apiVersion: github.krateo.io/v1alpha1
kind: Repo
metadata:
  name: widgets
spec:
  org: acme
  name: widgets
  private: true
  credentials:
    secretRef:
      namespace: default
      name: github-creds
      key: token
---
kind: Collaborator
metadata:
  name: bob
  namespace: team-a
spec:
  org: acme
  repo: widgets
  username: bob
  permission: push
---
kind: TeamRepo
metadata:
  name: core-widgets
spec:
  apiUrl: https://ghe.example.com/api/v3
  verbose: true
  org: acme
  teamSlug: core
  owner: acme
  repo: widgets
  permission: maintain
---
";

    #[test]
    fn test_parse_groups_by_kind() -> Result<(), Box<dyn std::error::Error>> {
        let manifest = Manifest::parse(MANIFEST)?;

        assert_eq!(manifest.len(), 3);
        let repo = manifest.repos.first().ok_or("no repo")?;
        assert!(repo.spec.private);
        assert!(repo.spec.initialize());
        assert!(repo.secret_ref().is_some());

        let collaborator = manifest.collaborators.first().ok_or("no collaborator")?;
        assert_eq!(collaborator.metadata.namespace, "team-a");

        let team_repo = manifest.team_repos.first().ok_or("no team repo")?;
        assert_eq!(team_repo.api_url(), Some("https://ghe.example.com/api/v3"));
        assert!(team_repo.verbose());
        Ok(())
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = Manifest::parse("kind: Gist\nmetadata:\n  name: x\nspec: {}\n");
        assert!(matches!(result, Err(ManifestError::Parse { index: 0, .. })));
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let doc = "kind: Repo\nmetadata:\n  name: widgets\nspec:\n  org: acme\n  name: widgets\n";
        let result = Manifest::parse(&format!("{doc}---\n{doc}"));
        assert!(matches!(
            result,
            Err(ManifestError::Duplicate { kind: "Repo", .. })
        ));
    }

    #[tokio::test]
    async fn test_apply_marks_undeclared_for_deletion()
    -> Result<(), Box<dyn std::error::Error>> {
        let stores = Stores::new();

        let first = Manifest::parse(MANIFEST)?.apply(&stores).await;
        assert_eq!(
            first,
            ApplySummary {
                applied: 3,
                rejected: 0,
                deletions_requested: 0
            }
        );

        let only_repo = Manifest::parse(MANIFEST.split("---").next().ok_or("empty")?)?;
        let second = only_repo.apply(&stores).await;
        assert_eq!(second.deletions_requested, 2);

        let bob = stores
            .collaborators
            .get(&ResourceKey::new("team-a", "bob"))
            .await?;
        assert!(bob.is_some_and(|c| c.deletion_requested()));
        let widgets = stores
            .repos
            .get(&ResourceKey::new("default", "widgets"))
            .await?;
        assert!(widgets.is_some_and(|r| !r.deletion_requested()));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let result = Manifest::load(Path::new("/nonexistent/objects.yaml")).await;
        assert!(matches!(result, Err(ManifestError::Io { .. })));
    }
}
