//! Manifest resync: edits to the file reach the stores on the next period.

// Integration tests allow unwrap/panic for assertions
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use ghp_controllers::Stores;
use ghp_core::{Managed, ResourceKey};
use ghp_reconciler::{ResourceStore, ShutdownCoordinator, ShutdownSignal};
use github_provider::manifest::{self, Manifest};

const REPO: &str = "kind: Repo
metadata:
  name: widgets
spec:
  org: acme
  name: widgets
";

const REPO_RENAMED: &str = "kind: Repo
metadata:
  name: widgets
spec:
  org: acme
  name: gadgets
";

const COLLABORATOR: &str = "kind: Collaborator
metadata:
  name: bob
spec:
  org: acme
  repo: widgets
  username: bob
  permission: push
";

#[tokio::test]
async fn given_object_removed_from_manifest_when_resynced_then_deletion_requested() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("objects.yaml");
    std::fs::write(&path, format!("{REPO}---\n{COLLABORATOR}")).unwrap();

    let stores = Stores::new();
    Manifest::load(&path).await.unwrap().apply(&stores).await;
    assert_eq!(stores.repos.len().await, 1);
    assert_eq!(stores.collaborators.len().await, 1);

    let shutdown = ShutdownCoordinator::shared();
    let sync = tokio::spawn(manifest::sync_loop(
        path.clone(),
        stores.clone(),
        Duration::from_millis(50),
        shutdown.clone(),
    ));

    std::fs::write(&path, REPO).unwrap();

    let key = ResourceKey::new("default", "bob");
    let mut marked = false;
    for _ in 0..100 {
        let bob = stores.collaborators.get(&key).await.unwrap();
        if bob.is_some_and(|c| c.deletion_requested()) {
            marked = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(marked, "collaborator was never marked for deletion");

    let widgets = stores
        .repos
        .get(&ResourceKey::new("default", "widgets"))
        .await
        .unwrap();
    assert!(widgets.is_some_and(|r| !r.deletion_requested()));

    shutdown.initiate_shutdown(ShutdownSignal::Programmatic);
    tokio::time::timeout(Duration::from_secs(2), sync)
        .await
        .expect("sync loop stops")
        .unwrap();
}

#[tokio::test]
async fn given_broken_manifest_when_resynced_then_stores_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("objects.yaml");
    std::fs::write(&path, COLLABORATOR).unwrap();

    let stores = Stores::new();
    Manifest::load(&path).await.unwrap().apply(&stores).await;

    let shutdown = ShutdownCoordinator::shared();
    let sync = tokio::spawn(manifest::sync_loop(
        path.clone(),
        stores.clone(),
        Duration::from_millis(20),
        shutdown.clone(),
    ));

    std::fs::write(&path, "kind: Collaborator\nmetadata: [not, a, map]\n").unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let bob = stores
        .collaborators
        .get(&ResourceKey::new("default", "bob"))
        .await
        .unwrap();
    assert!(bob.is_some_and(|c| !c.deletion_requested()));

    shutdown.initiate_shutdown(ShutdownSignal::Programmatic);
    sync.await.unwrap();
}

#[tokio::test]
async fn given_identity_changed_in_manifest_when_applied_then_rejected_and_original_kept() {
    let stores = Stores::new();
    let first = Manifest::parse(REPO).unwrap().apply(&stores).await;
    assert_eq!(first.applied, 1);

    let summary = Manifest::parse(REPO_RENAMED).unwrap().apply(&stores).await;

    assert_eq!(summary.applied, 0);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.deletions_requested, 0);

    let widgets = stores
        .repos
        .get(&ResourceKey::new("default", "widgets"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(widgets.spec.name, "widgets");
    assert_eq!(widgets.metadata.generation, 1);
    assert!(!widgets.deletion_requested());
}
