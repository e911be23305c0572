//! Storage of declared objects.
//!
//! The reconciler reads objects and writes back status only; specs are
//! owned by whoever applies the objects.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use ghp_core::{Error, Managed, ObjectMeta, ResourceKey, Result};
use itertools::Itertools;
use tokio::sync::{RwLock, watch};
use tracing::debug;

/// Declarative object storage for one kind.
#[async_trait]
pub trait ResourceStore<R: Managed>: Send + Sync {
    /// Fetch the latest copy of an object.
    async fn get(&self, key: &ResourceKey) -> Result<Option<R>>;

    /// Metadata of every tracked object.
    async fn list(&self) -> Result<Vec<ObjectMeta>>;

    /// Persist the status half of an object, leaving its spec untouched.
    async fn update_status(&self, resource: &R) -> Result<()>;

    /// Stop tracking an object whose external resource is gone.
    async fn release(&self, key: &ResourceKey) -> Result<()>;

    /// Receiver that changes whenever an object is added, changed or
    /// marked for deletion.
    fn watch(&self) -> watch::Receiver<u64>;
}

/// In-process [`ResourceStore`].
pub struct InMemoryStore<R: Managed> {
    objects: RwLock<BTreeMap<ResourceKey, R>>,
    revision: watch::Sender<u64>,
}

impl<R: Managed> InMemoryStore<R> {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            objects: RwLock::new(BTreeMap::new()),
            revision,
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Create or update an object from its declaration.
    ///
    /// Status and deletion state of an existing object are kept. The
    /// generation is bumped when the spec differs. A declaration that moves
    /// an existing object to another external identity is rejected and the
    /// stored object is left as it was.
    pub async fn apply(&self, mut resource: R) -> Result<()> {
        let key = resource.key();
        let mut objects = self.objects.write().await;

        let changed = match objects.get(&key) {
            Some(existing) => {
                if !existing.same_identity(&resource) {
                    return Err(Error::validation(format!(
                        "{} {key}: cannot change identity from '{}' to '{}'",
                        R::KIND,
                        existing.external_name(),
                        resource.external_name()
                    )));
                }
                let spec_changed = existing.spec() != resource.spec();
                let generation = existing.metadata().generation;
                resource.metadata_mut().generation = if spec_changed {
                    generation + 1
                } else {
                    generation
                };
                resource.metadata_mut().deletion_timestamp = existing.metadata().deletion_timestamp;
                *resource.status_mut() = existing.status().clone();
                spec_changed
            }
            None => {
                resource.metadata_mut().generation = 1;
                true
            }
        };

        objects.insert(key.clone(), resource);
        drop(objects);

        if changed {
            debug!(kind = R::KIND, resource = %key, "Applied object");
            self.bump();
        }
        Ok(())
    }

    /// Mark an object for deletion. Returns false when it is not tracked.
    pub async fn request_deletion(&self, key: &ResourceKey) -> bool {
        let mut objects = self.objects.write().await;
        let Some(object) = objects.get_mut(key) else {
            return false;
        };
        if object.metadata().deletion_timestamp.is_some() {
            return true;
        }

        let meta = object.metadata_mut();
        meta.deletion_timestamp = Some(Utc::now());
        meta.generation += 1;
        drop(objects);

        debug!(kind = R::KIND, resource = %key, "Deletion requested");
        self.bump();
        true
    }

    /// Keys of every tracked object.
    pub async fn keys(&self) -> Vec<ResourceKey> {
        self.objects.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}

impl<R: Managed> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Managed> ResourceStore<R> for InMemoryStore<R> {
    async fn get(&self, key: &ResourceKey) -> Result<Option<R>> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn list(&self) -> Result<Vec<ObjectMeta>> {
        Ok(self
            .objects
            .read()
            .await
            .values()
            .map(|r| r.metadata().clone())
            .collect_vec())
    }

    async fn update_status(&self, resource: &R) -> Result<()> {
        let key = resource.key();
        let mut objects = self.objects.write().await;
        let stored = objects
            .get_mut(&key)
            .ok_or_else(|| Error::store(format!("{} {key} is no longer tracked", R::KIND)))?;
        *stored.status_mut() = resource.status().clone();
        Ok(())
    }

    async fn release(&self, key: &ResourceKey) -> Result<()> {
        let removed = self.objects.write().await.remove(key);
        if removed.is_some() {
            debug!(kind = R::KIND, resource = %key, "Released object");
        }
        Ok(())
    }

    fn watch(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghp_core::{Condition, ConditionType, Repo, RepoSpec};

    fn repo(name: &str, private: bool) -> Repo {
        Repo::new(
            ObjectMeta::new("default", name),
            RepoSpec {
                org: "acme".into(),
                name: name.into(),
                private,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_apply_sets_first_generation() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let store = InMemoryStore::new();
        store.apply(repo("widgets", false)).await?;

        let stored = store.get(&ResourceKey::new("default", "widgets")).await?;
        assert_eq!(stored.map(|r| r.metadata.generation), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_reapply_keeps_status_and_bumps_generation_on_change()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = InMemoryStore::new();
        let key = ResourceKey::new("default", "widgets");
        store.apply(repo("widgets", false)).await?;

        let mut observed = repo("widgets", false);
        observed.set_conditions([Condition::available()]);
        store.update_status(&observed).await?;

        store.apply(repo("widgets", false)).await?;
        let unchanged = store.get(&key).await?;
        assert_eq!(unchanged.as_ref().map(|r| r.metadata.generation), Some(1));

        store.apply(repo("widgets", true)).await?;
        let changed = store.get(&key).await?;
        assert_eq!(changed.as_ref().map(|r| r.metadata.generation), Some(2));
        assert!(
            changed
                .as_ref()
                .and_then(|r| r.condition(ConditionType::Ready))
                .is_some()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_leaves_spec_alone()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = InMemoryStore::new();
        let key = ResourceKey::new("default", "widgets");
        store.apply(repo("widgets", false)).await?;

        let mut stale = repo("widgets", true);
        stale.status.url = Some("https://github.com/acme/widgets".into());
        store.update_status(&stale).await?;

        let stored = store.get(&key).await?;
        assert_eq!(stored.as_ref().map(|r| r.spec.private), Some(false));
        assert_eq!(
            stored.and_then(|r| r.status.url),
            Some("https://github.com/acme/widgets".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_of_untracked_is_store_error() {
        let store = InMemoryStore::<Repo>::new();
        let result = store.update_status(&repo("ghost", false)).await;
        assert!(matches!(result, Err(Error::Store { .. })));
    }

    #[tokio::test]
    async fn test_request_deletion_survives_reapply()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = InMemoryStore::new();
        let key = ResourceKey::new("default", "widgets");
        store.apply(repo("widgets", false)).await?;

        assert!(store.request_deletion(&key).await);
        store.apply(repo("widgets", false)).await?;

        let stored = store.get(&key).await?;
        assert!(stored.is_some_and(|r| r.deletion_requested()));
        assert!(!store.request_deletion(&ResourceKey::new("default", "ghost")).await);
        Ok(())
    }

    #[tokio::test]
    async fn test_watch_sees_changes() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = InMemoryStore::new();
        let mut watch = store.watch();

        store.apply(repo("widgets", false)).await?;
        assert!(watch.has_changed().unwrap_or(false));
        watch.borrow_and_update();

        store.apply(repo("widgets", false)).await?;
        assert!(!watch.has_changed().unwrap_or(true));
        Ok(())
    }

    #[tokio::test]
    async fn test_identity_change_is_rejected_and_stored_object_kept()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = InMemoryStore::new();
        let key = ResourceKey::new("default", "widgets");
        store.apply(repo("widgets", false)).await?;
        let mut watch = store.watch();
        watch.borrow_and_update();

        let mut renamed = repo("widgets", false);
        renamed.spec.name = "gadgets".into();
        let result = store.apply(renamed).await;

        assert!(matches!(result, Err(Error::Validation { .. })));
        let stored = store.get(&key).await?;
        assert_eq!(
            stored.as_ref().map(|r| r.spec.name.as_str()),
            Some("widgets")
        );
        assert_eq!(stored.map(|r| r.metadata.generation), Some(1));
        assert!(!watch.has_changed().unwrap_or(true));
        Ok(())
    }

    #[tokio::test]
    async fn test_release_removes() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = InMemoryStore::new();
        let key = ResourceKey::new("default", "widgets");
        store.apply(repo("widgets", false)).await?;

        store.release(&key).await?;
        assert!(store.get(&key).await?.is_none());
        assert!(store.is_empty().await);
        Ok(())
    }
}
