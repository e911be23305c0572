//! Seams between the generic reconciler and a kind-specific adapter.
//!
//! A [`Connector`] turns a declared object into an authenticated
//! [`ExternalClient`]. The client is scoped to one reconcile pass and is
//! dropped when the pass ends.

use async_trait::async_trait;
use ghp_core::{Managed, Result};

use crate::types::ExternalObservation;

/// Kind-specific operations against the external system.
#[async_trait]
pub trait ExternalClient<R: Managed>: Send + Sync {
    /// Cheap existence check.
    async fn exists(&self, resource: &R) -> Result<bool>;

    /// Inspect the external resource. May record observed fields on the
    /// resource's status.
    async fn observe(&self, resource: &mut R) -> Result<ExternalObservation>;

    async fn create(&self, resource: &R) -> Result<()>;

    async fn update(&self, resource: &R) -> Result<()>;

    /// Remove the external resource. Absence counts as success.
    async fn delete(&self, resource: &R) -> Result<()>;
}

/// Builds an [`ExternalClient`] from a declared object's credentials.
#[async_trait]
pub trait Connector<R: Managed>: Send + Sync + 'static {
    type External: ExternalClient<R>;

    async fn connect(&self, resource: &R) -> Result<Self::External>;
}
