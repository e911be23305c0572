//! Reconciler implementation.
//!
//! One call to [`Reconciler::reconcile`] is one pass over one object:
//! fetch it, connect, observe, act, then write back status. Errors never
//! escape a pass; they become conditions, events and a failed outcome.

use std::sync::Arc;

use ghp_core::{Condition, Error, Managed, ResourceKey, ResultExt};
use tracing::{debug, info, warn};

use crate::event::{Event, EventReason, EventRecorder, TracingRecorder};
use crate::external::{Connector, ExternalClient};
use crate::store::ResourceStore;
use crate::types::ReconcileOutcome;

/// Observe/act reconciler for one managed kind.
pub struct Reconciler<R: Managed, C: Connector<R>> {
    connector: C,
    store: Arc<dyn ResourceStore<R>>,
    recorder: Arc<dyn EventRecorder>,
}

impl<R: Managed, C: Connector<R>> Reconciler<R, C> {
    pub fn new(
        connector: C,
        store: Arc<dyn ResourceStore<R>>,
        recorder: Arc<dyn EventRecorder>,
    ) -> Self {
        Self {
            connector,
            store,
            recorder,
        }
    }

    pub fn store(&self) -> &Arc<dyn ResourceStore<R>> {
        &self.store
    }

    /// Run one pass over the object stored under `key`.
    pub async fn reconcile(&self, key: &ResourceKey) -> ReconcileOutcome {
        let mut resource = match self.store.get(key).await {
            Ok(Some(resource)) => resource,
            Ok(None) => {
                debug!(kind = R::KIND, resource = %key, "Object no longer tracked");
                return ReconcileOutcome::NotFound;
            }
            Err(e) => {
                warn!(kind = R::KIND, resource = %key, error = %e, "Cannot read object");
                return ReconcileOutcome::Failed(e);
            }
        };

        debug!(
            kind = R::KIND,
            resource = %key,
            external = %resource.external_name(),
            generation = resource.metadata().generation,
            "Reconciling"
        );

        let outcome = if resource.deletion_requested() {
            self.finalize(&mut resource).await
        } else {
            self.converge(&mut resource).await
        };

        if outcome.is_terminal() {
            return outcome;
        }

        match self
            .store
            .update_status(&resource)
            .await
            .inspect_error(|e| warn!(kind = R::KIND, resource = %key, error = %e, "Cannot persist status"))
        {
            Ok(()) => outcome,
            Err(e) => ReconcileOutcome::Failed(e),
        }
    }

    async fn converge(&self, resource: &mut R) -> ReconcileOutcome {
        let external = match self.connector.connect(resource).await {
            Ok(external) => external,
            Err(e) => return self.fail(resource, EventReason::CannotConnectToProvider, e),
        };

        let mut observation = match external.observe(resource).await {
            Ok(observation) => observation,
            Err(e) => return self.fail(resource, EventReason::CannotObserveExternalResource, e),
        };
        if let Some(note) = observation.note.take() {
            debug!(kind = R::KIND, resource = %resource.key(), reason = %note.reason, "{}", note.message);
            self.recorder
                .record(Event::normal(R::KIND, resource.key(), note.reason, note.message));
        }

        if !observation.resource_exists {
            resource.set_conditions([Condition::creating()]);
            if let Err(e) = external.create(resource).await {
                return self.fail(resource, EventReason::CannotCreateExternalResource, e);
            }

            resource.set_conditions([
                Condition::created(),
                Condition::available(),
                Condition::reconcile_success(),
            ]);
            self.succeed(resource, EventReason::CreatedExternalResource, "created");
            return ReconcileOutcome::Created;
        }

        if !observation.resource_up_to_date {
            if let Err(e) = external.update(resource).await {
                return self.fail(resource, EventReason::CannotUpdateExternalResource, e);
            }

            // Readiness is confirmed by the next observation.
            resource.set_conditions([
                Condition::unavailable("Updated", "waiting for the next observation"),
                Condition::reconcile_success(),
            ]);
            self.succeed(resource, EventReason::UpdatedExternalResource, "updated");
            return ReconcileOutcome::Updated;
        }

        resource.set_conditions([Condition::available(), Condition::reconcile_success()]);
        debug!(kind = R::KIND, resource = %resource.key(), "Up to date");
        ReconcileOutcome::UpToDate
    }

    async fn finalize(&self, resource: &mut R) -> ReconcileOutcome {
        resource.set_conditions([Condition::deleting()]);

        let external = match self.connector.connect(resource).await {
            Ok(external) => external,
            Err(e) => return self.fail(resource, EventReason::CannotConnectToProvider, e),
        };

        if let Err(e) = external.delete(resource).await {
            return self.fail(resource, EventReason::CannotDeleteExternalResource, e);
        }

        self.succeed(resource, EventReason::DeletedExternalResource, "deleted");

        let key = resource.key();
        match self.store.release(&key).await {
            Ok(()) => ReconcileOutcome::Released,
            Err(e) => {
                warn!(kind = R::KIND, resource = %key, error = %e, "Cannot release object");
                resource.set_conditions([Condition::reconcile_error(e.to_string())]);
                ReconcileOutcome::Failed(e)
            }
        }
    }

    fn succeed(&self, resource: &R, reason: EventReason, verb: &str) {
        let message = format!("{} '{}' {verb}", R::KIND, resource.external_name());
        info!(kind = R::KIND, resource = %resource.key(), reason = %reason, "{message}");
        self.recorder
            .record(Event::normal(R::KIND, resource.key(), reason, message));
    }

    fn fail(&self, resource: &mut R, reason: EventReason, error: Error) -> ReconcileOutcome {
        let message = error.to_string();
        warn!(
            kind = R::KIND,
            resource = %resource.key(),
            reason = %reason,
            class = error.class(),
            error = %message,
            "Reconcile failed"
        );

        resource.set_conditions([
            Condition::unavailable(error.class(), message.clone()),
            Condition::reconcile_error(message.clone()),
        ]);
        self.recorder
            .record(Event::warning(R::KIND, resource.key(), reason, message));
        ReconcileOutcome::Failed(error)
    }
}

/// Builder for [`Reconciler`].
pub struct ReconcilerBuilder<R: Managed, C: Connector<R>> {
    connector: C,
    store: Option<Arc<dyn ResourceStore<R>>>,
    recorder: Option<Arc<dyn EventRecorder>>,
}

impl<R: Managed, C: Connector<R>> ReconcilerBuilder<R, C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            store: None,
            recorder: None,
        }
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ResourceStore<R>>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the event sink. Defaults to [`TracingRecorder`].
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn EventRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn build(self) -> ghp_core::Result<Reconciler<R, C>> {
        let store = self
            .store
            .ok_or_else(|| Error::validation(format!("{} reconciler needs a store", R::KIND)))?;
        let recorder = self
            .recorder
            .unwrap_or_else(|| Arc::new(TracingRecorder));

        Ok(Reconciler::new(self.connector, store, recorder))
    }
}
