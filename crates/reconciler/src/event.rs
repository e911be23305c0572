//! Human-facing events about reconcile progress.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use ghp_core::ResourceKey;
use tracing::{info, warn};

/// Severity of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Normal,
    Warning,
}

/// Why an event was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventReason {
    CreatedExternalResource,
    UpdatedExternalResource,
    DeletedExternalResource,
    CannotConnectToProvider,
    CannotObserveExternalResource,
    CannotCreateExternalResource,
    CannotUpdateExternalResource,
    CannotDeleteExternalResource,
    /// Observed: the external resource was already there.
    AlreadyExists,
    /// Observed: the team already holds exactly the desired permission.
    AlreadyPermitted,
    /// Observed: the team lacks access or holds a different permission.
    NotPermitted,
}

impl EventReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedExternalResource => "CreatedExternalResource",
            Self::UpdatedExternalResource => "UpdatedExternalResource",
            Self::DeletedExternalResource => "DeletedExternalResource",
            Self::CannotConnectToProvider => "CannotConnectToProvider",
            Self::CannotObserveExternalResource => "CannotObserveExternalResource",
            Self::CannotCreateExternalResource => "CannotCreateExternalResource",
            Self::CannotUpdateExternalResource => "CannotUpdateExternalResource",
            Self::CannotDeleteExternalResource => "CannotDeleteExternalResource",
            Self::AlreadyExists => "AlreadyExists",
            Self::AlreadyPermitted => "AlreadyPermitted",
            Self::NotPermitted => "NotPermitted",
        }
    }
}

impl fmt::Display for EventReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event about one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_type: EventType,
    pub reason: EventReason,
    pub kind: &'static str,
    pub object: ResourceKey,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn normal(
        kind: &'static str,
        object: ResourceKey,
        reason: EventReason,
        message: impl Into<String>,
    ) -> Self {
        Self::new(EventType::Normal, kind, object, reason, message)
    }

    pub fn warning(
        kind: &'static str,
        object: ResourceKey,
        reason: EventReason,
        message: impl Into<String>,
    ) -> Self {
        Self::new(EventType::Warning, kind, object, reason, message)
    }

    fn new(
        event_type: EventType,
        kind: &'static str,
        object: ResourceKey,
        reason: EventReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            reason,
            kind,
            object,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Sink for [`Event`]s.
pub trait EventRecorder: Send + Sync {
    fn record(&self, event: Event);
}

/// Writes events to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRecorder;

impl EventRecorder for TracingRecorder {
    fn record(&self, event: Event) {
        match event.event_type {
            EventType::Normal => info!(
                kind = event.kind,
                resource = %event.object,
                reason = %event.reason,
                "{}",
                event.message
            ),
            EventType::Warning => warn!(
                kind = event.kind,
                resource = %event.object,
                reason = %event.reason,
                "{}",
                event.message
            ),
        }
    }
}

/// Keeps events in memory for inspection.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    events: Mutex<Vec<Event>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Reasons in recording order.
    pub fn reasons(&self) -> Vec<EventReason> {
        self.events().iter().map(|e| e.reason).collect()
    }
}

impl EventRecorder for MemoryRecorder {
    fn record(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
