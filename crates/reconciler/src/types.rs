//! Core types for the reconciler.

use std::fmt;

use ghp_core::Error;

use crate::event::EventReason;

/// What an adapter saw when it looked at the external resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalObservation {
    /// The external resource exists.
    pub resource_exists: bool,
    /// The external resource matches the desired spec. Only meaningful when
    /// `resource_exists` is true.
    pub resource_up_to_date: bool,
    /// Normal event the reconciler records on the adapter's behalf.
    pub note: Option<ObservationNote>,
}

/// An adapter-specific remark about what was observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationNote {
    pub reason: EventReason,
    pub message: String,
}

impl ExternalObservation {
    /// The external resource is absent.
    #[must_use]
    pub const fn missing() -> Self {
        Self {
            resource_exists: false,
            resource_up_to_date: true,
            note: None,
        }
    }

    /// Nothing was found, and what would be created is not known to match.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            resource_exists: false,
            resource_up_to_date: false,
            note: None,
        }
    }

    /// The external resource exists and matches the spec.
    #[must_use]
    pub const fn up_to_date() -> Self {
        Self {
            resource_exists: true,
            resource_up_to_date: true,
            note: None,
        }
    }

    /// The external resource exists but has drifted.
    #[must_use]
    pub const fn drifted() -> Self {
        Self {
            resource_exists: true,
            resource_up_to_date: false,
            note: None,
        }
    }

    /// Attach a note to be recorded as a normal event.
    #[must_use]
    pub fn with_note(mut self, reason: EventReason, message: impl Into<String>) -> Self {
        self.note = Some(ObservationNote {
            reason,
            message: message.into(),
        });
        self
    }
}

/// Result of one reconcile pass over a single resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing to do, the external resource already matches.
    UpToDate,
    /// The external resource was created.
    Created,
    /// The external resource was brought back in line with the spec.
    Updated,
    /// The external resource was deleted and the object released.
    Released,
    /// The object is no longer tracked.
    NotFound,
    /// The pass was aborted.
    Failed(Error),
}

impl ReconcileOutcome {
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// No further passes are needed for this object.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Released | Self::NotFound)
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate => write!(f, "up-to-date"),
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Released => write!(f, "released"),
            Self::NotFound => write!(f, "not-found"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}
