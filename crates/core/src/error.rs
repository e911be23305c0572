//! Error taxonomy shared by every reconcile step.
//!
//! Nothing here is fatal to the process: each variant aborts one reconcile
//! attempt and ends up in the resource's `Ready` condition, using
//! [`Error::class`] as the condition reason.

use thiserror::Error;

/// Core error type for provider operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The declared object cannot be acted on (missing credential
    /// reference, malformed identity). Raised before any remote call.
    #[error("invalid resource: {reason}")]
    Validation { reason: String },

    /// A remote precondition does not hold (owner is not an organization).
    /// Raised before any mutating call.
    #[error("precondition failed: {reason}")]
    Precondition { reason: String },

    /// The remote API rejected the request.
    #[error("github api error (status {status}): {message}")]
    RemoteApi { status: u16, message: String },

    /// Network or timeout failure talking to the remote API.
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// The credential secret could not be resolved.
    #[error("cannot resolve credentials: {reason}")]
    Secret { reason: String },

    /// The control-plane store failed to read or persist an object.
    #[error("resource store error: {reason}")]
    Store { reason: String },
}

impl Error {
    /// Create a validation error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create a precondition error.
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::Precondition {
            reason: reason.into(),
        }
    }

    /// Create a remote API error.
    pub fn remote_api(status: u16, message: impl Into<String>) -> Self {
        Self::RemoteApi {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Create a secret resolution error.
    pub fn secret(reason: impl Into<String>) -> Self {
        Self::Secret {
            reason: reason.into(),
        }
    }

    /// Create a store error.
    pub fn store(reason: impl Into<String>) -> Self {
        Self::Store {
            reason: reason.into(),
        }
    }

    /// Stable class name, used as the condition reason.
    #[must_use]
    pub const fn class(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::Precondition { .. } => "PreconditionError",
            Self::RemoteApi { .. } => "RemoteAPIError",
            Self::Transport { .. } => "TransportError",
            Self::Secret { .. } => "SecretError",
            Self::Store { .. } => "StoreError",
        }
    }
}
