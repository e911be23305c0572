//! Observe/act reconciliation engine for managed GitHub resources.
//!
//! The engine is generic over the managed kind. Kind-specific behavior
//! lives behind [`Connector`] and [`ExternalClient`]; everything else
//! (conditions, events, requeue timing, concurrency) is shared.
//!
//! # Key Concepts
//!
//! ## Reconcile pass
//!
//! A pass fetches the object from its [`ResourceStore`] and then:
//! 1. Connects to the provider with the object's credentials
//! 2. Observes the external resource
//! 3. Creates it when missing, updates it when drifted, or deletes it when
//!    the object is marked for deletion
//! 4. Writes the resulting conditions back to the store
//!
//! ## Scheduling
//!
//! A [`Controller`] runs one worker per object. Successful passes requeue
//! after the poll interval; failures back off exponentially, capped at the
//! poll interval. A [`RateLimiter`] shared by all controllers caps the number
//! of passes in flight.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ghp_reconciler::{
//!     Controller, ControllerOptions, InMemoryStore, RateLimiter, ReconcilerBuilder,
//!     ShutdownCoordinator,
//! };
//!
//! let store = InMemoryStore::shared();
//! let reconciler = ReconcilerBuilder::new(connector).with_store(store.clone()).build()?;
//! let options = ControllerOptions::default();
//! let limiter = RateLimiter::new(options.max_concurrent_reconciles);
//! let controller = Controller::new(reconciler, limiter, &options);
//! tokio::spawn(controller.run(ShutdownCoordinator::shared()));
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod controller;
pub mod event;
pub mod external;
pub mod reconciler;
pub mod scheduler;
pub mod shutdown;
pub mod store;
pub mod types;

pub use controller::{Controller, ControllerOptions};
pub use event::{Event, EventReason, EventRecorder, EventType, MemoryRecorder, TracingRecorder};
pub use external::{Connector, ExternalClient};
pub use ghp_core::{Error, Result};
pub use reconciler::{Reconciler, ReconcilerBuilder};
pub use scheduler::{BackoffPolicy, RateLimiter};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal, install_signal_handlers};
pub use store::{InMemoryStore, ResourceStore};
pub use types::{ExternalObservation, ObservationNote, ReconcileOutcome};
