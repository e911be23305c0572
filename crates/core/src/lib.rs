//! # ghp-core
//!
//! Resource model shared by the GitHub provider crates: the three managed
//! kinds with their specs and observed status, the condition set, and the
//! error taxonomy every reconcile step reports through.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod condition;
pub mod credentials;
pub mod error;
pub mod managed;
pub mod meta;
pub mod resources;
pub mod result;

pub use condition::{Condition, ConditionStatus, ConditionType, Conditions};
pub use credentials::{CredentialSelectors, SecretKeySelector};
pub use error::Error;
pub use managed::Managed;
pub use meta::{ObjectMeta, ResourceKey};
pub use resources::{
    Collaborator, CollaboratorIdentity, CollaboratorSpec, CollaboratorStatus, Repo, RepoIdentity,
    RepoSpec, RepoStatus, TeamRepo, TeamRepoIdentity, TeamRepoSpec, TeamRepoStatus,
};
pub use result::{Result, ResultExt};
