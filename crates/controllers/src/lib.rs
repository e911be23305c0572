//! GitHub adapters for the managed kinds and the wiring that runs them.
//!
//! One [`GithubConnector`] serves all three kinds; the kind picks the
//! adapter at compile time through its `Connector` impl.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod collaborator;
pub mod connector;
pub mod repo;
pub mod secrets;
pub mod setup;
pub mod team_repo;

pub use collaborator::CollaboratorExternal;
pub use connector::GithubConnector;
pub use repo::RepoExternal;
pub use secrets::{FileSecretResolver, SecretResolver, StaticSecretResolver};
pub use setup::{Stores, setup};
pub use team_repo::{TeamRepoExternal, permissions_up_to_date};
