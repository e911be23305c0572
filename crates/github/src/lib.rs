//! # ghp-github
//!
//! Thin client for the parts of the GitHub REST API the provider manages:
//! organization repositories, repository collaborators and team repository
//! permissions.
//!
//! ```ignore
//! use ghp_github::{Client, ClientOpts};
//!
//! let client = Client::new(ClientOpts::new(None, token)?.with_verbose(false))?;
//! let exists = client.repos().exists(&identity).await?;
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod client;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod repos;
pub mod team_repos;

pub use client::Client;
pub use collaborators::{CollaboratorPermission, CollaboratorService};
pub use config::{ClientOpts, DEFAULT_API_URL, DEFAULT_TIMEOUT, VERBOSE_TIMEOUT};
pub use error::{Error, GithubError, GithubErrorDetail, Result};
pub use repos::{NewRepo, RepoInfo, RepoService};
pub use team_repos::{PermissionSet, TeamRepoPermissions, TeamRepoService};
