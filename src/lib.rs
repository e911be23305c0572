//! # github-provider
//!
//! Keeps GitHub repositories, collaborators and team permissions converged
//! with the objects declared in a YAML manifest.
//!
//! This library holds the pieces of the binary that are worth testing on
//! their own: CLI parsing and manifest handling.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cli;
pub mod manifest;

pub use cli::{Cli, parse_duration, parse_period};
pub use manifest::{ApplySummary, Manifest, ManifestError};
