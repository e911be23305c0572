//! The three managed kinds.

/// Implements the boilerplate half of `Managed` for a kind whose spec carries
/// the shared `api_url`, `credentials` and `verbose` fields.
macro_rules! managed_kind {
    ($ty:ty, $kind:literal, $spec:ty, $status:ty) => {
        impl $crate::managed::Managed for $ty {
            const KIND: &'static str = $kind;

            type Spec = $spec;
            type Status = $status;

            fn metadata(&self) -> &$crate::meta::ObjectMeta {
                &self.metadata
            }

            fn metadata_mut(&mut self) -> &mut $crate::meta::ObjectMeta {
                &mut self.metadata
            }

            fn spec(&self) -> &$spec {
                &self.spec
            }

            fn status(&self) -> &$status {
                &self.status
            }

            fn status_mut(&mut self) -> &mut $status {
                &mut self.status
            }

            fn conditions(&self) -> &$crate::condition::Conditions {
                &self.status.conditions
            }

            fn conditions_mut(&mut self) -> &mut $crate::condition::Conditions {
                &mut self.status.conditions
            }

            fn secret_ref(&self) -> Option<&$crate::credentials::SecretKeySelector> {
                self.spec
                    .credentials
                    .as_ref()
                    .and_then(|c| c.secret_ref.as_ref())
            }

            fn api_url(&self) -> Option<&str> {
                self.spec.api_url.as_deref().filter(|u| !u.is_empty())
            }

            fn verbose(&self) -> bool {
                self.spec.verbose.unwrap_or(false)
            }

            fn external_name(&self) -> String {
                self.spec.external_name()
            }

            fn same_identity(&self, other: &Self) -> bool {
                self.spec.identity_key() == other.spec.identity_key()
            }
        }
    };
}

pub(crate) use managed_kind;

mod collaborator;
mod repo;
mod team_repo;

pub use collaborator::{Collaborator, CollaboratorIdentity, CollaboratorSpec, CollaboratorStatus};
pub use repo::{Repo, RepoIdentity, RepoSpec, RepoStatus};
pub use team_repo::{TeamRepo, TeamRepoIdentity, TeamRepoSpec, TeamRepoStatus};
