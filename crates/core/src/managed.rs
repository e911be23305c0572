//! The view of a declared object that the reconciler works against.

use std::fmt::Debug;

use crate::condition::{Condition, ConditionType, Conditions};
use crate::credentials::SecretKeySelector;
use crate::error::Error;
use crate::meta::{ObjectMeta, ResourceKey};
use crate::result::Result;

/// A declared object whose external counterpart is kept converged.
///
/// Every kind is its own type, so a reconciler instantiated for one kind can
/// never be handed another.
pub trait Managed: Clone + Debug + Send + Sync + 'static {
    /// Kind name as written in manifests.
    const KIND: &'static str;

    /// Desired state, written only by the object's author.
    type Spec: Clone + Debug + PartialEq + Send + Sync;

    /// Observed state, written only by the reconciler.
    type Status: Clone + Debug + Default + Send + Sync;

    fn metadata(&self) -> &ObjectMeta;

    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    fn spec(&self) -> &Self::Spec;

    fn status(&self) -> &Self::Status;

    fn status_mut(&mut self) -> &mut Self::Status;

    fn conditions(&self) -> &Conditions;

    fn conditions_mut(&mut self) -> &mut Conditions;

    /// Secret holding the GitHub token, if one is declared.
    fn secret_ref(&self) -> Option<&SecretKeySelector>;

    /// Base URL of the GitHub API, when not the public one.
    fn api_url(&self) -> Option<&str>;

    /// Whether requests and responses should be traced.
    fn verbose(&self) -> bool;

    /// Human-readable external identity, e.g. `acme/widgets/bob`.
    fn external_name(&self) -> String;

    /// Whether both objects address the same external resource. Identity
    /// fields are fixed once an object is declared.
    fn same_identity(&self, other: &Self) -> bool;

    fn key(&self) -> ResourceKey {
        self.metadata().key()
    }

    fn deletion_requested(&self) -> bool {
        self.metadata().deletion_timestamp.is_some()
    }

    fn set_conditions(&mut self, conditions: impl IntoIterator<Item = Condition>) {
        self.conditions_mut().set(conditions);
    }

    fn condition(&self, condition_type: ConditionType) -> Option<&Condition> {
        self.conditions().get(condition_type)
    }

    /// The declared secret reference, or a validation error.
    fn require_secret_ref(&self) -> Result<&SecretKeySelector> {
        self.secret_ref().ok_or_else(|| {
            Error::validation(format!(
                "{} {}: no credentials secret referenced",
                Self::KIND,
                self.key()
            ))
        })
    }
}

/// Validate one identity segment used in a REST path.
pub(crate) fn path_segment(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    if trimmed.contains('/') {
        return Err(Error::validation(format!(
            "{field} '{trimmed}' must not contain '/'"
        )));
    }
    Ok(trimmed.to_string())
}
