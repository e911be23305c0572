//! Typed health signals attached to every managed resource.
//!
//! A [`Conditions`] set holds at most one [`Condition`] per
//! [`ConditionType`], in first-seen order. Setting a condition whose type is
//! already present replaces it in place; the transition time only moves when
//! the status actually changes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of health signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    /// The external resource matches the desired spec.
    Ready,
    /// The last reconcile attempt completed without error.
    Synced,
    /// A create call has been issued for the external resource.
    Creating,
    /// A delete call has been issued for the external resource.
    Deleting,
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::Synced => write!(f, "Synced"),
            Self::Creating => write!(f, "Creating"),
            Self::Deleting => write!(f, "Deleting"),
        }
    }
}

/// Tri-state condition status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A single observation about a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub status: ConditionStatus,
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Create a condition stamped with the current time.
    pub fn new(
        condition_type: ConditionType,
        status: ConditionStatus,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            condition_type,
            status,
            reason: reason.into(),
            message: String::new(),
            last_transition_time: Utc::now(),
        }
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Override the transition time.
    #[must_use]
    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.last_transition_time = time;
        self
    }

    /// The external resource is available for use.
    pub fn available() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::True, "Available")
    }

    /// The external resource does not (yet) match the desired spec.
    pub fn unavailable(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, reason).with_message(message)
    }

    /// A create call is in progress.
    pub fn creating() -> Self {
        Self::new(ConditionType::Creating, ConditionStatus::True, "Creating")
    }

    /// The create call finished.
    pub fn created() -> Self {
        Self::new(ConditionType::Creating, ConditionStatus::False, "Created")
    }

    /// A delete call is in progress.
    pub fn deleting() -> Self {
        Self::new(ConditionType::Deleting, ConditionStatus::True, "Deleting")
    }

    /// The last reconcile attempt succeeded.
    pub fn reconcile_success() -> Self {
        Self::new(ConditionType::Synced, ConditionStatus::True, "ReconcileSuccess")
    }

    /// The last reconcile attempt failed.
    pub fn reconcile_error(message: impl Into<String>) -> Self {
        Self::new(ConditionType::Synced, ConditionStatus::False, "ReconcileError")
            .with_message(message)
    }
}

/// Ordered set of conditions keyed by type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Merge conditions into the set.
    ///
    /// An existing condition of the same type keeps its transition time
    /// unless the status changes.
    pub fn set(&mut self, conditions: impl IntoIterator<Item = Condition>) {
        for incoming in conditions {
            match self
                .0
                .iter_mut()
                .find(|c| c.condition_type == incoming.condition_type)
            {
                Some(existing) if existing.status == incoming.status => {
                    existing.reason = incoming.reason;
                    existing.message = incoming.message;
                }
                Some(existing) => *existing = incoming,
                None => self.0.push(incoming),
            }
        }
    }

    /// Latest condition of the given type.
    #[must_use]
    pub fn get(&self, condition_type: ConditionType) -> Option<&Condition> {
        self.0.iter().find(|c| c.condition_type == condition_type)
    }

    /// Status of the given type, `Unknown` when absent.
    #[must_use]
    pub fn status_of(&self, condition_type: ConditionType) -> ConditionStatus {
        self.get(condition_type)
            .map_or(ConditionStatus::Unknown, |c| c.status)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_set_appends_new_types_in_order() {
        let mut conditions = Conditions::new();
        conditions.set([Condition::creating(), Condition::available()]);

        let types: Vec<_> = conditions.iter().map(|c| c.condition_type).collect();
        assert_eq!(types, vec![ConditionType::Creating, ConditionType::Ready]);
    }

    #[test]
    fn test_same_status_keeps_transition_time() {
        let earlier = Utc::now() - Duration::minutes(10);
        let mut conditions = Conditions::new();
        conditions.set([Condition::unavailable("TransportError", "timeout").at(earlier)]);

        conditions.set([Condition::unavailable("RemoteAPIError", "bad request")]);

        let ready = conditions.get(ConditionType::Ready);
        assert_eq!(ready.map(|c| c.last_transition_time), Some(earlier));
        assert_eq!(ready.map(|c| c.reason.as_str()), Some("RemoteAPIError"));
        assert_eq!(ready.map(|c| c.message.as_str()), Some("bad request"));
        assert_eq!(conditions.len(), 1);
    }

    #[test]
    fn test_status_change_advances_transition_time() {
        let earlier = Utc::now() - Duration::minutes(10);
        let mut conditions = Conditions::new();
        conditions.set([Condition::unavailable("TransportError", "timeout").at(earlier)]);

        conditions.set([Condition::available()]);

        let ready = conditions.get(ConditionType::Ready);
        assert_eq!(ready.map(|c| c.status), Some(ConditionStatus::True));
        assert!(ready.is_some_and(|c| c.last_transition_time > earlier));
    }

    #[test]
    fn test_status_of_missing_is_unknown() {
        let conditions = Conditions::new();
        assert_eq!(
            conditions.status_of(ConditionType::Synced),
            ConditionStatus::Unknown
        );
        assert!(conditions.is_empty());
    }
}
