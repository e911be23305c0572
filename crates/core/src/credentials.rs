//! References to the secret holding a GitHub token.

use serde::{Deserialize, Serialize};

/// Points at one key of a namespaced secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    pub namespace: String,
    pub name: String,
    pub key: String,
}

/// Credential source declared on a resource spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSelectors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretKeySelector>,
}

impl CredentialSelectors {
    pub fn secret(
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            secret_ref: Some(SecretKeySelector {
                namespace: namespace.into(),
                name: name.into(),
                key: key.into(),
            }),
        }
    }
}
