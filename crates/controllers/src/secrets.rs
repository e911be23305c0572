//! Credential lookup.
//!
//! Tokens are resolved on every connect and never cached, so a rotated
//! secret takes effect on the next pass.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ghp_core::{Error, Result, SecretKeySelector};
use tracing::debug;

/// Resolves a secret key reference to its value.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    async fn resolve(&self, selector: &SecretKeySelector) -> Result<String>;
}

/// Reads secrets laid out as `<root>/<namespace>/<name>/<key>`, the way
/// mounted secret volumes appear on disk.
#[derive(Debug, Clone)]
pub struct FileSecretResolver {
    root: PathBuf,
}

impl FileSecretResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, selector: &SecretKeySelector) -> Result<PathBuf> {
        let parts = [
            ("namespace", &selector.namespace),
            ("name", &selector.name),
            ("key", &selector.key),
        ];
        for (field, value) in parts {
            if value.is_empty() || value.contains(['/', '\\']) || value == ".." {
                return Err(Error::validation(format!(
                    "secret {field} '{value}' is not a valid path component"
                )));
            }
        }
        Ok(self
            .root
            .join(&selector.namespace)
            .join(&selector.name)
            .join(&selector.key))
    }
}

#[async_trait]
impl SecretResolver for FileSecretResolver {
    async fn resolve(&self, selector: &SecretKeySelector) -> Result<String> {
        let path = self.path_for(selector)?;
        debug!(path = %path.display(), "Reading secret");

        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            Error::secret(format!(
                "cannot read key '{}' of secret {}/{}: {e}",
                selector.key, selector.namespace, selector.name
            ))
        })?;

        let value = raw.trim_end();
        if value.is_empty() {
            return Err(Error::secret(format!(
                "key '{}' of secret {}/{} is empty",
                selector.key, selector.namespace, selector.name
            )));
        }
        Ok(value.to_string())
    }
}

/// Fixed secrets held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSecretResolver {
    values: HashMap<(String, String, String), String>,
}

impl StaticSecretResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.values
            .insert((namespace.into(), name.into(), key.into()), value.into());
        self
    }
}

#[async_trait]
impl SecretResolver for StaticSecretResolver {
    async fn resolve(&self, selector: &SecretKeySelector) -> Result<String> {
        self.values
            .get(&(
                selector.namespace.clone(),
                selector.name.clone(),
                selector.key.clone(),
            ))
            .cloned()
            .ok_or_else(|| {
                Error::secret(format!(
                    "secret {}/{} has no key '{}'",
                    selector.namespace, selector.name, selector.key
                ))
            })
    }
}
