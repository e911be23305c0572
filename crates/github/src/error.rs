//! Error types for the GitHub client.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Result type for GitHub client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the GitHub API.
#[derive(Error, Debug)]
pub enum Error {
    /// The owner account is not an organization.
    #[error("valid organization required, '{org}' is not an organization")]
    NotOrganization { org: String },

    /// GitHub answered with an unexpected status.
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    /// Client configuration is unusable.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// HTTP error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parse error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Create a not-an-organization error.
    pub fn not_organization(org: impl Into<String>) -> Self {
        Self::NotOrganization { org: org.into() }
    }

    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config_error(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }

    /// Build an API error from a response body, preferring GitHub's own
    /// error document when the body carries one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<GithubError>(body).map_or_else(
            |_| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("unexpected status {status}")
                } else {
                    trimmed.to_string()
                }
            },
            |gerr| gerr.to_string(),
        );
        Self::api(status, message)
    }
}

impl From<Error> for ghp_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::NotOrganization { .. } => Self::precondition(err.to_string()),
            Error::Api { status, message } => Self::remote_api(status, message),
            Error::ConfigError { .. } | Error::UrlParse(_) => Self::validation(err.to_string()),
            Error::Http(_) => Self::transport(err.to_string()),
        }
    }
}

/// Error document returned by GitHub on rejected requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubError {
    pub message: String,
    #[serde(default)]
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub errors: Vec<GithubErrorDetail>,
}

/// One field-level entry of a [`GithubError`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubErrorDetail {
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl fmt::Display for GithubErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.message {
            return write!(f, "{message}");
        }
        let resource = self.resource.as_deref().unwrap_or("resource");
        let field = self.field.as_deref().unwrap_or("field");
        let code = self.code.as_deref().unwrap_or("invalid");
        write!(f, "{resource}.{field}: {code}")
    }
}

impl fmt::Display for GithubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        let mut details = self.errors.iter();
        if let Some(first) = details.next() {
            write!(f, ": {first}")?;
            for detail in details {
                write!(f, "; {detail}")?;
            }
        }
        Ok(())
    }
}
