//! Connection settings for one GitHub client.

use std::time::Duration;

use url::Url;

use crate::error::Result;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(40);

/// Per-request timeout while tracing requests and responses.
pub const VERBOSE_TIMEOUT: Duration = Duration::from_secs(50);

/// Immutable settings a client is built from.
///
/// Built fresh for every reconcile pass so a rotated token is picked up on
/// the next attempt.
#[derive(Clone)]
pub struct ClientOpts {
    /// Base URL; a path component (GitHub Enterprise `/api/v3`) is kept.
    pub api_url: Url,
    /// Bearer token sent as `Authorization: token <token>`.
    pub token: String,
    pub timeout: Duration,
    /// Log every request and response body at debug level.
    pub verbose: bool,
}

impl ClientOpts {
    /// Options for the given base URL (public GitHub when `None`).
    pub fn new(api_url: Option<&str>, token: impl Into<String>) -> Result<Self> {
        let api_url = Url::parse(api_url.unwrap_or(DEFAULT_API_URL))?;
        Ok(Self {
            api_url,
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
            verbose: false,
        })
    }

    /// Enable or disable request tracing; tracing uses the longer timeout.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self.timeout = if verbose {
            VERBOSE_TIMEOUT
        } else {
            DEFAULT_TIMEOUT
        };
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ClientOpts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOpts")
            .field("api_url", &self.api_url.as_str())
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("verbose", &self.verbose)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_public_api() {
        let opts = ClientOpts::new(None, "t0ken").ok();
        assert_eq!(
            opts.as_ref().map(|o| o.api_url.as_str()),
            Some("https://api.github.com/")
        );
        assert_eq!(opts.map(|o| o.timeout), Some(DEFAULT_TIMEOUT));
    }

    #[test]
    fn test_verbose_uses_longer_timeout() {
        let opts = ClientOpts::new(Some("https://ghe.example.com/api/v3"), "t0ken")
            .map(|o| o.with_verbose(true))
            .ok();
        assert_eq!(opts.as_ref().map(|o| o.timeout), Some(VERBOSE_TIMEOUT));
        assert_eq!(opts.map(|o| o.verbose), Some(true));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = ClientOpts::new(None, "super-secret")
            .map(|o| format!("{o:?}"))
            .unwrap_or_default();
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(ClientOpts::new(Some("not a url"), "t").is_err());
    }
}
