//! Builds a GitHub client from a declared object's credentials.

use std::sync::Arc;

use ghp_core::{Managed, Result};
use ghp_github::{Client, ClientOpts};
use tracing::debug;

use crate::secrets::SecretResolver;

/// Connects every managed kind to GitHub.
///
/// Each `connect` resolves the token afresh and builds a client from a new
/// [`ClientOpts`], so nothing is shared between passes.
#[derive(Clone)]
pub struct GithubConnector {
    secrets: Arc<dyn SecretResolver>,
}

impl GithubConnector {
    pub fn new(secrets: Arc<dyn SecretResolver>) -> Self {
        Self { secrets }
    }

    pub(crate) async fn client_for<R: Managed>(&self, resource: &R) -> Result<Client> {
        let selector = resource.require_secret_ref()?;
        let token = self.secrets.resolve(selector).await?;

        let opts = ClientOpts::new(resource.api_url(), token)?.with_verbose(resource.verbose());
        debug!(
            kind = R::KIND,
            resource = %resource.key(),
            api_url = %opts.api_url,
            verbose = opts.verbose,
            "Connecting to GitHub"
        );

        Ok(Client::new(opts)?)
    }
}
