//! GitHub REST client.
//!
//! One `Client` is built per reconcile pass from an immutable [`ClientOpts`].
//! The per-kind services borrow it and map identity tuples onto fixed REST
//! path templates.

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::collaborators::CollaboratorService;
use crate::config::ClientOpts;
use crate::error::{Error, Result};
use crate::repos::RepoService;
use crate::team_repos::TeamRepoService;

const USER_AGENT: &str = concat!("github-provider/", env!("CARGO_PKG_VERSION"));
const DEFAULT_ACCEPT: &str = "application/vnd.github+json";

/// Client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct Client {
    opts: Arc<ClientOpts>,
    http: reqwest::Client,
}

/// Status and raw body of one response.
#[derive(Debug)]
pub(crate) struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    /// Decode the body. GitHub answering with a body that does not decode
    /// is reported as an API error carrying the reply status.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            Error::api(
                self.status.as_u16(),
                format!("unexpected response body: {e}"),
            )
        })
    }

    pub fn into_error(self) -> Error {
        Error::from_response(self.status.as_u16(), &self.body)
    }
}

impl Client {
    /// Build a client bound to the given options.
    pub fn new(opts: ClientOpts) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(opts.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            opts: Arc::new(opts),
            http,
        })
    }

    pub fn opts(&self) -> &ClientOpts {
        &self.opts
    }

    pub fn repos(&self) -> RepoService<'_> {
        RepoService::new(self)
    }

    pub fn collaborators(&self) -> CollaboratorService<'_> {
        CollaboratorService::new(self)
    }

    pub fn team_repos(&self) -> TeamRepoService<'_> {
        TeamRepoService::new(self)
    }

    /// Whether `owner` is an organization rather than a personal account.
    ///
    /// GitHub API docs: <https://docs.github.com/en/rest/orgs/orgs#get-an-organization>
    pub async fn is_org(&self, owner: &str) -> Result<bool> {
        let url = self.endpoint(&["orgs", owner])?;
        let reply = self.send(Method::GET, url, None, None).await?;

        match reply.status {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(reply.into_error()),
        }
    }

    /// Append path segments to the configured base URL.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.opts.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::config_error(format!(
                    "api url '{}' cannot carry a path",
                    self.opts.api_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue one request carrying the bearer credential.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
        accept: Option<&str>,
    ) -> Result<Reply> {
        if self.opts.verbose {
            debug!(method = %method, url = %url, body = ?body, "GitHub request");
        }

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, format!("token {}", self.opts.token))
            .header(ACCEPT, accept.unwrap_or(DEFAULT_ACCEPT));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if self.opts.verbose {
            debug!(method = %method, url = %url, status = status.as_u16(), body = %body, "GitHub response");
        } else {
            trace!(method = %method, url = %url, status = status.as_u16(), "GitHub call");
        }

        Ok(Reply { status, body })
    }
}
