//! The search capability shared by every backend.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use ff_core::Error;

pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (compatible; foundation-finder/0.1; +https://github.com/andrew/foundation-finder)";

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

impl fmt::Display for SearchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.title, self.url)?;
        if !self.snippet.is_empty() {
            write!(f, "\n{}", self.snippet)?;
        }
        Ok(())
    }
}

/// A web search engine the reasoning agent can query.
///
/// Every `search` call re-executes the query against the engine.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Canonical factory key (e.g. "duckduckgo").
    fn key(&self) -> &'static str;

    /// Stable human-readable name (e.g. "DuckDuckGo").
    fn name(&self) -> &str;

    /// Whether the backend needs an API key.
    fn requires_credential(&self) -> bool;

    /// Fails with `SearchProviderUnavailable` when a required credential is missing.
    fn validate_configuration(&self) -> Result<(), Error>;

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, Error>;
}

pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(err.to_string())
    } else {
        Error::network(err.to_string())
    }
}

/// Turn a non-success HTTP response into an error.
pub(crate) async fn status_error(backend: &str, response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match status.as_u16() {
        401 | 403 => Error::auth(format!("{backend}: {body}")),
        429 => Error::rate_limit(format!("{backend}: {body}")),
        code => Error::api(code, format!("{backend}: {body}")),
    }
}

pub(crate) fn require_key(provider: &str, key: Option<&str>, env_var: &str) -> Result<(), Error> {
    match key {
        Some(k) if !k.trim().is_empty() => Ok(()),
        _ => Err(Error::search_provider_unavailable(
            provider,
            format!("{provider} requires a valid API key. Set {env_var}."),
        )),
    }
}
