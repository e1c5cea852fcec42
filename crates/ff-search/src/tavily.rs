//! Tavily backend. Requires `TAVILY_API_KEY`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ff_core::Error;

use crate::backend::{
    build_client, require_key, status_error, transport_error, SearchBackend, SearchHit,
};

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const SEARCH_DEPTH: &str = "advanced";

pub struct TavilyBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    max_results: usize,
    name: String,
}

impl TavilyBackend {
    pub fn new(api_key: Option<String>, max_results: usize, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            max_results,
            name: format!("Tavily ({SEARCH_DEPTH})"),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_request<'a>(&self, query: &'a str) -> TavilyRequest<'a> {
        TavilyRequest {
            query,
            search_depth: SEARCH_DEPTH,
            // Tavily caps results at 20.
            max_results: self.max_results.min(20),
            include_answer: false,
        }
    }
}

#[async_trait]
impl SearchBackend for TavilyBackend {
    fn key(&self) -> &'static str {
        "tavily"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn requires_credential(&self) -> bool {
        true
    }

    fn validate_configuration(&self) -> Result<(), Error> {
        require_key(&self.name, self.api_key.as_deref(), "TAVILY_API_KEY")
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, Error> {
        self.validate_configuration()?;
        let api_key = self.api_key.as_deref().unwrap_or_default();
        debug!(query = %query, "Tavily search");

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(api_key)
            .json(&self.build_request(query))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error("Tavily", response).await);
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| Error::serialization(e.to_string()))?;

        Ok(body
            .results
            .into_iter()
            .take(self.max_results)
            .map(|r| SearchHit::new(r.title, r.url, r.content))
            .collect())
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'static str,
    max_results: usize,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}
