//! SerpAPI backend (Google engine). Requires `SERPAPI_API_KEY`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use ff_core::Error;

use crate::backend::{
    build_client, require_key, status_error, transport_error, SearchBackend, SearchHit,
};

const DEFAULT_BASE_URL: &str = "https://serpapi.com";
const SEARCH_ENGINE: &str = "google";

pub struct SerpApiBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    max_results: usize,
    name: String,
}

impl SerpApiBackend {
    pub fn new(api_key: Option<String>, max_results: usize, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            max_results,
            name: format!("SerpAPI ({SEARCH_ENGINE})"),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl SearchBackend for SerpApiBackend {
    fn key(&self) -> &'static str {
        "serpapi"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn requires_credential(&self) -> bool {
        true
    }

    fn validate_configuration(&self) -> Result<(), Error> {
        require_key(&self.name, self.api_key.as_deref(), "SERPAPI_API_KEY")
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, Error> {
        self.validate_configuration()?;
        let api_key = self.api_key.as_deref().unwrap_or_default();
        debug!(query = %query, "SerpAPI search");

        let num = self.max_results.to_string();
        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("engine", SEARCH_ENGINE),
                ("q", query),
                ("gl", "us"),
                ("hl", "en"),
                ("num", num.as_str()),
                ("api_key", api_key),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error("SerpAPI", response).await);
        }

        let body: SerpApiResponse = response
            .json()
            .await
            .map_err(|e| Error::serialization(e.to_string()))?;

        body.into_hits(self.max_results)
    }
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SerpApiResponse {
    fn into_hits(self, max_results: usize) -> Result<Vec<SearchHit>, Error> {
        // SerpAPI reports "no results" as an error string with a 200 status.
        if let Some(error) = self.error {
            if self.organic_results.is_empty() && !error.contains("hasn't returned any results") {
                return Err(Error::api(200, format!("SerpAPI: {error}")));
            }
        }

        Ok(self
            .organic_results
            .into_iter()
            .take(max_results)
            .map(|r| SearchHit::new(r.title, r.link, r.snippet))
            .collect())
    }
}
