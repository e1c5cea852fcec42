//! Tools the reasoning agent calls while looking for a website.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html};
use serde::Deserialize;
use tracing::debug;

use ff_core::{Error, PropertySchema, Tool, ToolDefinition, ToolOutput, ToolParameters};

use crate::backend::{SearchBackend, USER_AGENT};

const VALIDATION_TIMEOUT: Duration = Duration::from_secs(5);
const VALIDATION_KEYWORDS: &[&str] = &["grant", "foundation"];

// =============================================================================
// Web Search Tool
// =============================================================================

pub struct WebSearchTool {
    backend: Arc<dyn SearchBackend>,
    description: String,
}

impl WebSearchTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        let description = format!(
            "Search the web using {}. Returns titles, URLs and snippets of matching pages.",
            backend.name()
        );
        Self {
            backend,
            description,
        }
    }
}

#[derive(Deserialize)]
struct WebSearchArgs {
    query: String,
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description()).with_parameters(
            ToolParameters::new().add_property(
                "query",
                PropertySchema::string("The search query"),
                true,
            ),
        )
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, Error> {
        let args: WebSearchArgs = serde_json::from_value(arguments)
            .map_err(|e| Error::tool("web_search", format!("Invalid arguments: {}", e)))?;

        let hits = self.backend.search(&args.query).await?;
        if hits.is_empty() {
            return Ok(ToolOutput::success("No results found"));
        }

        let formatted = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| format!("{}. {}", i + 1, hit))
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(ToolOutput::success(formatted))
    }
}

// =============================================================================
// Validate URL Tool
// =============================================================================

pub struct ValidateUrlTool {
    client: Client,
}

impl Default for ValidateUrlTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidateUrlTool {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(VALIDATION_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct ValidateUrlArgs {
    url: String,
}

#[async_trait]
impl Tool for ValidateUrlTool {
    fn name(&self) -> &str {
        "validate_url"
    }

    fn description(&self) -> &str {
        "Fetch a URL and check whether the page mentions 'grant' or 'foundation'."
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description()).with_parameters(
            ToolParameters::new().add_property(
                "url",
                PropertySchema::string("The URL to check"),
                true,
            ),
        )
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, Error> {
        let args: ValidateUrlArgs = serde_json::from_value(arguments)
            .map_err(|e| Error::tool("validate_url", format!("Invalid arguments: {}", e)))?;
        let url = with_scheme(&args.url);
        debug!(url = %url, "Validating URL");

        // Fetch failures go back to the model as tool output, not as errors.
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => return Ok(ToolOutput::error(format!("Failed to fetch '{}': {}", url, e))),
        };
        if !response.status().is_success() {
            return Ok(ToolOutput::error(format!(
                "HTTP error {}: {}",
                response.status(),
                url
            )));
        }
        let html = match response.text().await {
            Ok(t) => t,
            Err(e) => return Ok(ToolOutput::error(format!("Failed to read '{}': {}", url, e))),
        };

        Ok(ToolOutput::success(validation_report(&url, &html)))
    }
}

fn with_scheme(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn validation_report(url: &str, html: &str) -> String {
    let document = Html::parse_document(html);
    let text = visible_text(&document.root_element()).to_lowercase();

    let found: Vec<&str> = VALIDATION_KEYWORDS
        .iter()
        .copied()
        .filter(|k| text.contains(k))
        .collect();

    if found.is_empty() {
        format!("{url} does not mention grants or foundations")
    } else {
        format!("{url} is reachable and mentions: {}", found.join(", "))
    }
}

/// Visible page text, without scripts, styles or page chrome.
fn visible_text(element: &ElementRef) -> String {
    let mut text = String::new();

    for node in element.descendants() {
        let hidden = node.ancestors().any(|a| {
            a.value().as_element().is_some_and(|el| {
                matches!(el.name(), "script" | "style" | "noscript" | "template")
            })
        });
        if hidden {
            continue;
        }

        if let Some(t) = node.value().as_text() {
            let trimmed = t.trim();
            if !trimmed.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(trimmed);
            }
        }
    }

    text
}

/// The tool set for one lookup, bound to the given backend.
pub fn create_lookup_tools(backend: Arc<dyn SearchBackend>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(WebSearchTool::new(backend)),
        Arc::new(ValidateUrlTool::new()),
    ]
}
