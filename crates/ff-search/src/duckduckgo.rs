//! DuckDuckGo backend. Needs no API key; scrapes the HTML results page.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use tracing::debug;

use ff_core::Error;

use crate::backend::{build_client, status_error, transport_error, SearchBackend, SearchHit};

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";

pub struct DuckDuckGoBackend {
    client: Client,
    base_url: String,
    max_results: usize,
}

impl DuckDuckGoBackend {
    pub fn new(max_results: usize, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoBackend {
    fn key(&self) -> &'static str {
        "duckduckgo"
    }

    fn name(&self) -> &str {
        "DuckDuckGo"
    }

    fn requires_credential(&self) -> bool {
        false
    }

    fn validate_configuration(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, Error> {
        debug!(query = %query, "DuckDuckGo search");

        let response = self
            .client
            .get(format!("{}/html/", self.base_url))
            .query(&[("q", query), ("kl", "us-en")])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error("DuckDuckGo", response).await);
        }

        let html = response.text().await.map_err(transport_error)?;
        Ok(parse_results(&html, self.max_results))
    }
}

/// Extract organic results from a DuckDuckGo HTML results page, skipping ads.
fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let (Ok(result_sel), Ok(link_sel), Ok(snippet_sel)) = (
        Selector::parse("div.result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    document
        .select(&result_sel)
        .filter(|result| !result.value().classes().any(|c| c == "result--ad"))
        .filter_map(|result| {
            let link = result.select(&link_sel).next()?;
            let url = resolve_href(link.value().attr("href")?)?;
            let title = collapse_whitespace(&link.text().collect::<String>());
            let snippet = result
                .select(&snippet_sel)
                .next()
                .map(|s| collapse_whitespace(&s.text().collect::<String>()))
                .unwrap_or_default();
            Some(SearchHit::new(title, url, snippet))
        })
        .take(max_results)
        .collect()
}

/// Result links are wrapped in a `/l/?uddg=<target>` redirect; unwrap them.
fn resolve_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };

    let url = Url::parse(&absolute).ok()?;
    if url.path() == "/l/" {
        url.query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())
    } else {
        Some(absolute)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r##"
        <html><body>
        <div class="result results_links result--ad">
            <a class="result__a" href="https://ads.example.com/buy">Sponsored grant tool</a>
            <a class="result__snippet">Ad copy</a>
        </div>
        <div class="result results_links results_links_deep web-result">
            <h2 class="result__title">
                <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.fordfoundation.org%2F&amp;rut=abc">
                    Ford   Foundation
                </a>
            </h2>
            <a class="result__snippet" href="#">The Ford Foundation is an independent organization working to address inequality.</a>
        </div>
        <div class="result results_links web-result">
            <a class="result__a" href="https://en.wikipedia.org/wiki/Ford_Foundation">Ford Foundation - Wikipedia</a>
        </div>
        </body></html>
    "##;

    #[test]
    fn test_parse_results_skips_ads_and_unwraps_redirects() {
        let hits = parse_results(RESULTS_PAGE, 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Ford Foundation");
        assert_eq!(hits[0].url, "https://www.fordfoundation.org/");
        assert!(hits[0].snippet.starts_with("The Ford Foundation"));
        assert_eq!(hits[1].url, "https://en.wikipedia.org/wiki/Ford_Foundation");
        assert!(hits[1].snippet.is_empty());
    }

    #[test]
    fn test_parse_results_honors_max() {
        let hits = parse_results(RESULTS_PAGE, 1);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_parse_results_empty_page() {
        assert!(parse_results("<html><body>No results.</body></html>", 10).is_empty());
    }

    #[test]
    fn test_resolve_href_direct_link() {
        assert_eq!(
            resolve_href("https://www.hewlett.org/").as_deref(),
            Some("https://www.hewlett.org/")
        );
    }

    #[test]
    fn test_backend_needs_no_credential() {
        let backend = DuckDuckGoBackend::new(15, Duration::from_secs(30));
        assert_eq!(backend.name(), "DuckDuckGo");
        assert!(!backend.requires_credential());
        assert!(backend.validate_configuration().is_ok());
    }
}
