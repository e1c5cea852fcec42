//! Credential-aware construction of search backends.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use ff_core::Error;

use crate::backend::SearchBackend;
use crate::duckduckgo::DuckDuckGoBackend;
use crate::serpapi::SerpApiBackend;
use crate::tavily::TavilyBackend;

/// Accepted provider names, aliases included.
pub const PROVIDER_NAMES: &[&str] = &["duckduckgo", "ddg", "serpapi", "google", "tavily"];

/// Canonical backend keys in their default auto-selection order.
pub const DEFAULT_PREFERENCE: &[&str] = &["tavily", "serpapi", "duckduckgo"];

pub const AUTO: &str = "auto";

/// Resolve a user-supplied provider name (case-insensitive, aliases allowed).
pub fn canonical_key(name: &str) -> Option<&'static str> {
    match name.trim().to_ascii_lowercase().as_str() {
        "duckduckgo" | "ddg" => Some("duckduckgo"),
        "serpapi" | "google" => Some("serpapi"),
        "tavily" => Some("tavily"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub max_results: usize,
    pub timeout: Duration,
    pub serpapi_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
    /// Auto-selection order; unknown entries are skipped.
    pub preference: Vec<String>,
    /// Provider used when the caller names none. `None` or "auto" means auto-select.
    pub default_provider: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 15,
            timeout: Duration::from_secs(30),
            serpapi_api_key: None,
            tavily_api_key: None,
            preference: DEFAULT_PREFERENCE.iter().map(|s| s.to_string()).collect(),
            default_provider: None,
        }
    }
}

/// Configuration state of one backend, as listed by the providers endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub key: &'static str,
    pub name: String,
    pub requires_credential: bool,
    pub configured: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SearchBackendFactory {
    settings: SearchSettings,
}

impl SearchBackendFactory {
    pub fn new(settings: SearchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Create a backend.
    ///
    /// A named provider yields exactly that backend or an error. `None` or
    /// "auto" walks the preference order and returns the first backend whose
    /// configuration validates.
    pub fn create(&self, preferred: Option<&str>) -> Result<Arc<dyn SearchBackend>, Error> {
        match preferred.map(str::trim).filter(|p| !p.is_empty()) {
            Some(name) if !name.eq_ignore_ascii_case(AUTO) => self.create_named(name),
            _ => self.create_auto(),
        }
    }

    /// Create the backend named by `default_provider`, or auto-select.
    pub fn create_default(&self) -> Result<Arc<dyn SearchBackend>, Error> {
        self.create(self.settings.default_provider.as_deref())
    }

    fn create_named(&self, name: &str) -> Result<Arc<dyn SearchBackend>, Error> {
        let key = canonical_key(name)
            .ok_or_else(|| Error::unknown_search_provider(name, PROVIDER_NAMES))?;
        let backend = self.build(key);
        backend.validate_configuration()?;
        info!(provider = backend.name(), "Using search provider");
        Ok(backend)
    }

    fn create_auto(&self) -> Result<Arc<dyn SearchBackend>, Error> {
        let mut last_error = None;
        for name in &self.settings.preference {
            let Some(key) = canonical_key(name) else {
                warn!(provider = %name, "Skipping unknown provider in preference list");
                continue;
            };
            let backend = self.build(key);
            match backend.validate_configuration() {
                Ok(()) => {
                    info!(provider = backend.name(), "Auto-selected search provider");
                    return Ok(backend);
                }
                Err(e) => {
                    warn!(provider = backend.name(), error = %e, "Search provider not configured, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::search_provider_unavailable(AUTO, "no search provider in the preference list is configured")
        }))
    }

    fn build(&self, key: &str) -> Arc<dyn SearchBackend> {
        let s = &self.settings;
        match key {
            "serpapi" => Arc::new(SerpApiBackend::new(
                s.serpapi_api_key.clone(),
                s.max_results,
                s.timeout,
            )),
            "tavily" => Arc::new(TavilyBackend::new(
                s.tavily_api_key.clone(),
                s.max_results,
                s.timeout,
            )),
            _ => Arc::new(DuckDuckGoBackend::new(s.max_results, s.timeout)),
        }
    }

    /// Every backend with its configuration state, in canonical order.
    pub fn statuses(&self) -> Vec<ProviderStatus> {
        ["duckduckgo", "serpapi", "tavily"]
            .into_iter()
            .map(|key| {
                let backend = self.build(key);
                ProviderStatus {
                    key: backend.key(),
                    name: backend.name().to_string(),
                    requires_credential: backend.requires_credential(),
                    configured: backend.validate_configuration().is_ok(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_keys() -> SearchBackendFactory {
        SearchBackendFactory::new(SearchSettings::default())
    }

    fn with_keys() -> SearchBackendFactory {
        SearchBackendFactory::new(SearchSettings {
            serpapi_api_key: Some("serp-key".into()),
            tavily_api_key: Some("tvly-key".into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_canonical_key_aliases() {
        assert_eq!(canonical_key("ddg"), Some("duckduckgo"));
        assert_eq!(canonical_key("Google"), Some("serpapi"));
        assert_eq!(canonical_key(" tavily "), Some("tavily"));
        assert_eq!(canonical_key("bing"), None);
    }

    #[test]
    fn test_named_without_key_is_unavailable() {
        let err = no_keys().create(Some("serpapi")).err().unwrap();
        assert!(matches!(err, Error::SearchProviderUnavailable { .. }));
        assert!(err.to_string().contains("SERPAPI_API_KEY"));
    }

    #[test]
    fn test_unknown_name() {
        let err = no_keys().create(Some("bing")).err().unwrap();
        match err {
            Error::UnknownSearchProvider { name, available } => {
                assert_eq!(name, "bing");
                assert!(available.contains("duckduckgo"));
                assert!(available.contains("tavily"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_auto_without_keys_falls_back_to_duckduckgo() {
        let backend = no_keys().create(None).unwrap();
        assert_eq!(backend.name(), "DuckDuckGo");

        let backend = no_keys().create(Some("AUTO")).unwrap();
        assert_eq!(backend.key(), "duckduckgo");
    }

    #[test]
    fn test_auto_prefers_tavily() {
        let backend = with_keys().create(None).unwrap();
        assert_eq!(backend.key(), "tavily");
    }

    #[test]
    fn test_named_alias_with_key() {
        let backend = with_keys().create(Some("google")).unwrap();
        assert_eq!(backend.name(), "SerpAPI (google)");
    }

    #[test]
    fn test_auto_fails_when_nothing_validates() {
        let factory = SearchBackendFactory::new(SearchSettings {
            preference: vec!["serpapi".into(), "tavily".into()],
            ..Default::default()
        });
        let err = factory.create(None).err().unwrap();
        assert!(matches!(err, Error::SearchProviderUnavailable { .. }));
    }

    #[test]
    fn test_create_default_uses_configured_provider() {
        let factory = SearchBackendFactory::new(SearchSettings {
            default_provider: Some("ddg".into()),
            tavily_api_key: Some("tvly-key".into()),
            ..Default::default()
        });
        assert_eq!(factory.create_default().unwrap().key(), "duckduckgo");
    }

    #[test]
    fn test_statuses() {
        let statuses = no_keys().statuses();
        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses[0].key, "duckduckgo");
        assert!(statuses[0].configured);
        assert!(!statuses[1].configured);
        assert!(statuses[2].requires_credential);
    }
}
