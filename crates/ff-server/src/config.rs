use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use ff_search::SearchSettings;

const ENV_PREFIX: &str = "FOUNDATION_FINDER_";

/// Conventional environment variables and the settings they feed.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "llm.api_key"),
    ("OPENAI_BASE_URL", "llm.base_url"),
    ("SERPAPI_API_KEY", "search.serpapi_api_key"),
    ("TAVILY_API_KEY", "search.tavily_api_key"),
    ("DEFAULT_SEARCH_PROVIDER", "search.default_provider"),
    ("MAX_SEARCH_RESULTS", "search.max_results"),
    ("SEARCH_TIMEOUT", "search.timeout_secs"),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Template used for every lookup unless the request names one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_variation: Option<u32>,
}

/// The OpenAI-compatible chat model driving the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    pub model: String,
    pub temperature: f32,
    pub max_iterations: usize,

    /// Bound on one whole agent run, in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: "gpt-4".to_string(),
            temperature: 0.1,
            max_iterations: 10,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Backend name, alias, or "auto"
    pub default_provider: String,

    /// Auto-selection order
    pub preference: Vec<String>,

    pub max_results: usize,
    pub timeout_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serpapi_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tavily_api_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let settings = SearchSettings::default();
        Self {
            default_provider: "auto".to_string(),
            preference: settings.preference,
            max_results: settings.max_results,
            timeout_secs: settings.timeout.as_secs(),
            serpapi_api_key: None,
            tavily_api_key: None,
        }
    }
}

impl SearchConfig {
    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            max_results: self.max_results,
            timeout: Duration::from_secs(self.timeout_secs),
            serpapi_api_key: self.serpapi_api_key.clone(),
            tavily_api_key: self.tavily_api_key.clone(),
            preference: self.preference.clone(),
            default_provider: Some(self.default_provider.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Default config file: `~/.config/foundation-finder/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("foundation-finder").join("config.toml"))
}

impl Config {
    /// Layered sources, lowest priority first: defaults, TOML file,
    /// conventional env vars, then `FOUNDATION_FINDER_*` (`__` nests).
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) {
            figment = figment.merge(Toml::file(path));
        }

        let legacy_names: Vec<&str> = LEGACY_ENV.iter().map(|(env, _)| *env).collect();
        figment
            .merge(Env::raw().only(&legacy_names).map(|key| {
                LEGACY_ENV
                    .iter()
                    .find(|(env, _)| key.as_str().eq_ignore_ascii_case(env))
                    .map(|(_, target)| *target)
                    .unwrap_or(key.as_str())
                    .to_string()
                    .into()
            }))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
        }

        Self::figment(path)
            .extract()
            .context("Failed to load configuration")
    }
}
