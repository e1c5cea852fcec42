//! ff-search: Web search backends for foundation-finder
//!
//! This crate provides:
//! - `SearchBackend`: the uniform "search the web for a query" capability
//! - Backends: DuckDuckGo (no key), SerpAPI and Tavily (keyed)
//! - `SearchBackendFactory`: credential-aware backend selection
//! - Agent tools: `web_search` and `validate_url`

pub mod backend;
pub mod duckduckgo;
pub mod factory;
pub mod serpapi;
pub mod tavily;
pub mod tools;

pub use backend::{SearchBackend, SearchHit};
pub use duckduckgo::DuckDuckGoBackend;
pub use factory::{ProviderStatus, SearchBackendFactory, SearchSettings};
pub use serpapi::SerpApiBackend;
pub use tavily::TavilyBackend;
pub use tools::{create_lookup_tools, ValidateUrlTool, WebSearchTool};
