//! ff-agents: the foundation URL lookup.
//!
//! This crate provides:
//! - `AuxiliaryFields`: optional identifying data, filtered of blanks
//! - `TemplateRegistry`: the prompt template variations
//! - `build_prompt` and `extract_url`: text in, text out
//! - `Reasoner`: the bounded agent run, with `AgentReasoner` as the LLM-backed default
//! - `UrlFinder`: the facade tying them together

pub mod extract;
pub mod fields;
pub mod finder;
pub mod prompt;
pub mod reasoner;
pub mod templates;

pub use extract::extract_url;
pub use fields::{AuxiliaryField, AuxiliaryFields};
pub use finder::{ConfigurationSummary, LookupResult, UrlFinder};
pub use prompt::{build_prompt, render_fields_block};
pub use reasoner::{AgentReasoner, Reasoner};
pub use templates::{TemplateDescriptor, TemplateRegistry, DATA_AWARE_TEMPLATE_ID};
