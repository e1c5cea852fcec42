//! ff-providers: LLM provider implementations for foundation-finder
//!
//! This crate provides implementations of the Provider trait for chat-completion APIs.

pub mod openai;

pub use openai::OpenAIProvider;
