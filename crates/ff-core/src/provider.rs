use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::message::{Message, Usage};
use crate::tool::ToolDefinition;

/// One round-trip to the model: the conversation so far plus the tools it may call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    /// Falls back to the provider's default model when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tools: Vec<ToolDefinition>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            tools: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub usage: Usage,
    pub model: String,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Error,
}

/// A chat-completion backend the agent loop reasons with.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Model used when a request names none. `None` leaves it to the API.
    fn default_model(&self) -> Option<&str> {
        None
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new(vec![Message::user("Hello")])
            .with_model("gpt-4")
            .with_temperature(0.1);

        assert_eq!(request.model, Some("gpt-4".to_string()));
        assert_eq!(request.temperature, Some(0.1));
        assert!(request.tools.is_empty());
    }

    #[test]
    fn test_empty_fields_are_not_serialized() {
        let request = CompletionRequest::new(vec![Message::user("Hello")]);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("model").is_none());
        assert!(json.get("tools").is_none());
        assert!(json.get("temperature").is_none());
    }
}
