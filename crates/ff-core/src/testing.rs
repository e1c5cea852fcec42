//! Scripted provider for tests. Compiled for `cfg(test)` or the `testing` feature.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::error::Error;
use crate::message::{Message, ToolCall, Usage};
use crate::provider::{CompletionRequest, CompletionResponse, FinishReason, Provider};

type Scripted = Result<CompletionResponse, Error>;

/// Replays queued completions in order and records every request it sees.
#[derive(Default)]
pub struct MockProvider {
    script: Mutex<VecDeque<Scripted>>,
    seen: Mutex<Vec<CompletionRequest>>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // a panicking test poisons the lock; the data is still usable
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain assistant text, finishing the turn.
    pub fn queue_response(&self, content: &str) {
        self.queue_raw_response(CompletionResponse {
            message: Message::assistant(content),
            usage: Usage::default(),
            model: "mock-model".to_string(),
            finish_reason: FinishReason::Stop,
        });
    }

    /// An assistant turn that asks for a single tool call.
    pub fn queue_tool_call(&self, tool: &str, arguments: serde_json::Value) {
        let id = format!("call_{}", guard(&self.script).len() + 1);
        self.queue_raw_response(CompletionResponse {
            message: Message::assistant_with_tool_calls("", vec![ToolCall::new(id, tool, arguments)]),
            usage: Usage::default(),
            model: "mock-model".to_string(),
            finish_reason: FinishReason::ToolCalls,
        });
    }

    pub fn queue_raw_response(&self, response: CompletionResponse) {
        guard(&self.script).push_back(Ok(response));
    }

    pub fn queue_error(&self, error: Error) {
        guard(&self.script).push_back(Err(error));
    }

    /// Snapshot of the requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        guard(&self.seen).clone()
    }

    pub fn request_count(&self) -> usize {
        guard(&self.seen).len()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        guard(&self.seen).last().cloned()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, Error> {
        guard(&self.seen).push(request);
        guard(&self.script)
            .pop_front()
            .unwrap_or_else(|| Err(Error::Unknown("mock provider script exhausted".to_string())))
    }
}
