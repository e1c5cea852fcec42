//! Tool-calling agent loop.
//!
//! An agent sends its conversation to a `Provider`, executes any tool calls
//! the model asks for, feeds the results back, and stops at the first reply
//! without tool calls. The lookup only ever needs one-shot runs, so agents
//! keep no history between calls.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Error;
use crate::message::{Message, ToolCall, Usage};
use crate::provider::{CompletionRequest, Provider};
use crate::tool::ToolRegistry;

/// Configuration for an agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Name used in logs.
    pub name: String,
    /// System prompt for the agent.
    pub system_prompt: Option<String>,
    /// Maximum agentic loop iterations.
    pub max_iterations: usize,
    /// Model override; falls back to the provider default.
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl AgentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: None,
            max_iterations: 10,
            model: None,
            temperature: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// An LLM-powered agent bound to a provider and a tool set.
pub struct Agent;

impl Agent {
    /// Run a one-shot task.
    ///
    /// The agent runs until it produces a final response (no tool calls) and
    /// returns that response's text. Exceeding `max_iterations` is an error.
    pub async fn run_once(
        provider: Arc<dyn Provider>,
        tools: &ToolRegistry,
        config: &AgentConfig,
        context: Vec<Message>,
    ) -> Result<String, Error> {
        debug!(
            agent = %config.name,
            context_messages = context.len(),
            tools_available = tools.len(),
            "Agent run_once starting"
        );

        let mut messages = Vec::with_capacity(context.len() + 1);
        if let Some(system) = &config.system_prompt {
            messages.push(Message::system(system.as_str()));
        }
        messages.extend(context);

        let mut usage = Usage::default();

        for iteration in 0..config.max_iterations {
            debug!(
                agent = %config.name,
                iteration = iteration,
                message_count = messages.len(),
                "Agent iteration starting"
            );

            let mut request = CompletionRequest::new(messages.clone()).with_tools(tools.definitions());
            if let Some(model) = &config.model {
                request = request.with_model(model.as_str());
            }
            if let Some(temperature) = config.temperature {
                request = request.with_temperature(temperature);
            }

            let response = provider.complete(request).await?;
            usage.add(&response.usage);

            let tool_calls = response.message.tool_calls;
            if !tool_calls.is_empty() {
                debug!(
                    agent = %config.name,
                    tool_count = tool_calls.len(),
                    "Agent executing tools"
                );

                // Drop any interim text; only the calls matter to the next turn.
                messages.push(Message::assistant_with_tool_calls("", tool_calls.clone()));

                for tool_call in &tool_calls {
                    debug!(agent = %config.name, tool = %tool_call.name, "Executing tool");
                    let result = execute_tool(tools, tool_call).await?;
                    messages.push(Message::tool_result(&tool_call.id, result));
                }

                continue;
            }

            debug!(
                agent = %config.name,
                iterations = iteration + 1,
                response_len = response.message.content.len(),
                total_tokens = usage.total_tokens,
                "Agent completed successfully"
            );
            return Ok(response.message.content);
        }

        Err(Error::Unknown(format!(
            "Agent {} exceeded max iterations ({})",
            config.name, config.max_iterations
        )))
    }
}

/// Execute a single tool call.
///
/// Misuse (unknown tool, bad arguments, a reported tool failure) goes back to
/// the model as text. Service errors end the run.
async fn execute_tool(registry: &ToolRegistry, tool_call: &ToolCall) -> Result<String, Error> {
    let Some(tool) = registry.get(&tool_call.name) else {
        return Ok(format!("Error: Unknown tool '{}'", tool_call.name));
    };

    match tool.execute(tool_call.arguments.clone()).await {
        Ok(output) if output.is_error => Ok(format!("Error: {}", output.content)),
        Ok(output) => Ok(output.content),
        Err(e) if e.is_service_error() => {
            warn!(tool = %tool_call.name, error = %e, "Tool failed talking to its service");
            Err(e)
        }
        Err(e) => Ok(format!("Error executing tool: {}", e)),
    }
}
