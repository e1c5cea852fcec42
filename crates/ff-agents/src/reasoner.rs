//! The reasoning call: one opaque, bounded agent run per lookup.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use ff_core::{Agent, AgentConfig, Error, Message, Provider, ToolRegistry};
use ff_search::{create_lookup_tools, SearchBackend};

/// Answers a lookup prompt with free text.
///
/// Implementations must not retry internally; a failed run is reported once.
#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn run(
        &self,
        prompt: &str,
        organization: &str,
        backend: Arc<dyn SearchBackend>,
    ) -> Result<String, Error>;

    /// Model name for health reporting.
    fn model(&self) -> &str;
}

/// A tool-calling LLM agent with `web_search` and `validate_url`.
pub struct AgentReasoner {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_iterations: usize,
    timeout: Duration,
}

impl AgentReasoner {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        let model = provider.default_model().unwrap_or("gpt-4").to_string();
        Self {
            provider,
            model,
            temperature: 0.1,
            max_iterations: 10,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn lookup_request(organization: &str) -> String {
    format!(
        "I am looking for the homepage URL of the organization: '{organization}'. \
         Please search for the official website and return only the URL."
    )
}

#[async_trait]
impl Reasoner for AgentReasoner {
    async fn run(
        &self,
        prompt: &str,
        organization: &str,
        backend: Arc<dyn SearchBackend>,
    ) -> Result<String, Error> {
        let mut tools = ToolRegistry::new();
        for tool in create_lookup_tools(backend) {
            tools.register(tool);
        }

        let config = AgentConfig::new("url-finder")
            .with_system_prompt(prompt)
            .with_model(self.model.as_str())
            .with_temperature(self.temperature)
            .with_max_iterations(self.max_iterations);

        debug!(organization = %organization, model = %self.model, "Starting reasoning run");
        let run = Agent::run_once(
            Arc::clone(&self.provider),
            &tools,
            &config,
            vec![Message::user(lookup_request(organization))],
        );

        let answer = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| {
                Error::timeout(format!(
                    "reasoning run exceeded {}s",
                    self.timeout.as_secs()
                ))
            })??;

        info!(organization = %organization, answer = %answer.trim(), "Reasoning run finished");
        Ok(answer)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_core::testing::MockProvider;
    use ff_core::{CompletionRequest, CompletionResponse};
    use ff_search::SearchHit;

    struct StaticBackend;

    #[async_trait]
    impl SearchBackend for StaticBackend {
        fn key(&self) -> &'static str {
            "duckduckgo"
        }
        fn name(&self) -> &str {
            "Static"
        }
        fn requires_credential(&self) -> bool {
            false
        }
        fn validate_configuration(&self) -> Result<(), Error> {
            Ok(())
        }
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, Error> {
            Ok(vec![SearchHit::new(
                "Ford Foundation",
                "https://www.fordfoundation.org/",
                "",
            )])
        }
    }

    /// A backend whose credential the service rejects.
    struct RejectedKeyBackend;

    #[async_trait]
    impl SearchBackend for RejectedKeyBackend {
        fn key(&self) -> &'static str {
            "tavily"
        }
        fn name(&self) -> &str {
            "Tavily (advanced)"
        }
        fn requires_credential(&self) -> bool {
            true
        }
        fn validate_configuration(&self) -> Result<(), Error> {
            Ok(())
        }
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, Error> {
            Err(Error::auth("Tavily: invalid API key"))
        }
    }

    /// Never answers within any reasonable bound.
    struct StalledProvider;

    #[async_trait]
    impl Provider for StalledProvider {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, Error> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(Error::Unknown("woke up".to_string()))
        }
    }

    #[tokio::test]
    async fn test_run_uses_prompt_tools_and_user_request() {
        let provider = Arc::new(MockProvider::new());
        provider.queue_tool_call(
            "web_search",
            serde_json::json!({"query": "Ford Foundation official website"}),
        );
        provider.queue_response("https://www.fordfoundation.org/");

        let reasoner = AgentReasoner::new(provider.clone()).with_model("gpt-4o-mini");
        let answer = reasoner
            .run("SYSTEM PROMPT", "Ford Foundation", Arc::new(StaticBackend))
            .await
            .unwrap();
        assert_eq!(answer, "https://www.fordfoundation.org/");
        assert_eq!(provider.request_count(), 2);

        let first = provider.requests().remove(0);
        assert_eq!(first.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(first.messages[0].content, "SYSTEM PROMPT");
        assert!(first.messages[1].content.contains("'Ford Foundation'"));
        let tool_names: Vec<_> = first.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tool_names, vec!["validate_url", "web_search"]);

        // The search hit reached the model as a tool result.
        let second = provider.last_request().unwrap();
        assert!(second
            .messages
            .iter()
            .any(|m| m.content.contains("https://www.fordfoundation.org/")));
    }

    #[tokio::test]
    async fn test_service_error_is_not_retried() {
        let provider = Arc::new(MockProvider::new());
        provider.queue_error(Error::auth("invalid api key"));

        let reasoner = AgentReasoner::new(provider.clone());
        let err = reasoner
            .run("prompt", "Ford Foundation", Arc::new(StaticBackend))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(provider.request_count(), 1);
    }

    #[test]
    fn test_default_model() {
        let reasoner = AgentReasoner::new(Arc::new(MockProvider::new()));
        assert_eq!(reasoner.model(), "gpt-4");
    }

    #[tokio::test]
    async fn test_search_backend_failure_is_a_service_error() {
        let provider = Arc::new(MockProvider::new());
        provider.queue_tool_call(
            "web_search",
            serde_json::json!({"query": "Ford Foundation official website"}),
        );
        provider.queue_response("NOT FOUND");

        let reasoner = AgentReasoner::new(provider.clone());
        let err = reasoner
            .run("prompt", "Ford Foundation", Arc::new(RejectedKeyBackend))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Auth(_)));
        assert!(err.is_service_error());
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_is_bounded_by_timeout() {
        let reasoner =
            AgentReasoner::new(Arc::new(StalledProvider)).with_timeout(Duration::from_secs(5));
        let err = reasoner
            .run("prompt", "Ford Foundation", Arc::new(StaticBackend))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout(_)));
        assert!(err.to_string().contains("5s"));
    }
}
