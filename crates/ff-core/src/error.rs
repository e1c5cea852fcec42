use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Tool error: {tool} - {message}")]
    Tool { tool: String, message: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Prompt template {0} not found")]
    UnknownTemplate(u32),

    #[error("Unknown search provider: {name}. Available providers: {available}")]
    UnknownSearchProvider { name: String, available: String },

    #[error("Search provider {provider} is unavailable: {reason}")]
    SearchProviderUnavailable { provider: String, reason: String },

    /// The reasoning service answered, but the answer holds no usable URL.
    #[error("{0}")]
    NoAnswer(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn unknown_search_provider(name: impl Into<String>, available: &[&str]) -> Self {
        Self::UnknownSearchProvider {
            name: name.into(),
            available: available.join(", "),
        }
    }

    pub fn search_provider_unavailable(
        provider: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::SearchProviderUnavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn no_answer(message: impl Into<String>) -> Self {
        Self::NoAnswer(message.into())
    }

    /// Failures talking to the reasoning service or a search backend.
    /// `Tool` is not one: it reports the model misusing a tool.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            Error::Api { .. }
                | Error::Auth(_)
                | Error::RateLimit(_)
                | Error::InvalidRequest(_)
                | Error::Network(_)
                | Error::Serialization(_)
                | Error::Timeout(_)
                | Error::Unknown(_)
        )
    }

    /// Programming errors on the caller's side. Never retried, never defaulted.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::UnknownTemplate(_) | Error::UnknownSearchProvider { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
