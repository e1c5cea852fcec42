//! HTTP surface over `UrlFinder`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use ff_agents::{
    AuxiliaryField, AuxiliaryFields, LookupResult, Reasoner, TemplateRegistry, UrlFinder,
};
use ff_core::Error;
use ff_search::SearchBackendFactory;

/// Shared, immutable pieces every request builds its own `UrlFinder` from.
#[derive(Clone)]
pub struct AppState {
    reasoner: Arc<dyn Reasoner>,
    factory: SearchBackendFactory,
    default_template: Option<u32>,
    llm_configured: bool,
}

impl AppState {
    pub fn new(reasoner: Arc<dyn Reasoner>, factory: SearchBackendFactory) -> Self {
        Self {
            reasoner,
            factory,
            default_template: None,
            llm_configured: true,
        }
    }

    pub fn with_default_template(mut self, template: Option<u32>) -> Self {
        self.default_template = template;
        self
    }

    pub fn with_llm_configured(mut self, configured: bool) -> Self {
        self.llm_configured = configured;
        self
    }

    fn finder(&self, search_provider: Option<&str>) -> Result<UrlFinder, Error> {
        let backend = match search_provider {
            Some(name) => self.factory.create(Some(name))?,
            None => self.factory.create_default()?,
        };
        Ok(UrlFinder::with_backend(
            Arc::clone(&self.reasoner),
            self.factory.clone(),
            backend,
        ))
    }
}

/// Lookup options. The GET route takes the same fields as query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct LookupRequest {
    #[serde(default)]
    pub foundation_name: String,
    pub ein: Option<String>,
    pub foundation_contact: Option<String>,
    pub foundation_address: Option<String>,
    pub foundation_city: Option<String>,
    pub foundation_website_text: Option<String>,
    pub prompt_variation: Option<u32>,
    pub search_provider: Option<String>,
}

impl LookupRequest {
    fn fields(&self) -> AuxiliaryFields {
        let pairs = [
            (AuxiliaryField::Ein, &self.ein),
            (AuxiliaryField::Contact, &self.foundation_contact),
            (AuxiliaryField::Address, &self.foundation_address),
            (AuxiliaryField::City, &self.foundation_city),
            (AuxiliaryField::WebsiteText, &self.foundation_website_text),
        ];
        AuxiliaryFields::filter(
            pairs
                .into_iter()
                .filter_map(|(field, value)| value.as_deref().map(|v| (field, v))),
        )
    }
}

/// A lookup error rendered as `{error, message}`.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = match &self.0 {
            Error::InvalidInput(_) => "invalid_input",
            Error::UnknownTemplate(_) => "unknown_template",
            Error::UnknownSearchProvider { .. } => "unknown_search_provider",
            Error::SearchProviderUnavailable { .. } => "search_provider_unavailable",
            _ => "internal_error",
        };
        let status = if self.0.is_caller_error() {
            StatusCode::BAD_REQUEST
        } else if matches!(self.0, Error::SearchProviderUnavailable { .. }) {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = json!({ "error": kind, "message": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/providers", get(providers))
        .route("/templates", get(templates))
        .route("/find-foundation-url", post(find_post))
        .route("/find-foundation-url/{foundation_name}", get(find_get))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!(addr = %listener.local_addr()?, "Foundation finder listening");

    axum::serve(listener, router(state))
        .await
        .context("HTTP server failed")
}

async fn root() -> Json<serde_json::Value> {
    let fields: Vec<_> = AuxiliaryField::ALL
        .iter()
        .map(|f| f.key())
        .filter(|k| *k != "foundation_name")
        .collect();

    Json(json!({
        "message": "Foundation URL Finder API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "providers": "/providers",
            "templates": "/templates",
            "find_foundation_url": "/find-foundation-url (POST)",
            "find_foundation_url_get": "/find-foundation-url/{foundation_name} (GET)",
        },
        "prompt_variations": TemplateRegistry::ids(),
        "foundation_data_fields": fields,
    }))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (status, message) = if state.llm_configured {
        ("healthy", "API is running and configured correctly")
    } else {
        ("unhealthy", "OpenAI API key not configured")
    };
    Json(json!({
        "status": status,
        "message": message,
        "model": state.reasoner.model(),
    }))
}

async fn providers(State(state): State<AppState>) -> Json<serde_json::Value> {
    let default = state
        .factory
        .create_default()
        .ok()
        .map(|backend| backend.name().to_string());
    Json(json!({
        "providers": state.factory.statuses(),
        "default": default,
    }))
}

async fn templates() -> Json<serde_json::Value> {
    Json(json!(TemplateRegistry::list()))
}

async fn find_post(
    State(state): State<AppState>,
    Json(request): Json<LookupRequest>,
) -> Result<Json<LookupResult>, ApiError> {
    lookup(&state, request).await
}

async fn find_get(
    State(state): State<AppState>,
    Path(foundation_name): Path<String>,
    Query(mut request): Query<LookupRequest>,
) -> Result<Json<LookupResult>, ApiError> {
    request.foundation_name = foundation_name;
    lookup(&state, request).await
}

async fn lookup(state: &AppState, request: LookupRequest) -> Result<Json<LookupResult>, ApiError> {
    if request.foundation_name.trim().is_empty() {
        return Err(Error::invalid_input("Foundation name cannot be empty").into());
    }

    let mut finder = state.finder(request.search_provider.as_deref())?;
    if let Some(id) = request.prompt_variation.or(state.default_template) {
        finder.switch_template(id)?;
    }
    finder.update_auxiliary_fields(request.fields());

    let result = finder.find(&request.foundation_name).await?;
    Ok(Json(result))
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "The requested endpoint was not found",
            "available_endpoints": ["/", "/health", "/providers", "/templates", "/find-foundation-url"],
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use ff_search::{SearchBackend, SearchSettings};
    use tower::ServiceExt;

    struct StubReasoner(&'static str);

    #[async_trait]
    impl Reasoner for StubReasoner {
        async fn run(
            &self,
            _prompt: &str,
            _organization: &str,
            _backend: Arc<dyn SearchBackend>,
        ) -> Result<String, Error> {
            Ok(self.0.to_string())
        }

        fn model(&self) -> &str {
            "stub-model"
        }
    }

    fn app(answer: &'static str) -> Router {
        let state = AppState::new(
            Arc::new(StubReasoner(answer)),
            SearchBackendFactory::new(SearchSettings::default()),
        );
        router(state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/find-foundation-url")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(""), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"], "stub-model");
    }

    #[tokio::test]
    async fn test_health_without_llm_key() {
        let state = AppState::new(
            Arc::new(StubReasoner("")),
            SearchBackendFactory::default(),
        )
        .with_llm_configured(false);
        let (_, body) = send(router(state), get("/health")).await;
        assert_eq!(body["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_templates_and_providers() {
        let (_, body) = send(app(""), get("/templates")).await;
        let ids: Vec<_> = body.as_array().unwrap().iter().map(|t| t["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(body[0].get("body").is_none());

        let (_, body) = send(app(""), get("/providers")).await;
        assert_eq!(body["providers"].as_array().unwrap().len(), 3);
        assert_eq!(body["default"], "DuckDuckGo");
    }

    #[tokio::test]
    async fn test_post_found() {
        let (status, body) = send(
            app("https://www.fordfoundation.org"),
            post_json(json!({"foundation_name": "Ford Foundation"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "https://www.fordfoundation.org");
        assert_eq!(body["success"], true);
        assert_eq!(body["prompt_variation"], 1);
        assert_eq!(body["foundation_data_used"], false);
        assert_eq!(body["search_provider"], "DuckDuckGo");
    }

    #[tokio::test]
    async fn test_post_with_foundation_data() {
        let (_, body) = send(
            app("https://www.fordfoundation.org"),
            post_json(json!({
                "foundation_name": "Ford Foundation",
                "ein": "13-1684331",
                "foundation_contact": "",
            })),
        )
        .await;
        assert_eq!(body["foundation_data_used"], true);
        assert_eq!(body["prompt_variation"], 4);
    }

    #[tokio::test]
    async fn test_post_not_found_is_still_ok() {
        let (status, body) = send(
            app("No official website found."),
            post_json(json!({"foundation_name": "Unknown Org"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(body["url"].is_null());
        assert_eq!(body["message"], "Unable to find foundation URL");
    }

    #[tokio::test]
    async fn test_caller_errors_are_400() {
        let (status, body) = send(app(""), post_json(json!({"foundation_name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");

        let (status, body) = send(
            app(""),
            post_json(json!({"foundation_name": "Ford Foundation", "prompt_variation": 9})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "unknown_template");

        let (status, body) = send(
            app(""),
            post_json(json!({"foundation_name": "Ford Foundation", "search_provider": "bing"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "unknown_search_provider");
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_503() {
        let (status, body) = send(
            app(""),
            post_json(json!({"foundation_name": "Ford Foundation", "search_provider": "tavily"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "search_provider_unavailable");
        assert!(body["message"].as_str().unwrap().contains("TAVILY_API_KEY"));
    }

    #[tokio::test]
    async fn test_get_route_with_query() {
        let (status, body) = send(
            app("https://www.fordfoundation.org"),
            get("/find-foundation-url/Ford%20Foundation?foundation_city=New%20York&prompt_variation=2"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["foundation_name"], "Ford Foundation");
        assert_eq!(body["prompt_variation"], 2);
        assert_eq!(body["foundation_data_used"], true);
    }

    #[tokio::test]
    async fn test_configured_template_applies_without_request_override() {
        let state = AppState::new(
            Arc::new(StubReasoner("https://www.fordfoundation.org")),
            SearchBackendFactory::default(),
        )
        .with_default_template(Some(3));
        let (_, body) = send(
            router(state),
            post_json(json!({"foundation_name": "Ford Foundation", "ein": "13-1684331"})),
        )
        .await;
        assert_eq!(body["prompt_variation"], 3);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = send(app(""), get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }
}
