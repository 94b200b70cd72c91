//! HTTP server entry point and Axum router setup.
//!
//! Initializes the server state (agent, model, tools), configures routes,
//! and starts the Axum server.

mod dto;
mod error;
mod handlers;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use buddy_core::ModelConfig;
use buddy_engine::Agent;
use buddy_llm::{list_models, GEMINI_OPENAI_BASE};
use buddy_tools::ToolRegistry;

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_PORT: u16 = 5000;

/// Shared server state accessible from all handlers.
pub struct ServerState {
    pub agent: Agent,
    pub model: ModelConfig,
    pub api_key: String,
    pub tool_registry: Arc<ToolRegistry>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .compact()
        .init();

    let state = Arc::new(init_server_state().await);

    let app = build_router(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = format!("0.0.0.0:{}", port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router with CORS and request tracing.
fn build_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/", get(handlers::home::home))
        .route("/chat", post(handlers::chat::chat))
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

/// Initializes the server state: model config, API key check, agent, and tools.
async fn init_server_state() -> ServerState {
    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
        warn!("GEMINI_API_KEY is not set; chat requests will fail");
        String::new()
    });

    let api_base =
        std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| GEMINI_OPENAI_BASE.to_string());
    let model_name = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

    let model = ModelConfig {
        id: format!("gemini-{}", model_name.trim_start_matches("gemini-")),
        name: format!("{} (Gemini)", model_name),
        model: model_name,
        api_base: Some(api_base.clone()),
        temperature: Some(0.4),
    };

    if !api_key.is_empty() {
        match list_models(&api_base, &api_key).await {
            Ok(models) => {
                info!("Gemini endpoint reachable ({} models available)", models.len());
            }
            Err(e) => {
                warn!("Gemini endpoint check failed (is the API key valid?): {}", e);
            }
        }
    }

    let tool_registry = Arc::new(ToolRegistry::with_defaults());
    info!("Registered {} tools", tool_registry.list().len());

    let agent = Agent::new(
        "Buddy",
        "Health Companion",
        "Support users emotionally and give basic health advice",
        "Buddy is a friendly AI health companion that supports users with gentle advice.",
    )
    .with_tools(tool_registry.tool_names());

    info!("Agent '{}' ready with model {}", agent.name, model.name);

    ServerState {
        agent,
        model,
        api_key,
        tool_registry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> Arc<ServerState> {
        let tool_registry = Arc::new(ToolRegistry::with_defaults());
        let agent = Agent::new(
            "Buddy",
            "Health Companion",
            "Support users emotionally and give basic health advice",
            "Buddy is a friendly AI health companion that supports users with gentle advice.",
        )
        .with_tools(tool_registry.tool_names());

        Arc::new(ServerState {
            agent,
            model: ModelConfig {
                id: "gemini-flash".into(),
                name: "Gemini 2.5 Flash".into(),
                model: "gemini-2.5-flash".into(),
                api_base: Some(GEMINI_OPENAI_BASE.into()),
                temperature: Some(0.4),
            },
            api_key: "test-key".into(),
            tool_registry,
        })
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chat_malformed_body_returns_backend_error() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::post("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["reply"]
            .as_str()
            .unwrap()
            .starts_with("Backend error: "));
    }

    #[tokio::test]
    async fn test_home_returns_html_page() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/html"));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Buddy"));
    }
}
