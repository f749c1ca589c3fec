//! HTTP API gateway for chatgate.
//!
//! Exposes the chat, image and audio endpoints under `/api/chat` plus a
//! health check. Built on Axum.

pub mod api;
pub mod error;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::extract::State;
use axum::{Router, response::Json, routing::get};
use chatgate_agent::Assistant;
use chatgate_config::{AppConfig, GatewayConfig};
use chatgate_core::memory::ChatMemory;
use chatgate_memory::WindowMemory;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

pub use api::{ApiState, SharedApiState};
pub use error::{ApiError, ErrorResponse};

/// Build the full router.
///
/// Layers applied:
/// - CORS restricted to configured origins (default: the gateway's own origin)
/// - Request body size limit (`gateway.max_upload_bytes`)
/// - HTTP trace logging
pub fn build_router(state: SharedApiState) -> Router {
    let gateway = state.assistant.config().gateway.clone();

    Router::new()
        .route("/health", get(health_handler))
        .with_state(state.clone())
        .merge(api::chat_router(state))
        .layer(DefaultBodyLimit::max(gateway.max_upload_bytes))
        .layer(cors_layer(&gateway))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(gateway: &GatewayConfig) -> CorsLayer {
    let configured = if gateway.allowed_origins.is_empty() {
        vec![format!("http://localhost:{}", gateway.port)]
    } else {
        gateway.allowed_origins.clone()
    };

    let origins: Vec<HeaderValue> = configured
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Wire the providers, memory store, tools and assistant from `config`.
///
/// The memory store is built exactly once here and shared by every request.
pub fn build_state(config: AppConfig) -> SharedApiState {
    let providers = chatgate_providers::build_from_config(&config);
    let memory: Arc<dyn ChatMemory> = Arc::new(WindowMemory::new(config.memory.window_size));
    let tools = Arc::new(chatgate_tools::default_registry());
    let assistant = Assistant::new(config, providers, memory, tools);
    Arc::new(ApiState::new(Arc::new(assistant)))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let window_size = config.memory.window_size;
    let model = config.default_model.clone();

    let app = build_router(build_state(config));

    info!(addr = %addr, model = %model, window_size, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: i64,
    provider: ProviderHealth,
}

#[derive(Serialize)]
struct ProviderHealth {
    name: String,
    reachable: bool,
}

/// The gateway itself is up whenever this answers; `provider.reachable`
/// reports the upstream chat API separately.
async fn health_handler(State(state): State<SharedApiState>) -> Json<HealthResponse> {
    let uptime = chrono::Utc::now() - state.start_time;
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: uptime.num_seconds(),
        provider: ProviderHealth {
            name: state.assistant.provider_name().to_string(),
            reachable: state.assistant.provider_healthy().await,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(build_state(AppConfig::default()));

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_secs"].as_i64().unwrap() >= 0);
        assert_eq!(json["provider"]["name"], "openai");
        // No API key in the default config.
        assert_eq!(json["provider"]["reachable"], false);
    }

    #[tokio::test]
    async fn missing_api_key_reports_service_unavailable() {
        let app = build_router(build_state(AppConfig::default()));

        for uri in [
            "/api/chat/messages?question=hi",
            "/api/chat/messages/chat-memory?conversationId=c1&question=hi",
            "/api/chat/images/generate/url?query=a%20cat",
            "/api/chat/text-to-speech?text=hello",
        ] {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{uri}");
            let body = response.into_body().collect().await.unwrap().to_bytes();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["status"], 503);
            assert!(json["errors"][0].as_str().unwrap().contains("not configured"));
        }
    }

    #[tokio::test]
    async fn welcome_is_mounted() {
        let app = build_router(build_state(AppConfig::default()));
        let req = Request::builder()
            .uri("/api/chat")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let mut config = AppConfig::default();
        config.gateway.max_upload_bytes = 16;
        let app = build_router(build_state(config));

        let boundary = "B";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\nContent-Type: image/png\r\n\r\n{}\r\n--{boundary}--\r\n",
            "x".repeat(64)
        );
        let req = Request::builder()
            .method("POST")
            .uri("/api/chat/images/describe")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn invalid_cors_origins_are_skipped() {
        let mut gateway = GatewayConfig::default();
        gateway.allowed_origins = vec!["http://ok.example".into(), "bad\norigin".into()];
        // Must not panic.
        let _ = cors_layer(&gateway);
    }
}
