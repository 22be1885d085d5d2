pub mod bridge;
pub mod config;
pub mod error;
pub mod handlers;
pub mod types;

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Response, StatusCode};
use axum::routing::{any, get, post};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

/// Assemble the bridge service router. Config is injected so tests can
/// point the bridge at a mock legacy server.
pub fn app(config: AppConfig) -> Router {
    let state = AppState { config: Arc::new(config) };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/api/login", post(handlers::login_post))
        .route("/auth/api/proxy", any(handlers::proxy))
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "HTNS Auth Bridge",
            "version": version,
            "description": "Session bridge for the legacy HTNS portal (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "/auth/api/login (public - session acquisition)",
                "proxy": "/auth/api/proxy?path=... (session replay against the legacy server)",
            }
        }
    }))
}

async fn health() -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}

/// Outermost boundary: a panic anywhere in a handler becomes the generic
/// internal-error body instead of a dropped connection or a stack trace.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "handler panicked");

    let body = json!({
        "success": false,
        "message": "server error occurred",
        "code": "INTERNAL_ERROR",
    })
    .to_string();

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_default()
}
