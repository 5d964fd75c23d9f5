/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # API Routes Aggregator Module
//!
//! Builds the application router: the chat routes under the configured prefix,
//! plus health, readiness, metrics and OpenAPI endpoints at the root.

pub mod messages;
pub mod middleware;
pub mod openapi;
pub mod websocket;

use crate::dal::DAL;
use axum::extract::{FromRef, State};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::from_fn;
use axum::{response::IntoResponse, routing::get, Router};
use chatapp_models::models::MessageDefaults;
use chatapp_utils::config::{Chat, Cors, Settings};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub dal: DAL,
    pub chat: Arc<ChatOptions>,
}

/// The parts of the `chat` settings handlers need per request.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub max_content_length: usize,
    pub keepalive: Duration,
    pub defaults: MessageDefaults,
}

impl From<&Chat> for ChatOptions {
    fn from(chat: &Chat) -> Self {
        ChatOptions {
            max_content_length: chat.max_content_length,
            keepalive: Duration::from_secs(chat.keepalive_seconds.max(1)),
            defaults: MessageDefaults {
                name: chat.default_name.clone(),
                email: chat.default_email.clone(),
                topic: chat.default_topic.clone(),
            },
        }
    }
}

impl AppState {
    pub fn new(dal: DAL, settings: &Settings) -> Self {
        AppState {
            dal,
            chat: Arc::new(ChatOptions::from(&settings.chat)),
        }
    }
}

impl FromRef<AppState> for DAL {
    fn from_ref(state: &AppState) -> Self {
        state.dal.clone()
    }
}

/// Configures and returns the main application router with all API routes.
///
/// The caller supplies the state with `.with_state(AppState::new(..))`.
pub fn configure_api_routes(settings: &Settings) -> Router<AppState> {
    let prefix = settings.server.normalized_prefix();
    info!("Mounting chat routes under '{}'", prefix);

    let chat_routes = Router::new()
        .merge(messages::routes())
        .merge(websocket::routes());

    let router = if prefix.is_empty() {
        Router::new().merge(chat_routes)
    } else {
        Router::new().nest(&prefix, chat_routes)
    };

    let mut router = router
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .merge(openapi::configure_openapi(&prefix))
        .route_layer(from_fn(middleware::track_metrics));

    if let Some(dir) = &settings.server.static_dir {
        info!("Serving static files from {}", dir);
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&settings.cors))
}

/// Builds the CORS layer. A `*` entry in `allowed_origins` allows any origin;
/// entries that are not valid header values are skipped with a warning.
pub fn cors_layer(cors: &Cors) -> CorsLayer {
    let origins = if cors.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let values: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin '{}'", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| match Method::from_bytes(m.trim().as_bytes()) {
            Ok(method) => Some(method),
            Err(_) => {
                warn!("Ignoring invalid CORS method '{}'", m);
                None
            }
        })
        .collect();

    let headers: Vec<HeaderName> = cors
        .allowed_headers
        .iter()
        .filter_map(|h| match HeaderName::from_bytes(h.trim().as_bytes()) {
            Ok(header) => Some(header),
            Err(_) => {
                warn!("Ignoring invalid CORS header '{}'", h);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .max_age(Duration::from_secs(cors.max_age_seconds))
}

/// Health check endpoint handler
///
/// Returns a 200 OK status code with "OK" in the body.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses((status = 200, description = "Process is up", body = String))
)]
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Ready check endpoint handler
///
/// Ready once the message store answers a ping.
#[utoipa::path(
    get,
    path = "/readyz",
    tag = "health",
    responses(
        (status = 200, description = "Store reachable", body = String),
        (status = 503, description = "Store unreachable", body = String),
    )
)]
pub async fn readyz(State(dal): State<DAL>) -> impl IntoResponse {
    match dal.ping().await {
        Ok(()) => (StatusCode::OK, "Ready"),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Not Ready")
        }
    }
}

/// Metrics endpoint handler
///
/// Returns all registered metrics in Prometheus text format.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "health",
    responses((status = 200, description = "Prometheus exposition", body = String))
)]
pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        crate::metrics::encode_metrics(),
    )
}
