/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::api::messages::{SendMessageForm, SendMessageResponse};
use crate::api::{self, messages, websocket, AppState};
use axum::{response::Json, routing::get, Router};
use chatapp_models::models::{EncodedMessage, HistoryRequest, Message};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        messages::send_message,
        websocket::websocket_handler,
        api::healthz,
        api::readyz,
        api::metrics,
    ),
    components(
        schemas(
            SendMessageForm,
            SendMessageResponse,
            Message,
            EncodedMessage,
            HistoryRequest,
        )
    ),
    tags(
        (name = "messages", description = "Posting chat messages"),
        (name = "websocket", description = "Live message stream and history requests"),
        (name = "health", description = "Liveness, readiness and metrics"),
    )
)]
pub struct ApiDoc;

/// Prefix the chat handlers are annotated with.
const DOCUMENTED_PREFIX: &str = "/chatapp";

/// Serves the OpenAPI document with chat paths moved under `prefix`.
pub fn configure_openapi(prefix: &str) -> Router<AppState> {
    let doc = api_doc(prefix);
    Router::new().route(
        "/docs/openapi.json",
        get(move || {
            let doc = doc.clone();
            async move { Json(doc) }
        }),
    )
}

/// Builds the document for chat routes mounted at `prefix` (already
/// normalized, empty for the root).
pub fn api_doc(prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if prefix == DOCUMENTED_PREFIX {
        return doc;
    }
    let paths = std::mem::take(&mut doc.paths.paths);
    doc.paths.paths = paths
        .into_iter()
        .map(|(path, item)| (rebase_path(&path, prefix), item))
        .collect();
    doc
}

fn rebase_path(path: &str, prefix: &str) -> String {
    match path.strip_prefix(DOCUMENTED_PREFIX) {
        Some(rest) if rest.starts_with('/') => format!("{}{}", prefix, rest),
        _ => path.to_string(),
    }
}
