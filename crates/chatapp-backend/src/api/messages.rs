/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Message API endpoints.
//!
//! Browsers post the chat form here; the stored message is then broadcast to
//! every open websocket session.

use crate::api::AppState;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::{routing::post, Json, Router};
use chatapp_models::models::NewMessage;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Creates and returns the router for message endpoints.
pub fn routes() -> Router<AppState> {
    info!("Setting up message routes");
    Router::new().route("/send", post(send_message))
}

/// Form fields accepted by `/send`. Missing sender fields take the configured
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SendMessageForm {
    pub topic: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub content: Option<String>,
}

/// Response body for a stored message.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SendMessageResponse {
    /// Id assigned to the message
    pub id: u64,
}

/// Stores a chat message and broadcasts it to connected clients.
#[utoipa::path(
    post,
    path = "/chatapp/send",
    tag = "messages",
    request_body(content = SendMessageForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Message stored and broadcast", body = SendMessageResponse),
        (status = 400, description = "Content exceeds the configured limit"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Form(form): Form<SendMessageForm>,
) -> Result<Json<SendMessageResponse>, (StatusCode, Json<serde_json::Value>)> {
    let new_message = NewMessage::new(
        form.name,
        form.email,
        form.topic,
        form.content,
        &state.chat.defaults,
    );

    if let Err(e) = new_message.check_content_length(state.chat.max_content_length) {
        warn!("Rejecting message: {}", e);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e})),
        ));
    }

    match state.dal.messages().send(new_message).await {
        Ok(message) => {
            info!("Stored message {} on topic {}", message.id, message.topic);
            Ok(Json(SendMessageResponse { id: message.id }))
        }
        Err(e) => {
            error!("Failed to store message: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to store message"})),
            ))
        }
    }
}
