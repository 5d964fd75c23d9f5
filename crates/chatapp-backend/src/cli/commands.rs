/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::api::{self, AppState, ChatOptions};
use crate::db::create_dal;
use crate::metrics;
use crate::utils;
use chatapp_models::models::{HistoryRequest, NewMessage};
use chatapp_utils::config::Settings;
use chatapp_utils::logging::prelude::*;

/// Function to start the chat backend server
///
/// Connects to the store, configures API routes, and serves until Ctrl-C or
/// SIGTERM, then shuts down gracefully.
pub async fn serve(config: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting chatapp backend");

    // Register metrics before the first request so /metrics is complete
    metrics::init();

    info!("Connecting to {:?} store", config.store.backend);
    let dal = create_dal(config).await?;
    info!("Message store ready");

    // Configure API routes
    info!("Configuring API routes");
    let state = AppState::new(dal, config);
    let app = api::configure_api_routes(config).with_state(state);

    let addr = config.server.bind_address.as_str();
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Set up shutdown signal handler
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        utils::wait_for_signal().await;
        shutdown_tx.send(()).ok();
    });

    info!("Chatapp backend is now running");
    axum::serve(listener, app)
        .with_graceful_shutdown(utils::shutdown(shutdown_rx))
        .await?;

    info!("Chatapp backend stopped");
    Ok(())
}

/// Returns the encoded history slice `first..=last`.
///
/// The configured history window applies exactly as it does for websocket
/// clients.
pub async fn history(
    config: &Settings,
    first: i64,
    last: i64,
) -> Result<String, Box<dyn std::error::Error>> {
    info!("Reading history {}..={}", first, last);
    let dal = create_dal(config).await?;
    let payload = dal
        .messages()
        .history_payload(HistoryRequest::new(first, last))
        .await?;
    Ok(payload)
}

/// Stores a message through the DAL, broadcasting it to connected clients,
/// and returns its id.
pub async fn post(
    config: &Settings,
    content: String,
    name: Option<String>,
    email: Option<String>,
    topic: Option<String>,
) -> Result<u64, Box<dyn std::error::Error>> {
    let options = ChatOptions::from(&config.chat);
    let new_message = NewMessage::new(name, email, topic, Some(content), &options.defaults);
    new_message.check_content_length(options.max_content_length)?;

    let dal = create_dal(config).await?;
    let message = dal.messages().send(new_message).await?;
    info!("Posted message {} on topic {}", message.id, message.topic);
    Ok(message.id)
}
