/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! WebSocket sessions.
//!
//! Each session subscribes to the message bus and then waits on three things
//! at once: history requests from the client, broadcast payloads from the bus,
//! and a keepalive timer that pings the client. The session ends when the
//! client closes, the socket errors, a send fails, or the bus goes away.

use crate::api::AppState;
use crate::dal::DAL;
use crate::metrics;
use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use chatapp_models::models::HistoryRequest;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Creates and returns the router for the websocket endpoint.
pub fn routes() -> Router<AppState> {
    info!("Setting up websocket routes");
    Router::new().route("/websocket", get(websocket_handler))
}

/// Upgrades the connection and runs a chat session on it.
///
/// After the upgrade the client may send `{"first_id": F, "last_id": L}`
/// text frames and receives JSON arrays of encoded messages: replies to its
/// own history requests, and every newly sent message.
#[utoipa::path(
    get,
    path = "/chatapp/websocket",
    tag = "websocket",
    responses(
        (status = 101, description = "Switching protocols to a websocket session"),
        (status = 400, description = "Not a websocket upgrade request"),
    )
)]
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let keepalive = state.chat.keepalive;
    ws.on_upgrade(move |socket| async move {
        let (sink, stream) = socket.split();
        run_session(sink, stream, state.dal, keepalive).await;
    })
}

/// Keeps the open-session gauge in step with live sessions.
struct SessionGuard;

impl SessionGuard {
    fn open() -> Self {
        metrics::WEBSOCKET_SESSIONS.inc();
        SessionGuard
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        metrics::WEBSOCKET_SESSIONS.dec();
    }
}

/// Drives one websocket session until it ends.
pub async fn run_session<Si, St, E>(mut sink: Si, mut stream: St, dal: DAL, keepalive: Duration)
where
    Si: Sink<WsMessage> + Unpin,
    Si::Error: Display,
    St: Stream<Item = Result<WsMessage, E>> + Unpin,
    E: Display,
{
    let session_id = Uuid::new_v4();

    let mut subscription = match dal.messages().subscribe().await {
        Ok(subscription) => subscription,
        Err(e) => {
            error!("Session {}: failed to subscribe to broadcasts: {}", session_id, e);
            let _ = sink.send(WsMessage::Close(None)).await;
            return;
        }
    };

    let _guard = SessionGuard::open();
    info!("Session {} opened", session_id);

    let mut keepalive_timer = interval_at(Instant::now() + keepalive, keepalive);
    keepalive_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            incoming = stream.next() => {
                let text = match incoming {
                    Some(Ok(WsMessage::Text(text))) => text,
                    Some(Ok(WsMessage::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => text,
                        Err(_) => {
                            warn!("Session {}: ignoring non UTF-8 binary frame", session_id);
                            continue;
                        }
                    },
                    Some(Ok(WsMessage::Close(_))) | None => {
                        debug!("Session {}: client closed", session_id);
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        debug!("Session {}: socket error: {}", session_id, e);
                        break;
                    }
                };

                if let Some(reply) = answer_history_request(&dal, session_id, &text).await {
                    if let Err(e) = sink.send(WsMessage::Text(reply)).await {
                        debug!("Session {}: failed to send history: {}", session_id, e);
                        break;
                    }
                }
            }
            payload = subscription.next() => {
                let Some(payload) = payload else {
                    warn!("Session {}: broadcast subscription ended", session_id);
                    break;
                };
                if let Err(e) = sink.send(WsMessage::Text(payload)).await {
                    debug!("Session {}: failed to forward broadcast: {}", session_id, e);
                    break;
                }
                metrics::BROADCASTS_FORWARDED_TOTAL.inc();
            }
            _ = keepalive_timer.tick() => {
                if let Err(e) = sink.send(WsMessage::Ping(Vec::new())).await {
                    debug!("Session {}: keepalive ping failed: {}", session_id, e);
                    break;
                }
            }
        }
    }

    let _ = sink.close().await;
    info!("Session {} closed", session_id);
}

/// Parses a history request and returns the encoded reply.
///
/// Malformed requests and store failures are logged and produce no reply; the
/// session stays open either way.
async fn answer_history_request(dal: &DAL, session_id: Uuid, text: &str) -> Option<String> {
    let request = match HistoryRequest::parse(text) {
        Ok(request) => request,
        Err(e) => {
            warn!("Session {}: ignoring malformed history request: {}", session_id, e);
            return None;
        }
    };

    metrics::HISTORY_REQUESTS_TOTAL.inc();
    match dal.messages().history_payload(request).await {
        Ok(payload) => Some(payload),
        Err(e) => {
            error!("Session {}: failed to load history: {}", session_id, e);
            None
        }
    }
}
