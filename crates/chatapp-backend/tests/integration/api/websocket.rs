/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::TestFixture;
use axum::{
    body::Body,
    extract::ws::Message as WsMessage,
    http::{header, Request},
};
use chatapp_backend::api::websocket::run_session;
use futures::channel::mpsc;
use futures::StreamExt;
use std::time::Duration;
use tower::ServiceExt;

#[tokio::test]
async fn test_plain_get_is_not_upgraded() {
    let fixture = TestFixture::new();

    let response = fixture
        .create_test_router()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/chatapp/websocket")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_post_to_websocket_is_rejected() {
    let fixture = TestFixture::new();

    let response = fixture
        .create_test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chatapp/websocket")
                .header(header::CONNECTION, "upgrade")
                .header(header::UPGRADE, "websocket")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_two_sessions_both_receive_a_sent_message() {
    let fixture = TestFixture::new();
    fixture.insert_test_message("earlier").await;

    let mut clients = Vec::new();
    for _ in 0..2 {
        let (client_tx, server_rx) = mpsc::unbounded::<Result<WsMessage, axum::Error>>();
        let (server_tx, mut client_rx) = mpsc::unbounded::<WsMessage>();
        tokio::spawn(run_session(
            server_tx,
            server_rx,
            fixture.dal.clone(),
            Duration::from_secs(60),
        ));

        // Wait for the history reply so the session is known to be subscribed.
        client_tx
            .unbounded_send(Ok(WsMessage::Text(
                r#"{"first_id": 0, "last_id": -1}"#.to_string(),
            )))
            .unwrap();
        match client_rx.next().await {
            Some(WsMessage::Text(body)) => assert!(body.contains("earlier")),
            other => panic!("expected history reply, got {:?}", other),
        }
        clients.push((client_tx, client_rx));
    }

    fixture.insert_test_message("fresh").await;

    for (_tx, rx) in clients.iter_mut() {
        match rx.next().await {
            Some(WsMessage::Text(body)) => {
                let value: serde_json::Value = serde_json::from_str(&body).unwrap();
                assert_eq!(value[0]["id"], "0000000002");
                assert_eq!(value[0]["content"], "fresh");
            }
            other => panic!("expected broadcast, got {:?}", other),
        }
    }
}
