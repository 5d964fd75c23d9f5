/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::{memory_settings, FailingBus, FailingStore, TestFixture};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chatapp_backend::dal::DAL;
use chatapp_models::models::HistoryRequest;
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

async fn post_form(app: Router, uri: &str, form: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_send_stores_message() {
    let fixture = TestFixture::new();

    let (status, body) = post_form(
        fixture.create_test_router(),
        "/chatapp/send",
        "topic=news&name=Ada&email=ada%40example.com&content=hello+there",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);

    let stored = fixture
        .dal
        .messages()
        .history(HistoryRequest::new(0, -1))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Ada");
    assert_eq!(stored[0].email, "ada@example.com");
    assert_eq!(stored[0].topic, "news");
    assert_eq!(stored[0].content, "hello there");
}

#[tokio::test]
async fn test_send_fills_in_defaults() {
    let fixture = TestFixture::new();

    let (status, _) = post_form(fixture.create_test_router(), "/chatapp/send", "content=hi").await;
    assert_eq!(status, StatusCode::OK);

    let stored = fixture
        .dal
        .messages()
        .history(HistoryRequest::new(0, -1))
        .await
        .unwrap();
    assert_eq!(stored[0].name, "Jane Smith");
    assert_eq!(stored[0].email, "janes@yorku.ca");
    assert_eq!(stored[0].topic, "chat");
}

#[tokio::test]
async fn test_send_uses_configured_defaults() {
    let mut settings = memory_settings();
    settings.chat.default_name = "Anonymous".to_string();
    settings.chat.default_topic = "lobby".to_string();
    let fixture = TestFixture::with_settings(settings);

    post_form(fixture.create_test_router(), "/chatapp/send", "content=hi").await;

    let stored = fixture
        .dal
        .messages()
        .history(HistoryRequest::new(0, -1))
        .await
        .unwrap();
    assert_eq!(stored[0].name, "Anonymous");
    assert_eq!(stored[0].topic, "lobby");
}

#[tokio::test]
async fn test_send_assigns_increasing_ids() {
    let fixture = TestFixture::new();
    let app = fixture.create_test_router();

    for expected in 1..=3 {
        let (status, body) = post_form(app.clone(), "/chatapp/send", "content=x").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], expected);
    }
    assert_eq!(fixture.dal.messages().count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_send_broadcasts_encoded_message() {
    let fixture = TestFixture::new();
    let mut subscription = fixture.dal.messages().subscribe().await.unwrap();

    post_form(
        fixture.create_test_router(),
        "/chatapp/send",
        "name=%3Cb%3E&content=line+one%0Aline+two",
    )
    .await;

    let payload = subscription.next().await.unwrap();
    let value: Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(value[0]["id"], "0000000001");
    assert_eq!(value[0]["name"], "&lt;b&gt;");
    assert_eq!(value[0]["content"], "line one<br>line two");
}

#[tokio::test]
async fn test_send_rejects_oversized_content() {
    let mut settings = memory_settings();
    settings.chat.max_content_length = 8;
    let fixture = TestFixture::with_settings(settings);

    let (status, body) = post_form(
        fixture.create_test_router(),
        "/chatapp/send",
        "content=much+too+long",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(fixture.dal.messages().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_send_reports_store_failure() {
    let dal = DAL::new(Arc::new(FailingStore), Arc::new(FailingBus), 50);
    let fixture = TestFixture::with_dal(dal);

    let (status, body) = post_form(fixture.create_test_router(), "/chatapp/send", "content=hi").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to store message");
}

#[tokio::test]
async fn test_send_under_custom_prefix() {
    let mut settings = memory_settings();
    settings.server.route_prefix = "/api/chat/".to_string();
    let fixture = TestFixture::with_settings(settings);
    let app = fixture.create_test_router();

    let (status, _) = post_form(app.clone(), "/api/chat/send", "content=hi").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_form(app, "/chatapp/send", "content=hi").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_at_root_prefix() {
    let mut settings = memory_settings();
    settings.server.route_prefix = String::new();
    let fixture = TestFixture::with_settings(settings);

    let (status, body) = post_form(fixture.create_test_router(), "/send", "content=hi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
}
