/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Tests against a live Redis server. Each test returns early unless
//! `CHATAPP_TEST_REDIS_URL` is set.

use crate::fixtures::redis_fixture;
use axum::extract::ws::Message as WsMessage;
use chatapp_backend::api::websocket::run_session;
use chatapp_backend::bus::MessageBus;
use chatapp_backend::db::{connect_redis, create_dal};
use chatapp_backend::store::MessageStore;
use chatapp_models::models::{HistoryRequest, MessageDefaults, NewMessage};
use futures::channel::mpsc;
use futures::StreamExt;
use redis::AsyncCommands;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

fn new_message(content: &str) -> NewMessage {
    NewMessage::new(
        None,
        None,
        None,
        Some(content.to_string()),
        &MessageDefaults::default(),
    )
}

#[tokio::test]
#[serial]
async fn test_append_keeps_counter_and_list_in_step() {
    let Some((fixture, store, _bus)) = redis_fixture().await else {
        return;
    };

    for i in 0..5 {
        let message = store.append(new_message(&i.to_string())).await.unwrap();
        assert_eq!(message.id, i + 1);
    }
    assert_eq!(store.count().await.unwrap(), 5);

    let redis = connect_redis(&fixture.settings.redis.url, 0).await.unwrap();
    let mut conn = redis.conn;
    let counter: u64 = conn.get(&fixture.settings.redis.id_key).await.unwrap();
    assert_eq!(counter, 5);
}

#[tokio::test]
#[serial]
async fn test_fixture_deletes_its_keys_when_dropped() {
    let Some((fixture, store, _bus)) = redis_fixture().await else {
        return;
    };
    store.append(new_message("temporary")).await.unwrap();

    let id_key = fixture.settings.redis.id_key.clone();
    let messages_key = fixture.settings.redis.messages_key.clone();
    let redis = connect_redis(&fixture.settings.redis.url, 0).await.unwrap();
    let mut conn = redis.conn;
    let before: u64 = conn.exists(vec![id_key.as_str(), messages_key.as_str()]).await.unwrap();
    assert_eq!(before, 2);

    let clone = fixture.clone();
    drop(fixture);
    let still_held: u64 = conn.exists(vec![id_key.as_str(), messages_key.as_str()]).await.unwrap();
    assert_eq!(still_held, 2);

    drop(clone);
    let after: u64 = conn.exists(vec![id_key.as_str(), messages_key.as_str()]).await.unwrap();
    assert_eq!(after, 0);
}

#[tokio::test]
#[serial]
async fn test_concurrent_appends_get_unique_ids() {
    let Some((_fixture, store, _bus)) = redis_fixture().await else {
        return;
    };
    let store = Arc::new(store);

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.append(new_message(&i.to_string())).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let all = store.range(0, -1).await.unwrap();
    let ids: Vec<u64> = all.iter().map(|m| m.id).collect();
    assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
}

#[tokio::test]
#[serial]
async fn test_range_skips_unreadable_records() {
    let Some((fixture, store, _bus)) = redis_fixture().await else {
        return;
    };

    store.append(new_message("good")).await.unwrap();
    let redis = connect_redis(&fixture.settings.redis.url, 0).await.unwrap();
    let mut conn = redis.conn;
    let _: () = conn
        .rpush(&fixture.settings.redis.messages_key, "not json")
        .await
        .unwrap();

    let messages = store.range(0, -1).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "good");
}

#[tokio::test]
#[serial]
async fn test_bus_delivers_published_payloads() {
    let Some((_fixture, _store, bus)) = redis_fixture().await else {
        return;
    };

    let mut subscription = bus.subscribe().await.unwrap();
    bus.publish("[]".to_string()).await.unwrap();

    let payload = timeout(Duration::from_secs(5), subscription.next())
        .await
        .expect("timed out waiting for payload");
    assert_eq!(payload.as_deref(), Some("[]"));
}

#[tokio::test]
#[serial]
async fn test_history_and_broadcast_over_redis() {
    let Some((fixture, _store, _bus)) = redis_fixture().await else {
        return;
    };
    fixture.insert_test_message("first").await;

    let (client_tx, server_rx) = mpsc::unbounded::<Result<WsMessage, axum::Error>>();
    let (server_tx, mut client_rx) = mpsc::unbounded::<WsMessage>();
    tokio::spawn(run_session(
        server_tx,
        server_rx,
        fixture.dal.clone(),
        Duration::from_secs(60),
    ));

    client_tx
        .unbounded_send(Ok(WsMessage::Text(
            r#"{"first_id": 0, "last_id": -1}"#.to_string(),
        )))
        .unwrap();
    match timeout(Duration::from_secs(5), client_rx.next()).await.unwrap() {
        Some(WsMessage::Text(body)) => assert!(body.contains("first")),
        other => panic!("expected history reply, got {:?}", other),
    }

    fixture.insert_test_message("second").await;
    match timeout(Duration::from_secs(5), client_rx.next()).await.unwrap() {
        Some(WsMessage::Text(body)) => {
            let value: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(value[0]["id"], "0000000002");
        }
        other => panic!("expected broadcast, got {:?}", other),
    }
}

#[tokio::test]
#[serial]
async fn test_create_dal_from_settings() {
    let Some((fixture, _store, _bus)) = redis_fixture().await else {
        return;
    };

    let dal = create_dal(&fixture.settings).await.unwrap();
    assert!(dal.ping().await.is_ok());
    dal.messages().send(new_message("via settings")).await.unwrap();

    let messages = fixture
        .dal
        .messages()
        .history(HistoryRequest::new(0, -1))
        .await
        .unwrap();
    assert_eq!(messages.last().unwrap().content, "via settings");
}
