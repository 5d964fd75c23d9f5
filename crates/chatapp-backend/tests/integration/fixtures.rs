/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Test fixtures for the chat backend.
//!
//! `TestFixture::new` runs against the in-memory backend. `redis_fixture`
//! connects to the server named by `CHATAPP_TEST_REDIS_URL` and returns `None`
//! when that variable is unset, so Redis tests are skipped by default. The
//! keys a Redis fixture uses are deleted when its last clone is dropped.

use async_trait::async_trait;
use axum::Router;
use chatapp_backend::api::{self, AppState};
use chatapp_backend::bus::{MemoryBus, MessageBus, RedisBus, Subscription};
use chatapp_backend::dal::DAL;
use chatapp_backend::db::connect_redis;
use chatapp_backend::store::{MemoryStore, MessageStore, RedisStore, StoreError};
use chatapp_models::models::{Message, MessageDefaults, NewMessage};
use chatapp_utils::config::{Settings, StoreBackend};
use dotenv::dotenv;
use redis::Commands;
use std::env;
use std::sync::Arc;
use uuid::Uuid;

pub const REDIS_URL_VAR: &str = "CHATAPP_TEST_REDIS_URL";

/// Represents a test fixture for the chat backend.
#[derive(Clone)]
pub struct TestFixture {
    /// The Data Access Layer (DAL) instance.
    pub dal: DAL,
    /// Settings the router is built from.
    pub settings: Settings,
    /// Deletes the fixture's Redis keys once every clone is gone.
    redis_keys: Option<Arc<RedisKeyCleanup>>,
}

impl TestFixture {
    /// Creates a fixture backed by the in-memory store and bus.
    pub fn new() -> Self {
        Self::with_settings(memory_settings())
    }

    /// Creates an in-memory fixture with custom settings.
    pub fn with_settings(settings: Settings) -> Self {
        let dal = DAL::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryBus::new()),
            settings.chat.history_window,
        );
        TestFixture {
            dal,
            settings,
            redis_keys: None,
        }
    }

    /// Creates a fixture around an existing DAL.
    pub fn with_dal(dal: DAL) -> Self {
        TestFixture {
            dal,
            settings: memory_settings(),
            redis_keys: None,
        }
    }

    /// Builds the full application router with state attached.
    pub fn create_test_router(&self) -> Router {
        api::configure_api_routes(&self.settings)
            .with_state(AppState::new(self.dal.clone(), &self.settings))
    }

    /// Stores a message with default sender fields.
    pub async fn insert_test_message(&self, content: &str) -> Message {
        let new_message = NewMessage::new(
            None,
            None,
            None,
            Some(content.to_string()),
            &MessageDefaults::default(),
        );
        self.dal
            .messages()
            .send(new_message)
            .await
            .expect("Failed to insert test message")
    }
}

/// Default settings switched to the in-memory backend.
pub fn memory_settings() -> Settings {
    dotenv().ok();
    let mut settings = Settings::new(None).expect("Failed to load default settings");
    settings.store.backend = StoreBackend::Memory;
    settings
}

/// Keys and channel unique to one test, so runs never see each other's data.
pub struct RedisKeys {
    pub id_key: String,
    pub messages_key: String,
    pub channel: String,
}

impl RedisKeys {
    pub fn unique() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        RedisKeys {
            id_key: format!("test:{}:id", suffix),
            messages_key: format!("test:{}:messages", suffix),
            channel: format!("test:{}:messages", suffix),
        }
    }
}

/// Returns a Redis-backed fixture, or `None` when no test server is configured.
pub async fn redis_fixture() -> Option<(TestFixture, RedisStore, RedisBus)> {
    dotenv().ok();
    let url = env::var(REDIS_URL_VAR).ok()?;
    let redis = connect_redis(&url, 0)
        .await
        .expect("Failed to connect to the test Redis server");

    let keys = RedisKeys::unique();
    let store = RedisStore::new(redis.conn.clone(), &keys.id_key, &keys.messages_key);
    let bus = RedisBus::new(redis.client.clone(), redis.conn.clone(), &keys.channel);

    let cleanup = RedisKeyCleanup {
        client: redis.client.clone(),
        keys: vec![keys.id_key.clone(), keys.messages_key.clone()],
    };

    let mut settings = memory_settings();
    settings.store.backend = StoreBackend::Redis;
    settings.redis.url = url;
    settings.redis.id_key = keys.id_key;
    settings.redis.messages_key = keys.messages_key;
    settings.redis.channel = keys.channel;

    let dal = DAL::new(
        Arc::new(store.clone()),
        Arc::new(bus.clone()),
        settings.chat.history_window,
    );
    let fixture = TestFixture {
        dal,
        settings,
        redis_keys: Some(Arc::new(cleanup)),
    };
    Some((fixture, store, bus))
}

/// Deletes a test's Redis keys when dropped.
struct RedisKeyCleanup {
    client: redis::Client,
    keys: Vec<String>,
}

impl Drop for RedisKeyCleanup {
    fn drop(&mut self) {
        match self.client.get_connection() {
            Ok(mut conn) => {
                if let Err(e) = conn.del::<_, ()>(&self.keys) {
                    eprintln!("Failed to delete test keys {:?}: {}", self.keys, e);
                }
            }
            Err(e) => eprintln!("Failed to connect for test key cleanup: {}", e),
        }
    }
}

/// A store whose every operation fails, for error-path tests.
pub struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Redis(redis::RedisError::from((
        redis::ErrorKind::IoError,
        "store unavailable",
    )))
}

#[async_trait]
impl MessageStore for FailingStore {
    async fn append(&self, _message: NewMessage) -> Result<Message, StoreError> {
        Err(unavailable())
    }

    async fn range(&self, _first: i64, _last: i64) -> Result<Vec<Message>, StoreError> {
        Err(unavailable())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Err(unavailable())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(unavailable())
    }
}

/// A bus that cannot publish.
pub struct FailingBus;

#[async_trait]
impl MessageBus for FailingBus {
    async fn publish(&self, _payload: String) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn subscribe(&self) -> Result<Subscription, StoreError> {
        Err(unavailable())
    }
}
