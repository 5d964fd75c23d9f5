/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Redis-backed message log.
//!
//! Layout:
//! - `id_key`: integer counter holding the last assigned id
//! - `messages_key`: list of JSON records, one per message, in id order
//!
//! The counter increment and the list push run inside one Lua script so a
//! crash can never leave an id without its message.

use super::{MessageStore, StoreError};
use async_trait::async_trait;
use chatapp_models::models::{Message, NewMessage};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};
use tracing::warn;

/// Increments the id counter and appends the record with the new id spliced
/// in as its first field. ARGV[1] must be a non-empty JSON object.
const APPEND_SCRIPT: &str = r#"
local id = redis.call('INCR', KEYS[1])
local record = '{"id":' .. string.format('%d', id) .. ',' .. string.sub(ARGV[1], 2)
redis.call('RPUSH', KEYS[2], record)
return id
"#;

#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    id_key: String,
    messages_key: String,
    append_script: Script,
}

impl RedisStore {
    pub fn new(conn: MultiplexedConnection, id_key: &str, messages_key: &str) -> Self {
        RedisStore {
            conn,
            id_key: id_key.to_string(),
            messages_key: messages_key.to_string(),
            append_script: Script::new(APPEND_SCRIPT),
        }
    }
}

#[async_trait]
impl MessageStore for RedisStore {
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError> {
        let record = serde_json::to_string(&message)?;
        let mut conn = self.conn.clone();
        let id: u64 = self
            .append_script
            .key(&self.id_key)
            .key(&self.messages_key)
            .arg(record)
            .invoke_async(&mut conn)
            .await?;
        Ok(message.into_message(id))
    }

    async fn range(&self, first: i64, last: i64) -> Result<Vec<Message>, StoreError> {
        let mut conn = self.conn.clone();
        let records: Vec<String> = conn
            .lrange(&self.messages_key, first as isize, last as isize)
            .await?;

        let mut messages = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::from_str::<Message>(&record) {
                Ok(message) => messages.push(message),
                Err(e) => warn!(
                    "Skipping unreadable record in {}: {}",
                    self.messages_key, e
                ),
            }
        }
        Ok(messages)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let len: u64 = conn.llen(&self.messages_key).await?;
        Ok(len)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}
