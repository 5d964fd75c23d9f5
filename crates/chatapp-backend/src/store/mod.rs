/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Message log storage.
//!
//! The log is an append-only list. Each appended message receives the next id,
//! and the message with id `n` lives at index `n - 1`, so the highest id always
//! equals the log length. Reads use inclusive list-range indices where negative
//! values count back from the end.

use async_trait::async_trait;
use chatapp_models::models::{Message, NewMessage};
use thiserror::Error;

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Errors raised by store and bus backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Append-only message log.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Assigns the next id and appends the message in one atomic step.
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError>;

    /// Returns messages at indices `first..=last` (list-range semantics).
    async fn range(&self, first: i64, last: i64) -> Result<Vec<Message>, StoreError>;

    /// Number of stored messages.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
