/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use super::{MessageStore, StoreError};
use async_trait::async_trait;
use chatapp_models::models::history::resolve_list_range;
use chatapp_models::models::{Message, NewMessage};
use tokio::sync::RwLock;

/// In-process message log, used for development and tests.
///
/// Id assignment and append happen under the same write lock.
#[derive(Default)]
pub struct MemoryStore {
    messages: RwLock<Vec<Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError> {
        let mut messages = self.messages.write().await;
        let stored = message.into_message(messages.len() as u64 + 1);
        messages.push(stored.clone());
        Ok(stored)
    }

    async fn range(&self, first: i64, last: i64) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.read().await;
        Ok(match resolve_list_range(messages.len(), first, last) {
            Some((start, end)) => messages[start..end].to_vec(),
            None => Vec::new(),
        })
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.messages.read().await.len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
