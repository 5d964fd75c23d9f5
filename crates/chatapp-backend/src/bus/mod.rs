/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Broadcast of encoded payloads to every open websocket session.
//!
//! Publishing is fire-and-forget: a subscriber only sees payloads published
//! after it subscribed, and nothing is replayed.

use crate::store::StoreError;
use async_trait::async_trait;
use futures::stream::BoxStream;

mod memory;
mod redis;

pub use self::memory::MemoryBus;
pub use self::redis::RedisBus;

/// Stream of payloads delivered to one subscriber.
pub type Subscription = BoxStream<'static, String>;

#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Delivers `payload` to all current subscribers.
    async fn publish(&self, payload: String) -> Result<(), StoreError>;

    /// Opens a subscription receiving every later payload.
    async fn subscribe(&self) -> Result<Subscription, StoreError>;
}
