/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use super::{MessageBus, Subscription};
use crate::store::StoreError;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Default channel buffer size for payloads.
const DEFAULT_CHANNEL_SIZE: usize = 1000;

/// In-process bus built on a tokio broadcast channel.
#[derive(Clone)]
pub struct MemoryBus {
    sender: broadcast::Sender<String>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        MemoryBus { sender }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBus for MemoryBus {
    async fn publish(&self, payload: String) -> Result<(), StoreError> {
        // No receivers is not an error: nobody is listening yet.
        match self.sender.send(payload) {
            Ok(receivers) => debug!("Published payload to {} subscriber(s)", receivers),
            Err(_) => debug!("Published payload with no subscribers"),
        }
        Ok(())
    }

    async fn subscribe(&self) -> Result<Subscription, StoreError> {
        let receiver = self.sender.subscribe();
        let stream = stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(payload) => return Some((payload, receiver)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Subscriber lagged, skipped {} payload(s)", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        Ok(stream.boxed())
    }
}
