/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Redis pub/sub bus. Every subscription holds its own pub/sub connection.

use super::{MessageBus, Subscription};
use crate::store::StoreError;
use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct RedisBus {
    client: Client,
    conn: MultiplexedConnection,
    channel: String,
}

impl RedisBus {
    pub fn new(client: Client, conn: MultiplexedConnection, channel: &str) -> Self {
        RedisBus {
            client,
            conn,
            channel: channel.to_string(),
        }
    }
}

#[async_trait]
impl MessageBus for RedisBus {
    async fn publish(&self, payload: String) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let receivers: i64 = conn.publish(&self.channel, payload).await?;
        debug!(
            "Published payload on {} to {} subscriber(s)",
            self.channel, receivers
        );
        Ok(())
    }

    async fn subscribe(&self) -> Result<Subscription, StoreError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&self.channel).await?;

        // Subscribe/unsubscribe confirmations never reach this stream; only
        // published messages do.
        let channel = self.channel.clone();
        let stream = pubsub.into_on_message().filter_map(move |msg| {
            let payload = match msg.get_payload::<String>() {
                Ok(payload) => Some(payload),
                Err(e) => {
                    warn!("Dropping undecodable payload on {}: {}", channel, e);
                    None
                }
            };
            futures::future::ready(payload)
        });
        Ok(stream.boxed())
    }
}
