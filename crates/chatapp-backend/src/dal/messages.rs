/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Message operations: sending (store + broadcast) and history reads.

use crate::bus::Subscription;
use crate::dal::DAL;
use crate::metrics;
use crate::store::StoreError;
use chatapp_models::models::{encode_messages, HistoryRequest, Message, NewMessage};
use std::time::Instant;
use tracing::{debug, error, instrument};

/// Represents the Data Access Layer for message operations.
pub struct MessagesDAL<'a> {
    /// Reference to the main DAL instance.
    pub(crate) dal: &'a DAL,
}

impl<'a> MessagesDAL<'a> {
    /// Stores a message and broadcasts it to every subscriber.
    ///
    /// A failed broadcast is logged but does not fail the send: the message
    /// is already stored and clients will see it on their next history read.
    #[instrument(skip_all, fields(topic = %new_message.topic))]
    pub async fn send(&self, new_message: NewMessage) -> Result<Message, StoreError> {
        let started = Instant::now();
        let message = self.dal.store.append(new_message).await?;
        observe("append", started);
        metrics::MESSAGES_SENT_TOTAL.inc();
        debug!("Stored message {}", message.id);

        match encode_messages(std::slice::from_ref(&message)) {
            Ok(payload) => {
                if let Err(e) = self.dal.bus.publish(payload).await {
                    error!("Failed to broadcast message {}: {}", message.id, e);
                }
            }
            Err(e) => error!("Failed to encode message {}: {}", message.id, e),
        }

        Ok(message)
    }

    /// Returns the slice of the log a history request asks for, limited to
    /// the configured window.
    pub async fn history(&self, request: HistoryRequest) -> Result<Vec<Message>, StoreError> {
        let (first, last) = request.window(self.dal.history_window);
        let started = Instant::now();
        let messages = self.dal.store.range(first, last).await?;
        observe("range", started);
        debug!(
            "History {}..={} resolved to {} message(s)",
            first,
            last,
            messages.len()
        );
        Ok(messages)
    }

    /// Same as [`history`](Self::history), encoded for the browser.
    pub async fn history_payload(&self, request: HistoryRequest) -> Result<String, StoreError> {
        let messages = self.history(request).await?;
        Ok(encode_messages(&messages)?)
    }

    /// Number of stored messages.
    pub async fn count(&self) -> Result<u64, StoreError> {
        let started = Instant::now();
        let count = self.dal.store.count().await?;
        observe("count", started);
        Ok(count)
    }

    /// Opens a broadcast subscription.
    pub async fn subscribe(&self) -> Result<Subscription, StoreError> {
        self.dal.bus.subscribe().await
    }
}

fn observe(operation: &str, started: Instant) {
    metrics::STORE_OPERATION_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(started.elapsed().as_secs_f64());
}
