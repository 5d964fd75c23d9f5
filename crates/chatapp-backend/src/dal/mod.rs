/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Data Access Layer.
//!
//! `DAL` bundles the message store and the broadcast bus behind a cheap,
//! cloneable handle that handlers and websocket sessions share.

use crate::bus::{MemoryBus, MessageBus};
use crate::store::{MemoryStore, MessageStore};
use chatapp_models::models::history::DEFAULT_HISTORY_WINDOW;
use std::sync::Arc;

mod messages;

pub use messages::MessagesDAL;

#[derive(Clone)]
pub struct DAL {
    pub(crate) store: Arc<dyn MessageStore>,
    pub(crate) bus: Arc<dyn MessageBus>,
    pub(crate) history_window: i64,
}

impl DAL {
    pub fn new(
        store: Arc<dyn MessageStore>,
        bus: Arc<dyn MessageBus>,
        history_window: i64,
    ) -> Self {
        DAL {
            store,
            bus,
            history_window,
        }
    }

    /// A DAL backed entirely by process memory.
    pub fn in_memory() -> Self {
        DAL::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryBus::new()),
            DEFAULT_HISTORY_WINDOW,
        )
    }

    pub fn messages(&self) -> MessagesDAL {
        MessagesDAL { dal: self }
    }

    /// Checks that the store is reachable.
    pub async fn ping(&self) -> Result<(), crate::store::StoreError> {
        self.store.ping().await
    }
}
