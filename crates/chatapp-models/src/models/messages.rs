/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Messages Module
//!
//! Data structures for chat messages.
//!
//! ## Core Data Model
//!
//! - `id`: u64 - Position-derived identifier, assigned by the store (first message is 1)
//! - `name`: String - Display name of the sender
//! - `email`: String - Email address of the sender
//! - `date`: DateTime<Utc> - When the message was received
//! - `topic`: String - Topic the message was posted under
//! - `content`: String - Message body
//!
//! `NewMessage` carries the same fields except `id`, which the store assigns
//! atomically with the append.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "Jane Smith";
pub const DEFAULT_EMAIL: &str = "janes@yorku.ca";
pub const DEFAULT_TOPIC: &str = "chat";

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Message {
    /// Identifier assigned by the store, starting at 1
    pub id: u64,
    /// Display name of the sender
    pub name: String,
    /// Email address of the sender
    pub email: String,
    /// When the message was received
    pub date: DateTime<Utc>,
    /// Topic the message was posted under
    pub topic: String,
    /// Message body
    pub content: String,
}

/// Values used for sender fields the client left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDefaults {
    pub name: String,
    pub email: String,
    pub topic: String,
}

impl Default for MessageDefaults {
    fn default() -> Self {
        MessageDefaults {
            name: DEFAULT_NAME.to_string(),
            email: DEFAULT_EMAIL.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
        }
    }
}

/// A message that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
    pub topic: String,
    pub content: String,
}

impl NewMessage {
    /// Creates a new `NewMessage` stamped with the current time.
    ///
    /// Fields passed as `None` take the value from `defaults`; a missing
    /// `content` becomes the empty string. A field that is present but empty
    /// is kept as is.
    pub fn new(
        name: Option<String>,
        email: Option<String>,
        topic: Option<String>,
        content: Option<String>,
        defaults: &MessageDefaults,
    ) -> Self {
        NewMessage {
            name: name.unwrap_or_else(|| defaults.name.clone()),
            email: email.unwrap_or_else(|| defaults.email.clone()),
            date: Utc::now(),
            topic: topic.unwrap_or_else(|| defaults.topic.clone()),
            content: content.unwrap_or_default(),
        }
    }

    /// Replaces the receive timestamp.
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Rejects content longer than `max_len` bytes.
    pub fn check_content_length(&self, max_len: usize) -> Result<(), String> {
        if self.content.len() > max_len {
            return Err(format!(
                "Message content is {} bytes, the limit is {}",
                self.content.len(),
                max_len
            ));
        }
        Ok(())
    }

    /// Attaches the store-assigned id.
    pub fn into_message(self, id: u64) -> Message {
        Message {
            id,
            name: self.name,
            email: self.email,
            date: self.date,
            topic: self.topic,
            content: self.content,
        }
    }
}
