/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Browser-facing encoding of messages.
//!
//! Every payload sent to a client is a JSON array of [`EncodedMessage`], even
//! when it carries a single broadcast message. All text is HTML-escaped so the
//! page can insert it directly, and newlines in the content become `<br>`.

use crate::models::messages::Message;
use serde::{Deserialize, Serialize};

/// strftime pattern used for the `date` field
pub const DATE_FORMAT: &str = "%m/%d/%y %H:%M:%S";

/// Width the id is zero-padded to.
pub const ID_WIDTH: usize = 10;

/// A message as the browser receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EncodedMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub date: String,
    pub topic: String,
    pub content: String,
}

impl From<&Message> for EncodedMessage {
    fn from(message: &Message) -> Self {
        EncodedMessage {
            id: escape_html(&format!("{:0width$}", message.id, width = ID_WIDTH)),
            name: escape_html(&message.name),
            email: escape_html(&message.email),
            date: escape_html(&message.date.format(DATE_FORMAT).to_string()),
            topic: escape_html(&message.topic),
            content: escape_html(&message.content).replace('\n', "<br>"),
        }
    }
}

/// Escapes `&`, `<`, `>`, `"` and `'` for inclusion in HTML.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Encodes messages into the JSON array payload sent over the websocket.
pub fn encode_messages(messages: &[Message]) -> Result<String, serde_json::Error> {
    let encoded: Vec<EncodedMessage> = messages.iter().map(EncodedMessage::from).collect();
    serde_json::to_string(&encoded)
}
