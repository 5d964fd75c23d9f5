/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Data models for the chat backend
pub mod encoding;
pub mod history;
pub mod messages;

pub use encoding::{encode_messages, EncodedMessage};
pub use history::HistoryRequest;
pub use messages::{Message, MessageDefaults, NewMessage};
