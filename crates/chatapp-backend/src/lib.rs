/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Chatapp Backend
//!
//! `chatapp-backend` accepts chat messages over HTTP, appends them to a shared
//! message log, and pushes each new message to every browser holding an open
//! websocket. Browsers page through older messages by sending history
//! requests over the same websocket.
//!
//! The log and the broadcast channel live in Redis so that any number of
//! backend replicas serve the same conversation; an in-memory backend exists
//! for single-process runs and tests.

pub mod api;
pub mod bus;
pub mod cli;
pub mod dal;
pub mod db;
pub mod metrics;
pub mod store;
pub mod utils;
