/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Backend connections and DAL construction.
//!
//! Redis may still be starting when the backend comes up (both are started
//! together by the cluster manifest), so the first connection is retried with
//! exponential backoff before giving up.

use crate::bus::{MemoryBus, RedisBus};
use crate::dal::DAL;
use crate::store::{MemoryStore, RedisStore, StoreError};
use backoff::ExponentialBackoffBuilder;
use chatapp_utils::config::{Settings, StoreBackend};
use redis::aio::MultiplexedConnection;
use redis::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const INITIAL_RETRY_INTERVAL: Duration = Duration::from_millis(250);
const MAX_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// A Redis client plus one multiplexed connection shared by store and bus.
#[derive(Clone)]
pub struct RedisConnection {
    pub client: Client,
    pub conn: MultiplexedConnection,
}

/// Opens a Redis connection and checks it with `PING`.
///
/// The first attempt is followed by up to `retries` retries, so at most
/// `retries + 1` attempts are made. An invalid URL fails immediately.
pub async fn connect_redis(url: &str, retries: u32) -> Result<RedisConnection, StoreError> {
    let client = Client::open(url)?;

    let backoff = ExponentialBackoffBuilder::new()
        .with_initial_interval(INITIAL_RETRY_INTERVAL)
        .with_max_interval(MAX_RETRY_INTERVAL)
        .with_max_elapsed_time(None)
        .build();

    let mut attempt: u32 = 0;
    let operation = || {
        attempt += 1;
        let client = client.clone();
        let current = attempt;
        async move {
            let result = async {
                let mut conn = client.get_multiplexed_async_connection().await?;
                redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
                Ok::<_, redis::RedisError>(conn)
            }
            .await;

            result.map_err(|e| {
                if !retry_allowed(current, retries) {
                    backoff::Error::Permanent(e)
                } else {
                    warn!(
                        "Redis connection attempt {} of {} failed: {}",
                        current,
                        retries.saturating_add(1),
                        e
                    );
                    backoff::Error::transient(e)
                }
            })
        }
    };

    let conn = backoff::future::retry(backoff, operation).await?;
    info!("Connected to Redis at {}", redact(url));
    Ok(RedisConnection { client, conn })
}

/// Whether a failed 1-based `attempt` may be followed by another one.
fn retry_allowed(attempt: u32, retries: u32) -> bool {
    attempt <= retries
}

/// Builds the DAL for the configured store backend.
pub async fn create_dal(settings: &Settings) -> Result<DAL, StoreError> {
    let history_window = settings.chat.history_window;
    match settings.store.backend {
        StoreBackend::Redis => {
            let redis = connect_redis(&settings.redis.url, settings.redis.connect_retries).await?;
            let store = RedisStore::new(
                redis.conn.clone(),
                &settings.redis.id_key,
                &settings.redis.messages_key,
            );
            let bus = RedisBus::new(redis.client, redis.conn, &settings.redis.channel);
            Ok(DAL::new(Arc::new(store), Arc::new(bus), history_window))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; messages are lost on restart");
            Ok(DAL::new(
                Arc::new(MemoryStore::new()),
                Arc::new(MemoryBus::new()),
                history_window,
            ))
        }
    }
}

/// Strips a password from a Redis URL for logging.
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
