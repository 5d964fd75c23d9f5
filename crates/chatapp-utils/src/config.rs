/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Chatapp Config Module
//! This module provides a common configuration framework for our crates.
//!
//! # Variable Naming Convention
//!
//! - Struct fields use snake_case (e.g., `redis`, `bind_address`)
//! - Environment variables use SCREAMING_SNAKE_CASE and are prefixed with "CHATAPP__" (e.g., `CHATAPP__REDIS__URL`)
//! - Configuration file keys use snake_case (e.g., `redis.url`, `log.level`)
//!
//! # Configuration Overriding
//!
//! The configuration values are loaded and overridden in the following order (later sources take precedence):
//!
//! 1. Default values from the embedded `default.toml` file
//! 2. Values from an optional external configuration file (if provided)
//! 3. Environment variables
//!
//! # Available Environment Variables
//!
//! - `CHATAPP__SERVER__BIND_ADDRESS`: Address the backend listens on
//!   Default: "0.0.0.0:14222"
//!
//! - `CHATAPP__SERVER__ROUTE_PREFIX`: Prefix applied to the chat routes
//!   Default: "/chatapp"
//!
//! - `CHATAPP__SERVER__STATIC_DIR`: Optional directory of static files served as a fallback
//!
//! - `CHATAPP__STORE__BACKEND`: Message store backend
//!   Default: "redis"
//!   Possible values: "redis", "memory"
//!
//! - `CHATAPP__REDIS__URL`: Redis connection URL
//!   Default: "redis://redis:6379/0"
//!
//! - `CHATAPP__CHAT__MAX_CONTENT_LENGTH`: Largest accepted message body in bytes
//!   Default: 4096
//!
//! - `CHATAPP__LOG__LEVEL`: Sets the log level for the application
//!   Default: "info"
//!   Possible values: "trace", "debug", "info", "warn", "error"

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

// Include the default settings file as a string constant
const DEFAULT_SETTINGS: &str = include_str!("../default.toml");

/// Represents the main settings structure for the application
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// HTTP server configuration
    pub server: Server,
    /// Message store selection
    pub store: Store,
    /// Redis configuration
    pub redis: Redis,
    /// Chat behavior
    pub chat: Chat,
    /// Logging configuration
    pub log: Log,
    /// CORS configuration
    pub cors: Cors,
    /// Telemetry configuration
    pub telemetry: Telemetry,
}

/// Represents the HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    /// Socket address to bind
    pub bind_address: String,
    /// Prefix for the send and websocket routes
    pub route_prefix: String,
    /// Optional directory served for any unmatched path
    pub static_dir: Option<String>,
}

/// Which backend keeps the message log
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Store {
    pub backend: StoreBackend,
}

/// Represents the Redis configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Redis {
    /// Connection URL
    pub url: String,
    /// Key holding the last assigned message id
    pub id_key: String,
    /// Key of the list holding every message
    pub messages_key: String,
    /// Pub/sub channel for broadcast payloads
    pub channel: String,
    /// Retries after the first failed connection attempt at startup
    pub connect_retries: u32,
}

/// Represents the chat behavior configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Chat {
    /// Largest history slice served per request
    pub history_window: i64,
    /// Largest accepted content in bytes
    pub max_content_length: usize,
    /// Seconds between websocket pings
    pub keepalive_seconds: u64,
    pub default_name: String,
    pub default_email: String,
    pub default_topic: String,
}

/// Represents the logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Log {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,
    /// Log format: "text" for human-readable, "json" for structured JSON
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Represents the CORS configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Cors {
    /// Allowed origins for CORS requests
    /// Use "*" to allow all origins
    pub allowed_origins: Vec<String>,
    /// Allowed HTTP methods
    pub allowed_methods: Vec<String>,
    /// Allowed HTTP headers
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache in seconds
    pub max_age_seconds: u64,
}

/// Represents the telemetry (OpenTelemetry) configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Telemetry {
    /// Whether trace export is enabled
    #[serde(default)]
    pub enabled: bool,
    /// OTLP endpoint for trace export (gRPC)
    #[serde(default = "default_otlp_endpoint")]
    pub otlp_endpoint: String,
    /// Service name for traces
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Sampling rate (0.0 to 1.0)
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "chatapp-backend".to_string()
}

fn default_sampling_rate() -> f64 {
    0.1
}

impl Telemetry {
    /// Sampling rate clamped into `0.0..=1.0`
    pub fn clamped_sampling_rate(&self) -> f64 {
        self.sampling_rate.clamp(0.0, 1.0)
    }
}

impl Server {
    /// Route prefix without a trailing slash; an empty prefix mounts at the root.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.route_prefix.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        }
    }
}

impl Settings {
    /// Creates a new `Settings` instance
    ///
    /// # Arguments
    ///
    /// * `file` - An optional path to a configuration file
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing the `Settings` instance or a `ConfigError`
    pub fn new(file: Option<String>) -> Result<Self, ConfigError> {
        // Start with default settings from the embedded TOML file
        let mut s = Config::builder()
            .add_source(File::from_str(DEFAULT_SETTINGS, config::FileFormat::Toml));

        // If a configuration file is provided, add it as a source
        s = match file {
            Some(x) => s.add_source(File::with_name(x.as_str())),
            None => s,
        };

        // Environment variables win, e.g. CHATAPP__REDIS__URL
        s = s.add_source(
            Environment::with_prefix("CHATAPP")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cors.allowed_origins")
                .with_list_parse_key("cors.allowed_methods")
                .with_list_parse_key("cors.allowed_headers")
                .try_parsing(true),
        );

        s.build()?.try_deserialize()
    }
}
