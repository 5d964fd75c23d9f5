/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Chatapp Logging Module
//!
//! A `log` backend for the command-line tools that do not start the server.
//! The server installs a `tracing` subscriber instead (see [`crate::telemetry`]),
//! which also captures records emitted through the `log` macros.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chatapp_utils::logging::{self, prelude::*};
//!
//! logging::init_with_format("info", "text")?;
//! info!("history printed");
//! logging::update_log_level("debug")?;
//! ```
//!
//! ## Log Levels
//!
//! "off", "error", "warn", "info" (default for unknown values), "debug", "trace".

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub use log::{debug, error, info, trace, warn};

static LOGGER: ChatappLogger = ChatappLogger;
static CURRENT_LEVEL: AtomicUsize = AtomicUsize::new(LevelFilter::Info as usize);
static JSON_FORMAT: AtomicBool = AtomicBool::new(false);
static INIT: OnceCell<()> = OnceCell::new();

/// Logger writing one line per record to stderr
pub struct ChatappLogger;

impl log::Log for ChatappLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= level_filter_from_usize(CURRENT_LEVEL.load(Ordering::Relaxed))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if JSON_FORMAT.load(Ordering::Relaxed) {
            let log_entry = serde_json::json!({
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "level": record.level().to_string().to_lowercase(),
                "target": record.target(),
                "message": format!("{}", record.args()),
                "module": record.module_path(),
                "file": record.file(),
                "line": record.line()
            });
            eprintln!("{}", log_entry);
        } else {
            eprintln!(
                "{} - {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

/// Initializes the logger with a text format.
pub fn init(level: &str) -> Result<(), SetLoggerError> {
    init_with_format(level, "text")
}

/// Initializes the logger with the specified level and format.
///
/// Calling this more than once only updates the level and format.
///
/// # Arguments
/// * `level` - "off", "error", "warn", "info", "debug" or "trace"
/// * `format` - "text" for human-readable, "json" for structured JSON
///
/// # Error Cases
/// - another crate already installed a global logger
pub fn init_with_format(level: &str, format: &str) -> Result<(), SetLoggerError> {
    let level_filter = str_to_level_filter(level);
    let use_json = format.eq_ignore_ascii_case("json");

    INIT.get_or_try_init(|| log::set_logger(&LOGGER))?;

    JSON_FORMAT.store(use_json, Ordering::Relaxed);
    CURRENT_LEVEL.store(level_filter as usize, Ordering::Relaxed);
    log::set_max_level(level_filter);
    Ok(())
}

/// Updates the current log level. Unknown levels fall back to "info".
pub fn update_log_level(level: &str) -> Result<(), String> {
    let new_level = str_to_level_filter(level);
    CURRENT_LEVEL.store(new_level as usize, Ordering::Relaxed);
    log::set_max_level(new_level);
    Ok(())
}

/// Returns the level currently in effect.
pub fn current_level() -> LevelFilter {
    level_filter_from_usize(CURRENT_LEVEL.load(Ordering::Relaxed))
}

pub(crate) fn str_to_level_filter(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn level_filter_from_usize(v: usize) -> LevelFilter {
    match v {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        5 => LevelFilter::Trace,
        _ => LevelFilter::Off,
    }
}

pub mod prelude {
    pub use log::{debug, error, info, trace, warn};
}
