/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Chatapp Telemetry Module
//!
//! Installs the `tracing` subscriber used by the chat server, optionally
//! exporting spans over OTLP.
//!
//! ```rust,ignore
//! use chatapp_utils::telemetry;
//!
//! telemetry::init(&settings.telemetry, &settings.log.level, &settings.log.format)?;
//! tracing::info!("Application started");
//! ```

use crate::config::Telemetry;
use opentelemetry::trace::TracerProvider;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::Sampler;
use opentelemetry_sdk::{runtime, Resource};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Error type for telemetry initialization
#[derive(Debug)]
pub enum TelemetryError {
    /// Failed to create OTLP exporter
    ExporterError(String),
    /// Failed to set global subscriber
    SubscriberError(String),
}

impl std::fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelemetryError::ExporterError(e) => write!(f, "OTLP exporter error: {}", e),
            TelemetryError::SubscriberError(e) => write!(f, "Subscriber error: {}", e),
        }
    }
}

impl std::error::Error for TelemetryError {}

/// Maps a sampling rate onto an OpenTelemetry sampler.
pub fn sampler_for(rate: f64) -> Sampler {
    if rate >= 1.0 {
        Sampler::AlwaysOn
    } else if rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(rate)
    }
}

/// Initialize tracing with the given configuration.
///
/// When telemetry is disabled only the formatting layer is installed.
/// `RUST_LOG`, when set, takes precedence over `log_level`.
pub fn init(config: &Telemetry, log_level: &str, log_format: &str) -> Result<(), TelemetryError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let json = log_format.eq_ignore_ascii_case("json");

    if !config.enabled {
        let subscriber = tracing_subscriber::registry().with(env_filter);
        let result = if json {
            subscriber
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
        } else {
            subscriber.with(tracing_subscriber::fmt::layer()).try_init()
        };
        return result.map_err(|e| TelemetryError::SubscriberError(e.to_string()));
    }

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()
        .map_err(|e| TelemetryError::ExporterError(e.to_string()))?;

    let tracer_provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_sampler(sampler_for(config.clamped_sampling_rate()))
        .with_resource(Resource::new(vec![
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                config.service_name.clone(),
            ),
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            ),
        ]))
        .build();

    let tracer = tracer_provider.tracer(config.service_name.clone());
    opentelemetry::global::set_tracer_provider(tracer_provider);

    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer);

    let result = if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        subscriber.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| TelemetryError::SubscriberError(e.to_string()))
}

/// Flushes pending spans. Call once during graceful shutdown.
pub fn shutdown() {
    opentelemetry::global::shutdown_tracer_provider();
}
