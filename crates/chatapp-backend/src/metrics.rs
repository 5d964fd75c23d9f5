/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Metrics Module
//!
//! Prometheus metrics for the chat backend: HTTP traffic, store latency,
//! messages sent, history requests and websocket sessions.

use once_cell::sync::Lazy;
use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, IntCounter, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global Prometheus registry for all backend metrics
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// HTTP request counter
/// Labels: endpoint, method, status
pub static HTTP_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    let opts = Opts::new(
        "chatapp_http_requests_total",
        "Total number of HTTP requests by endpoint and status",
    );
    let counter = CounterVec::new(opts, &["endpoint", "method", "status"])
        .expect("Failed to create HTTP requests counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register HTTP requests counter");
    counter
});

/// HTTP request duration histogram
/// Labels: endpoint, method
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let opts = HistogramOpts::new(
        "chatapp_http_request_duration_seconds",
        "HTTP request latency distribution in seconds",
    )
    .buckets(vec![
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ]);
    let histogram = HistogramVec::new(opts, &["endpoint", "method"])
        .expect("Failed to create HTTP request duration histogram");
    REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("Failed to register HTTP request duration histogram");
    histogram
});

/// Store operation duration histogram
/// Labels: operation
pub static STORE_OPERATION_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let opts = HistogramOpts::new(
        "chatapp_store_operation_duration_seconds",
        "Message store latency distribution in seconds",
    )
    .buckets(vec![
        0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
    ]);
    let histogram = HistogramVec::new(opts, &["operation"])
        .expect("Failed to create store operation histogram");
    REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("Failed to register store operation histogram");
    histogram
});

/// Messages accepted and stored
pub static MESSAGES_SENT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new("chatapp_messages_sent_total", "Total messages stored")
        .expect("Failed to create messages sent counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register messages sent counter");
    counter
});

/// History requests answered over websockets
pub static HISTORY_REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "chatapp_history_requests_total",
        "Total history requests answered",
    )
    .expect("Failed to create history requests counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register history requests counter");
    counter
});

/// Broadcast payloads forwarded to websocket clients
pub static BROADCASTS_FORWARDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "chatapp_broadcasts_forwarded_total",
        "Total broadcast payloads forwarded to websocket clients",
    )
    .expect("Failed to create broadcasts forwarded counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register broadcasts forwarded counter");
    counter
});

/// Number of open websocket sessions
pub static WEBSOCKET_SESSIONS: Lazy<IntGauge> = Lazy::new(|| {
    let opts = Opts::new("chatapp_websocket_sessions", "Number of open websocket sessions");
    let gauge = IntGauge::with_opts(opts).expect("Failed to create websocket sessions gauge");
    REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("Failed to register websocket sessions gauge");
    gauge
});

/// Forces registration of every metric so they appear before first use.
pub fn init() {
    Lazy::force(&HTTP_REQUESTS_TOTAL);
    Lazy::force(&HTTP_REQUEST_DURATION_SECONDS);
    Lazy::force(&STORE_OPERATION_DURATION_SECONDS);
    Lazy::force(&MESSAGES_SENT_TOTAL);
    Lazy::force(&HISTORY_REQUESTS_TOTAL);
    Lazy::force(&BROADCASTS_FORWARDED_TOTAL);
    Lazy::force(&WEBSOCKET_SESSIONS);
}

/// Encodes all registered metrics in Prometheus text format
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
