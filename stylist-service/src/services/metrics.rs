//! Metrics module for stylist-service.
//! Provides Prometheus metrics for quota enforcement and generation traffic.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

/// Database query duration histogram
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "stylist_db_query_duration_seconds",
            "Database query duration"
        ),
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Quota check counter by dimension and outcome
pub static QUOTA_CHECKS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Generation counter by tier
pub static GENERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup.
pub fn init_metrics() {
    QUOTA_CHECKS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "stylist_quota_checks_total",
                "Quota checks by dimension and outcome"
            ),
            &["dimension", "outcome"]
        )
        .expect("Failed to register QUOTA_CHECKS_TOTAL")
    });

    GENERATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!("stylist_generations_total", "Outfit generations by tier"),
            &["tier"]
        )
        .expect("Failed to register GENERATIONS_TOTAL")
    });

    // Force initialization of lazy statics
    let _ = &*DB_QUERY_DURATION;
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Failed to convert metrics to string")
}

/// Record a quota check outcome.
pub fn record_quota_check(dimension: &str, outcome: &str) {
    if let Some(counter) = QUOTA_CHECKS_TOTAL.get() {
        counter.with_label_values(&[dimension, outcome]).inc();
    }
}

/// Record a completed generation.
pub fn record_generation(tier: &str) {
    if let Some(counter) = GENERATIONS_TOTAL.get() {
        counter.with_label_values(&[tier]).inc();
    }
}
