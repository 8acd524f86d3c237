//! # Metrics
//!
//! Prometheus metrics for monitoring the reconcilers.
//!
//! ## Metrics Exposed
//!
//! - `kinesis_analytics_remote_calls_total` - Remote API calls by operation
//! - `kinesis_analytics_remote_call_errors_total` - Failed remote API calls by operation and error kind
//! - `kinesis_analytics_remote_call_duration_seconds` - Duration of remote API calls
//! - `kinesis_analytics_propagation_retries_total` - Calls retried while IAM changes propagate
//! - `kinesis_analytics_wait_duration_seconds` - Time spent waiting for a status transition
//! - `kinesis_analytics_wait_failures_total` - Waits that ended in timeout, unexpected state or error
//! - `kinesis_analytics_reconciliations_total` - Reconciliations by resource and action
//! - `kinesis_analytics_reconciliation_errors_total` - Failed reconciliations by resource and action

use prometheus::{Encoder, HistogramVec, IntCounter, IntCounterVec, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static REMOTE_CALLS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "kinesis_analytics_remote_calls_total",
            "Total number of Kinesis Analytics API calls by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create REMOTE_CALLS_TOTAL metric - this should never happen")
});

static REMOTE_CALL_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "kinesis_analytics_remote_call_errors_total",
            "Total number of failed Kinesis Analytics API calls by operation and error kind",
        ),
        &["operation", "kind"],
    )
    .expect("Failed to create REMOTE_CALL_ERRORS_TOTAL metric - this should never happen")
});

static REMOTE_CALL_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "kinesis_analytics_remote_call_duration_seconds",
            "Duration of Kinesis Analytics API calls in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0]),
        &["operation"],
    )
    .expect("Failed to create REMOTE_CALL_DURATION metric - this should never happen")
});

static PROPAGATION_RETRIES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "kinesis_analytics_propagation_retries_total",
        "Total number of calls retried while waiting for IAM propagation",
    )
    .expect("Failed to create PROPAGATION_RETRIES_TOTAL metric - this should never happen")
});

static WAIT_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "kinesis_analytics_wait_duration_seconds",
            "Time spent waiting for a status transition in seconds",
        )
        .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["waiter"],
    )
    .expect("Failed to create WAIT_DURATION metric - this should never happen")
});

static WAIT_FAILURES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "kinesis_analytics_wait_failures_total",
            "Total number of failed status waits by waiter and reason",
        ),
        &["waiter", "reason"],
    )
    .expect("Failed to create WAIT_FAILURES_TOTAL metric - this should never happen")
});

static RECONCILIATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "kinesis_analytics_reconciliations_total",
            "Total number of reconciliations by resource and action",
        ),
        &["resource", "action"],
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "kinesis_analytics_reconciliation_errors_total",
            "Total number of failed reconciliations by resource and action",
        ),
        &["resource", "action"],
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
/// Register every metric with the crate registry
///
/// Fails if called twice (duplicate registration).
pub fn register_metrics() -> Result<(), prometheus::Error> {
    REGISTRY.register(Box::new(REMOTE_CALLS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REMOTE_CALL_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REMOTE_CALL_DURATION.clone()))?;
    REGISTRY.register(Box::new(PROPAGATION_RETRIES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(WAIT_DURATION.clone()))?;
    REGISTRY.register(Box::new(WAIT_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;

    Ok(())
}

/// Render the registry in the Prometheus text exposition format
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn record_remote_call(operation: &str, duration: Duration) {
    REMOTE_CALLS_TOTAL.with_label_values(&[operation]).inc();
    REMOTE_CALL_DURATION
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

pub fn increment_remote_call_errors(operation: &str, kind: &str) {
    REMOTE_CALL_ERRORS_TOTAL
        .with_label_values(&[operation, kind])
        .inc();
}

pub fn increment_propagation_retries() {
    PROPAGATION_RETRIES_TOTAL.inc();
}

pub fn observe_wait_duration(waiter: &str, duration: Duration) {
    WAIT_DURATION
        .with_label_values(&[waiter])
        .observe(duration.as_secs_f64());
}

pub fn increment_wait_failures(waiter: &str, reason: &str) {
    WAIT_FAILURES_TOTAL.with_label_values(&[waiter, reason]).inc();
}

pub fn increment_reconciliations(resource: &str, action: &str) {
    RECONCILIATIONS_TOTAL
        .with_label_values(&[resource, action])
        .inc();
}

pub fn increment_reconciliation_errors(resource: &str, action: &str) {
    RECONCILIATION_ERRORS_TOTAL
        .with_label_values(&[resource, action])
        .inc();
}
