//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `managed_certificate_reconciliations_total` - Total number of reconcile passes
//! - `managed_certificate_reconciliation_errors_total` - Reconcile passes that failed
//! - `managed_certificate_reconciliation_duration_seconds` - Duration of reconcile passes
//! - `managed_certificate_ssl_certificates_created_total` - SslCertificates created
//! - `managed_certificate_names_allocated_total` - SslCertificate names reserved
//! - `managed_certificate_name_collisions_total` - Generated names that already existed
//! - `managed_certificate_requeues_total` - Failed resources requeued with backoff
//! - `managed_certificate_retries_exhausted_total` - Resources given up on after the retry ceiling
//! - `managed_certificate_dropped_items_total` - Objects without a namespace/name identity
//! - `managed_certificate_watch_errors_total` - Watch stream errors by kind
//! - `managed_certificate_backend_operations_total` - Backend calls by operation and result
//! - `managed_certificate_backend_operation_duration_seconds` - Duration of backend calls

use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "managed_certificate_reconciliations_total",
        "Total number of reconcile passes",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "managed_certificate_reconciliation_errors_total",
        "Total number of reconcile passes that failed",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "managed_certificate_reconciliation_duration_seconds",
            "Duration of reconcile passes in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static SSL_CERTIFICATES_CREATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "managed_certificate_ssl_certificates_created_total",
        "Total number of SslCertificates created",
    )
    .expect("Failed to create SSL_CERTIFICATES_CREATED_TOTAL metric - this should never happen")
});

static NAMES_ALLOCATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "managed_certificate_names_allocated_total",
        "Total number of SslCertificate names reserved",
    )
    .expect("Failed to create NAMES_ALLOCATED_TOTAL metric - this should never happen")
});

static NAME_COLLISIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "managed_certificate_name_collisions_total",
        "Total number of generated names that were already taken",
    )
    .expect("Failed to create NAME_COLLISIONS_TOTAL metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "managed_certificate_requeues_total",
        "Total number of failed resources requeued with backoff",
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

static RETRIES_EXHAUSTED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "managed_certificate_retries_exhausted_total",
        "Total number of resources given up on after reaching the retry ceiling",
    )
    .expect("Failed to create RETRIES_EXHAUSTED_TOTAL metric - this should never happen")
});

static DROPPED_ITEMS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "managed_certificate_dropped_items_total",
        "Total number of objects dropped for lacking a namespace/name identity",
    )
    .expect("Failed to create DROPPED_ITEMS_TOTAL metric - this should never happen")
});

static WATCH_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "managed_certificate_watch_errors_total",
            "Total number of watch stream errors",
        ),
        &["kind"],
    )
    .expect("Failed to create WATCH_ERRORS_TOTAL metric - this should never happen")
});

static BACKEND_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "managed_certificate_backend_operations_total",
            "Total number of SslCertificate backend operations",
        ),
        &["operation", "result"],
    )
    .expect("Failed to create BACKEND_OPERATIONS_TOTAL metric - this should never happen")
});

static BACKEND_OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "managed_certificate_backend_operation_duration_seconds",
            "Duration of SslCertificate backend operations in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
        &["operation"],
    )
    .expect("Failed to create BACKEND_OPERATION_DURATION metric - this should never happen")
});

/// Register all metrics with the registry
///
/// # Errors
/// Returns an error if a metric is registered twice.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(SSL_CERTIFICATES_CREATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(NAMES_ALLOCATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(NAME_COLLISIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RETRIES_EXHAUSTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DROPPED_ITEMS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(WATCH_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(BACKEND_OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(BACKEND_OPERATION_DURATION.clone()))?;
    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_ssl_certificates_created() {
    SSL_CERTIFICATES_CREATED_TOTAL.inc();
}

pub fn increment_names_allocated() {
    NAMES_ALLOCATED_TOTAL.inc();
}

pub fn increment_name_collisions() {
    NAME_COLLISIONS_TOTAL.inc();
}

pub fn increment_requeues() {
    REQUEUES_TOTAL.inc();
}

pub fn increment_retries_exhausted() {
    RETRIES_EXHAUSTED_TOTAL.inc();
}

pub fn increment_dropped_items() {
    DROPPED_ITEMS_TOTAL.inc();
}

pub fn increment_watch_errors(kind: &str) {
    WATCH_ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_backend_operation(operation: &str, result: &str, duration: f64) {
    BACKEND_OPERATIONS_TOTAL
        .with_label_values(&[operation, result])
        .inc();
    BACKEND_OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(duration);
}
