//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Sync cycles (outcome, duration, releases found/grabbed/deferred)
//! - Decision engine (rejections per specification)
//! - Pending release queue (inserts, replacements, removals)
//! - External services (feeds, download client, catch-up search)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Sync Metrics
// =============================================================================

/// Sync cycles total by result.
pub static SYNC_CYCLES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("grabline_sync_cycles_total", "Total sync cycles"),
        &["result"], // "completed", "failed", "rejected"
    )
    .unwrap()
});

/// Sync cycle duration in seconds.
pub static SYNC_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("grabline_sync_duration_seconds", "Duration of a sync cycle")
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
    )
    .unwrap()
});

/// Releases considered by sync cycles (fresh and pending).
pub static RELEASES_FOUND: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "grabline_releases_found_total",
        "Total releases evaluated by sync cycles",
    )
    .unwrap()
});

/// Releases submitted to the download client.
pub static RELEASES_GRABBED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "grabline_releases_grabbed_total",
        "Total releases submitted for download",
    )
    .unwrap()
});

/// Releases deferred to the pending queue.
pub static RELEASES_DEFERRED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "grabline_releases_deferred_total",
        "Total temporarily rejected releases handed to the pending queue",
    )
    .unwrap()
});

// =============================================================================
// Decision Metrics
// =============================================================================

/// Rejections by specification and kind.
pub static DECISION_REJECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "grabline_decision_rejections_total",
            "Total rejections produced by decision specifications",
        ),
        &["specification", "kind"], // kind: "permanent", "temporary"
    )
    .unwrap()
});

// =============================================================================
// Pending Queue Metrics
// =============================================================================

/// Pending queue mutations by action.
pub static PENDING_QUEUE_CHANGES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "grabline_pending_queue_changes_total",
            "Total pending release queue mutations",
        ),
        // "inserted", "replaced", "discarded", "removed_grabbed", "removed", "series_deleted"
        &["action"],
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "grabline_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Record the outcome of an external call.
pub fn record_external(service: &str, operation: &str, success: bool) {
    let status = if success { "success" } else { "error" };
    EXTERNAL_SERVICE_REQUESTS
        .with_label_values(&[service, operation, status])
        .inc();
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Sync
        Box::new(SYNC_CYCLES.clone()),
        Box::new(SYNC_DURATION.clone()),
        Box::new(RELEASES_FOUND.clone()),
        Box::new(RELEASES_GRABBED.clone()),
        Box::new(RELEASES_DEFERRED.clone()),
        // Decisions
        Box::new(DECISION_REJECTIONS.clone()),
        // Pending queue
        Box::new(PENDING_QUEUE_CHANGES.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}
