// =============================================================================
// METRICS MODULE
// =============================================================================
// Prometheus metrics for the ledger and the store adapter.
//
// NOTES:
// - Recording goes through the `metrics` facade; with no recorder installed
//   (library use, tests) every call is a no-op
// - The binary installs the Prometheus recorder and can write the rendered
//   text to a file for a textfile collector
//
// METRIC TYPES:
// - Counter: Only goes up (entries recorded, store failures)
// - Gauge: Can go up or down (stock level, inventory value)
// - Histogram: Distribution of values in buckets (store latency)
// =============================================================================

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

// =============================================================================
// METRIC NAMES
// =============================================================================

/// Entries applied. Labels: toner_id
pub const TONER_ENTRIES_TOTAL: &str = "toner_entries_total";

/// Exit attempts. Labels: toner_id, status (success/rejected)
pub const TONER_EXITS_TOTAL: &str = "toner_exits_total";

/// On-hand units. Labels: toner_id, color
pub const TONER_STOCK_LEVEL: &str = "toner_stock_level";

/// Toners at or below their minimum
pub const TONER_LOW_STOCK_ITEMS: &str = "toner_low_stock_items";

/// Stock value at last purchase price
pub const TONER_INVENTORY_VALUE: &str = "toner_inventory_value";

/// Store latency. Labels: operation (load/save)
pub const STORE_OPERATION_DURATION_SECONDS: &str = "store_operation_duration_seconds";

/// Swallowed store failures. Labels: operation (load/save)
pub const STORE_FAILURES_TOTAL: &str = "store_failures_total";

// =============================================================================
// SETUP FUNCTION
// =============================================================================
/// Install the Prometheus recorder and return the handle used to render it.
pub fn setup_metrics() -> Result<PrometheusHandle> {
    // Local file/memory I/O: sub-millisecond to a few hundred milliseconds
    let store_buckets = &[
        0.0001, // 100us
        0.0005, // 500us
        0.001,  // 1ms
        0.005,  // 5ms
        0.01,   // 10ms
        0.05,   // 50ms
        0.1,    // 100ms
        0.5,    // 500ms
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(STORE_OPERATION_DURATION_SECONDS.to_string()),
            store_buckets,
        )?
        .install_recorder()?;

    describe_counter!(TONER_ENTRIES_TOTAL, "Total number of stock entries applied");
    describe_counter!(TONER_EXITS_TOTAL, "Total number of stock exit attempts");
    describe_gauge!(TONER_STOCK_LEVEL, "Current on-hand units for each toner");
    describe_gauge!(
        TONER_LOW_STOCK_ITEMS,
        "Number of toners at or below their minimum stock"
    );
    describe_gauge!(
        TONER_INVENTORY_VALUE,
        "Inventory value at each toner's last purchase price"
    );
    describe_histogram!(
        STORE_OPERATION_DURATION_SECONDS,
        "Key-value store operation latency in seconds"
    );
    describe_counter!(
        STORE_FAILURES_TOTAL,
        "Store reads or writes that failed and were absorbed"
    );

    Ok(handle)
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

pub fn record_entry(toner_id: &str) {
    counter!(TONER_ENTRIES_TOTAL, "toner_id" => toner_id.to_string()).increment(1);
}

/// Record an exit attempt
///
/// # Arguments
/// * `toner_id` - Toner the exit was requested for
/// * `success` - Whether the exit was applied
pub fn record_exit(toner_id: &str, success: bool) {
    let status = if success { "success" } else { "rejected" };
    counter!(
        TONER_EXITS_TOTAL,
        "toner_id" => toner_id.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn set_stock_level(toner_id: &str, color: &str, level: u32) {
    gauge!(
        TONER_STOCK_LEVEL,
        "toner_id" => toner_id.to_string(),
        "color" => color.to_string()
    )
    .set(f64::from(level));
}

pub fn set_low_stock_count(count: usize) {
    gauge!(TONER_LOW_STOCK_ITEMS).set(count as f64);
}

pub fn set_inventory_value(value: f64) {
    gauge!(TONER_INVENTORY_VALUE).set(value);
}

pub fn record_store_operation(operation: &str, duration_secs: f64) {
    histogram!(
        STORE_OPERATION_DURATION_SECONDS,
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

pub fn record_store_failure(operation: &str) {
    counter!(STORE_FAILURES_TOTAL, "operation" => operation.to_string()).increment(1);
}
