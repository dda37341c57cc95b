// =============================================================================
// TONER INVENTORY - Main Entry Point
// =============================================================================
// Boots one headless session against the file-backed store.
//
// WHAT THIS BINARY DOES:
// - Loads the toner catalog and logs (seed data on first run)
// - Checks cached quantities against the logs
// - Reports the dashboard and low-stock alerts as structured logs
// - Persists the state and optionally writes a Prometheus text snapshot
// =============================================================================

use std::fs;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use toner_inventory::config::Config;
use toner_inventory::metrics::setup_metrics;
use toner_inventory::{ledger, seed};
use toner_inventory::{FileStore, InventoryState, Store};

fn main() -> anyhow::Result<()> {
    // -------------------------------------------------------------------------
    // STEP 1: Load environment variables
    // -------------------------------------------------------------------------
    dotenvy::dotenv().ok(); // .env is optional

    // -------------------------------------------------------------------------
    // STEP 2: Initialize logging/tracing
    // -------------------------------------------------------------------------
    // RUST_LOG controls levels, e.g. RUST_LOG=info,toner_inventory=debug
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,toner_inventory=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting toner inventory session...");

    // -------------------------------------------------------------------------
    // STEP 3: Load configuration
    // -------------------------------------------------------------------------
    let config = Config::from_env()?;
    info!(
        data_dir = %config.data_dir.display(),
        namespace = %config.namespace,
        "Configuration loaded"
    );

    // -------------------------------------------------------------------------
    // STEP 4: Set up Prometheus metrics
    // -------------------------------------------------------------------------
    let metrics_handle = setup_metrics()?;
    info!("Prometheus metrics initialized");

    // -------------------------------------------------------------------------
    // STEP 5: Open the store and load state
    // -------------------------------------------------------------------------
    let store = Store::new(FileStore::new(&config.data_dir), config.namespace.clone());
    info!(dir = %store.backend().dir().display(), "File store opened");
    let state = InventoryState::load(&store);

    let users = seed::users();
    let authorizers: Vec<&str> = ledger::authorizers(&users)
        .iter()
        .map(|user| user.name.as_str())
        .collect();
    info!(
        users = users.len(),
        authorizers = %authorizers.join(", "),
        "Staff directory loaded"
    );

    let drift = state.reconcile();
    if !drift.is_empty() {
        warn!(toners = drift.len(), "Stock quantities disagree with the ledger");
    }

    // -------------------------------------------------------------------------
    // STEP 6: Report
    // -------------------------------------------------------------------------
    let summary = state.dashboard(Utc::now().date_naive(), config.recent_movements_limit);
    info!(
        total_toners = summary.total_toners,
        total_units = summary.total_units,
        low_stock_items = summary.low_stock_items,
        total_value = %summary.total_value,
        movements_today = summary.movements_today,
        recent_movements = summary.recent_movements.len(),
        top_used = %serde_json::to_string(&summary.top_used)?,
        "Dashboard"
    );

    for movement in &summary.recent_movements {
        info!(
            kind = ?movement.kind(),
            id = %movement.id(),
            toner_id = %movement.toner_id(),
            quantity = movement.quantity(),
            date = %movement.date(),
            "Recent movement"
        );
    }

    for alert in state.low_stock_alerts() {
        warn!(
            toner_id = %alert.toner_id,
            toner = %alert.name,
            quantity = alert.quantity,
            min_stock = alert.min_stock,
            location = %alert.location,
            "Low stock"
        );
    }

    // -------------------------------------------------------------------------
    // STEP 7: Persist and export
    // -------------------------------------------------------------------------
    state.persist(&store);

    if let Some(path) = &config.metrics_textfile {
        fs::write(path, metrics_handle.render())
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
        info!(path = %path.display(), "Metrics snapshot written");
    }

    info!("Session finished");
    Ok(())
}
