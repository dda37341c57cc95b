// =============================================================================
// SESSION MODULE
// =============================================================================
// The state one user session owns: the toner catalog and the two logs.
//
// NOTES:
// - State is an explicit value passed to whoever needs it, never a global
// - Each recorded event runs to completion: validate, resolve the toner,
//   apply through the ledger, append to the log, persist
// - A rejected event leaves both memory and the store untouched
// =============================================================================

use chrono::{NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppResult, InventoryError};
use crate::ledger;
use crate::metrics;
use crate::models::{
    DashboardSummary, Entry, EntryRequest, Exit, ExitRequest, LowStockAlert, MovementKind,
    StockDrift, StockMovement, Toner,
};
use crate::seed;
use crate::store::{KeyValueStore, Store, ENTRIES_KEY, EXITS_KEY, TONERS_KEY};

/// How many toners the dashboard ranks by usage.
pub const TOP_USED_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InventoryState {
    pub toners: Vec<Toner>,
    pub entries: Vec<Entry>,
    pub exits: Vec<Exit>,
}

impl InventoryState {
    /// The fixed catalog with its seeded logs.
    pub fn seeded() -> Self {
        Self {
            toners: seed::toners(),
            entries: seed::entries(),
            exits: seed::exits(),
        }
    }

    // -------------------------------------------------------------------------
    // PERSISTENCE
    // -------------------------------------------------------------------------
    /// Load the three collections, each falling back to its seed independently.
    pub fn load<S: KeyValueStore>(store: &Store<S>) -> Self {
        let state = Self {
            toners: store.load(TONERS_KEY, seed::toners()),
            entries: store.load(ENTRIES_KEY, seed::entries()),
            exits: store.load(EXITS_KEY, seed::exits()),
        };
        info!(
            toners = state.toners.len(),
            entries = state.entries.len(),
            exits = state.exits.len(),
            "Inventory state loaded"
        );
        state.refresh_gauges();
        state
    }

    pub fn persist<S: KeyValueStore>(&self, store: &Store<S>) {
        store.save(TONERS_KEY, &self.toners);
        store.save(ENTRIES_KEY, &self.entries);
        store.save(EXITS_KEY, &self.exits);
    }

    pub fn toner(&self, toner_id: &str) -> Option<&Toner> {
        self.toners.iter().find(|toner| toner.id == toner_id)
    }

    fn resolve(&self, toner_id: &str) -> AppResult<&Toner> {
        self.toner(toner_id).ok_or_else(|| {
            warn!(toner_id, "Movement references unknown toner");
            InventoryError::MissingReference {
                toner_id: toner_id.to_string(),
            }
        })
    }

    // -------------------------------------------------------------------------
    // RECORD ENTRY
    // -------------------------------------------------------------------------
    /// Receive a purchase and persist the result.
    ///
    /// # Errors
    /// * `Validation` - toner or supplier missing, zero quantity, negative
    ///   price, or a quantity the stock count cannot hold
    /// * `MissingReference` - toner not in the catalog
    pub fn record_entry<S: KeyValueStore>(
        &mut self,
        store: &Store<S>,
        request: EntryRequest,
    ) -> AppResult<StockMovement> {
        validate_entry(&request)?;
        let previous_stock = self.resolve(&request.toner_id)?.quantity;
        let new_stock = previous_stock.checked_add(request.quantity).ok_or_else(|| {
            InventoryError::Validation(format!(
                "Quantity {} would overflow the stock count of {}",
                request.quantity, previous_stock
            ))
        })?;

        let entry = Entry::from_request(request, Uuid::new_v4().to_string(), Utc::now());
        self.toners = ledger::apply_entry(&self.toners, &entry);

        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            toner_id: entry.toner_id.clone(),
            kind: MovementKind::Entry,
            quantity: entry.quantity,
            previous_stock,
            new_stock,
            date: entry.entry_date,
            user: entry.requested_by.clone(),
            reference: entry.id.clone(),
            notes: entry.notes.clone(),
        };
        self.entries.push(entry);

        store.save(TONERS_KEY, &self.toners);
        store.save(ENTRIES_KEY, &self.entries);

        metrics::record_entry(&movement.toner_id);
        self.refresh_gauges();
        info!(
            toner_id = %movement.toner_id,
            quantity = movement.quantity,
            previous_stock,
            new_stock,
            entry_id = %movement.reference,
            "Entry recorded"
        );

        Ok(movement)
    }

    // -------------------------------------------------------------------------
    // RECORD EXIT
    // -------------------------------------------------------------------------
    /// Issue stock and persist the result.
    ///
    /// # Errors
    /// * `Validation` - toner or printer location missing, zero quantity
    /// * `MissingReference` - toner not in the catalog
    /// * `InsufficientStock` - more units requested than on hand
    pub fn record_exit<S: KeyValueStore>(
        &mut self,
        store: &Store<S>,
        request: ExitRequest,
    ) -> AppResult<StockMovement> {
        validate_exit(&request)?;
        let previous_stock = self.resolve(&request.toner_id)?.quantity;

        let exit = Exit::from_request(request, Uuid::new_v4().to_string(), Utc::now());
        self.toners = match ledger::apply_exit(&self.toners, &exit) {
            Ok(toners) => toners,
            Err(shortage) => {
                metrics::record_exit(&exit.toner_id, false);
                warn!(
                    toner_id = %shortage.toner_id,
                    available = shortage.available,
                    requested = shortage.requested,
                    "Exit rejected"
                );
                return Err(shortage.into());
            }
        };
        let new_stock = previous_stock - exit.quantity;

        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            toner_id: exit.toner_id.clone(),
            kind: MovementKind::Exit,
            quantity: exit.quantity,
            previous_stock,
            new_stock,
            date: exit.exit_date,
            user: exit.requested_by.clone(),
            reference: exit.id.clone(),
            notes: exit.notes.clone(),
        };
        self.exits.push(exit);

        store.save(TONERS_KEY, &self.toners);
        store.save(EXITS_KEY, &self.exits);

        metrics::record_exit(&movement.toner_id, true);
        self.refresh_gauges();
        info!(
            toner_id = %movement.toner_id,
            quantity = movement.quantity,
            previous_stock,
            new_stock,
            exit_id = %movement.reference,
            "Exit recorded"
        );

        Ok(movement)
    }

    // -------------------------------------------------------------------------
    // QUERIES
    // -------------------------------------------------------------------------
    pub fn low_stock_alerts(&self) -> Vec<LowStockAlert> {
        ledger::low_stock_alerts(&self.toners)
    }

    pub fn total_value(&self) -> Decimal {
        ledger::total_inventory_value(&self.toners, &self.entries)
    }

    /// Compare cached quantities with the logs folded from the catalog's
    /// opening stock. Toners outside the seeded catalog open at zero.
    pub fn reconcile(&self) -> Vec<StockDrift> {
        let drift = ledger::reconcile(
            &self.toners,
            &seed::opening_stock(),
            &self.entries,
            &self.exits,
        );
        for d in &drift {
            warn!(
                toner_id = %d.toner_id,
                cached = d.cached,
                derived = d.derived,
                "Cached quantity drifted from ledger"
            );
        }
        drift
    }

    pub fn dashboard(&self, today: NaiveDate, recent_limit: usize) -> DashboardSummary<'_> {
        DashboardSummary {
            total_toners: self.toners.len(),
            total_units: ledger::total_units(&self.toners),
            low_stock_items: self.toners.iter().filter(|t| ledger::is_low_stock(t)).count(),
            total_value: self.total_value(),
            movements_today: ledger::movements_on(&self.entries, &self.exits, today),
            recent_movements: ledger::recent_movements(&self.entries, &self.exits, recent_limit),
            top_used: ledger::top_used_toners(&self.toners, &self.exits, TOP_USED_LIMIT),
        }
    }

    fn refresh_gauges(&self) {
        for toner in &self.toners {
            metrics::set_stock_level(&toner.id, toner.color.as_str(), toner.quantity);
        }
        metrics::set_low_stock_count(self.toners.iter().filter(|t| t.is_low_stock()).count());
        metrics::set_inventory_value(self.total_value().to_f64().unwrap_or(0.0));
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

fn validate_entry(request: &EntryRequest) -> AppResult<()> {
    if request.toner_id.trim().is_empty() || request.supplier.trim().is_empty() {
        return Err(InventoryError::Validation(
            "Fill in all required fields: toner and supplier".to_string(),
        ));
    }
    if request.quantity == 0 {
        return Err(InventoryError::Validation(
            "Quantity must be at least 1".to_string(),
        ));
    }
    if request.unit_price < Decimal::ZERO {
        return Err(InventoryError::Validation(
            "Unit price cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_exit(request: &ExitRequest) -> AppResult<()> {
    if request.toner_id.trim().is_empty() || request.printer_location.trim().is_empty() {
        return Err(InventoryError::Validation(
            "Fill in all required fields: toner and printer location".to_string(),
        ));
    }
    if request.quantity == 0 {
        return Err(InventoryError::Validation(
            "Quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}
