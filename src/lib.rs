// =============================================================================
// TONER INVENTORY - Library Root
// =============================================================================
// Stock ledger for printer toner cartridges.
//
// WHAT THIS CRATE PROVIDES:
// - Record types: Toner, Entry (purchase), Exit (issuance)
// - Ledger engine: apply entries/exits, low-stock, valuation, recent movements
// - Store adapter: namespaced JSON over a string key-value medium
// - Session state: validated recording of events with persistence
//
// The presentation layer uses `ledger` for reads, `session` for writes and
// `store` as its only persistence boundary.
// =============================================================================

pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod models;
pub mod seed;
pub mod session;
pub mod store;

pub use error::{AppResult, InsufficientStock, InventoryError, StoreError};
pub use session::InventoryState;
pub use store::{FileStore, KeyValueStore, MemoryStore, Store};
