// =============================================================================
// ERROR MODULE
// =============================================================================
// Error taxonomy for the toner ledger.
//
// NOTES:
// - The ledger engine only ever fails with `InsufficientStock`
// - The session adds `MissingReference` and `Validation` before it touches
//   the ledger
// - `StoreError` never leaves the store adapter; it is logged and absorbed
// =============================================================================

use thiserror::Error;

use crate::models::ErrorResponse;

// =============================================================================
// LEDGER FAILURE
// =============================================================================
/// An exit asked for more units than are on hand.
///
/// The toner collection is left untouched when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Insufficient stock for toner {toner_id}: available {available}, requested {requested}")]
pub struct InsufficientStock {
    pub toner_id: String,
    pub available: u32,
    pub requested: u32,
}

// =============================================================================
// SESSION ERRORS
// =============================================================================
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    // -------------------------------------------------------------------------
    // BUSINESS LOGIC ERRORS
    // -------------------------------------------------------------------------
    /// Exit quantity exceeds the current toner quantity
    #[error(transparent)]
    InsufficientStock(#[from] InsufficientStock),

    /// Entry or exit names a toner that is not in the catalog
    #[error("Toner not found: {toner_id}")]
    MissingReference { toner_id: String },

    // -------------------------------------------------------------------------
    // FORM ERRORS
    // -------------------------------------------------------------------------
    /// Required field missing or out of range
    #[error("Invalid request: {0}")]
    Validation(String),
}

impl InventoryError {
    /// Stable code for logs and the presentation layer.
    pub fn error_code(&self) -> &'static str {
        match self {
            InventoryError::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            InventoryError::MissingReference { .. } => "NOT_FOUND",
            InventoryError::Validation(_) => "VALIDATION_FAILED",
        }
    }
}

// -----------------------------------------------------------------------------
// USER-VISIBLE MESSAGE
// -----------------------------------------------------------------------------
impl From<&InventoryError> for ErrorResponse {
    fn from(err: &InventoryError) -> Self {
        let code = err.error_code();
        match err {
            InventoryError::InsufficientStock(shortage) => ErrorResponse::with_details(
                code,
                "Insufficient quantity in stock",
                format!(
                    "Available: {}, Requested: {}",
                    shortage.available, shortage.requested
                ),
            ),
            InventoryError::MissingReference { toner_id } => {
                ErrorResponse::with_details(code, "Select a valid toner", toner_id.clone())
            }
            InventoryError::Validation(msg) => ErrorResponse::new(code, msg.clone()),
        }
    }
}

/// Results that use the session error type.
pub type AppResult<T> = Result<T, InventoryError>;

// =============================================================================
// PERSISTENCE ERRORS
// =============================================================================
/// Failure reading or writing the key-value medium.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The medium refused the write because it would exceed its capacity
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Storage lock poisoned: {0}")]
    Poisoned(String),
}
