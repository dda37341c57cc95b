// =============================================================================
// MODELS MODULE
// =============================================================================
// Plain data records shared by the ledger engine, the store adapter and the
// presentation layer.
//
// NOTES:
// - Field names serialize in camelCase (`tonerId`, `minStock`, ...), which is
//   the layout of the persisted collections
// - Timestamps serialize as RFC 3339 text and round-trip without loss
// - Prices are `Decimal`, serialized as strings
// =============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// TONER
// =============================================================================

/// Cartridge color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TonerColor {
    Black,
    Cyan,
    Magenta,
    Yellow,
}

impl TonerColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TonerColor::Black => "black",
            TonerColor::Cyan => "cyan",
            TonerColor::Magenta => "magenta",
            TonerColor::Yellow => "yellow",
        }
    }
}

// -----------------------------------------------------------------------------
// TONER RECORD
// -----------------------------------------------------------------------------
/// A stocked cartridge.
///
/// `quantity` is the cached on-hand count. It only changes through
/// [`crate::ledger::apply_entry`] and [`crate::ledger::apply_exit`], both of
/// which refresh `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toner {
    /// Unique identifier within the catalog
    pub id: String,

    /// Printed barcode, informational only
    pub barcode: String,

    /// Manufacturer, e.g. "HP"
    pub brand: String,

    /// Cartridge model code, e.g. "CF280A"
    pub model: String,

    pub color: TonerColor,

    /// Printer the cartridge fits, e.g. "LaserJet Pro M404"
    pub printer_model: String,

    /// Current on-hand count
    pub quantity: u32,

    /// Reorder threshold; at or below it the toner is "low"
    pub min_stock: u32,

    /// Storage location, free text
    pub location: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -----------------------------------------------------------------------------
// COMPUTED PROPERTIES
// -----------------------------------------------------------------------------
impl Toner {
    /// True when the on-hand count is at or below `min_stock`.
    ///
    /// There is no hysteresis: a toner sitting exactly on its threshold is
    /// already low.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }

    /// "Brand Model", the label used in tables and alerts.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

// =============================================================================
// USERS
// =============================================================================

/// Access level of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    User,
}

/// A staff member who requests or authorizes movements.
///
/// Movements name people as free text; nothing checks them against this
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: UserRole,

    /// May appear as `authorizedBy` on a movement
    pub can_authorize: bool,
}

// =============================================================================
// LEDGER EVENTS
// =============================================================================
// Entries and exits are immutable once created. They are appended to their
// log and never edited or removed.

// -----------------------------------------------------------------------------
// ENTRY (received purchase)
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,

    /// Toner this purchase restocks
    pub toner_id: String,

    /// Units received, always positive
    pub quantity: u32,

    pub purchase_date: DateTime<Utc>,

    /// Date the goods arrived; drives valuation ordering
    pub entry_date: DateTime<Utc>,

    pub requested_by: String,
    pub authorized_by: String,
    pub supplier: String,

    pub unit_price: Decimal,

    /// `quantity * unit_price`, fixed when the entry is created
    pub total_price: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// When the record itself was created (distinct from `entry_date`)
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Build an entry from a submitted request.
    ///
    /// `total_price` is computed here and never re-derived afterwards.
    pub fn from_request(request: EntryRequest, id: String, created_at: DateTime<Utc>) -> Self {
        let total_price = request.unit_price * Decimal::from(request.quantity);
        Self {
            id,
            toner_id: request.toner_id,
            quantity: request.quantity,
            purchase_date: request.purchase_date,
            entry_date: request.entry_date,
            requested_by: request.requested_by,
            authorized_by: request.authorized_by,
            supplier: request.supplier,
            unit_price: request.unit_price,
            total_price,
            invoice_number: request.invoice_number,
            notes: request.notes,
            created_at,
        }
    }
}

// -----------------------------------------------------------------------------
// EXIT (issued to a department)
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exit {
    pub id: String,

    /// Toner being issued
    pub toner_id: String,

    /// Units issued, always positive
    pub quantity: u32,

    pub exit_date: DateTime<Utc>,

    pub requested_by: String,
    pub authorized_by: String,

    /// Receiving department, e.g. "Sales"
    pub department: String,

    /// Where the printer is, e.g. "Room 201"
    pub printer_location: String,

    /// Why the cartridge was issued
    pub reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Exit {
    pub fn from_request(request: ExitRequest, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            toner_id: request.toner_id,
            quantity: request.quantity,
            exit_date: request.exit_date,
            requested_by: request.requested_by,
            authorized_by: request.authorized_by,
            department: request.department,
            printer_location: request.printer_location,
            reason: request.reason,
            notes: request.notes,
            created_at,
        }
    }
}

// =============================================================================
// REQUEST STRUCTURES
// =============================================================================
// What the presentation layer submits. The session assigns `id` and
// `createdAt` (and `totalPrice` for entries) when it records the event.

/// Form data for a received purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRequest {
    pub toner_id: String,
    pub quantity: u32,
    pub purchase_date: DateTime<Utc>,
    pub entry_date: DateTime<Utc>,
    pub requested_by: String,
    pub authorized_by: String,
    pub supplier: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Form data for an issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitRequest {
    pub toner_id: String,
    pub quantity: u32,
    pub exit_date: DateTime<Utc>,
    pub requested_by: String,
    pub authorized_by: String,
    pub department: String,
    pub printer_location: String,
    pub reason: String,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// MOVEMENTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Entry,
    Exit,
}

// -----------------------------------------------------------------------------
// MOVEMENT (borrowed view over either log)
// -----------------------------------------------------------------------------
/// One record from the entry or exit log, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Movement<'a> {
    Entry(&'a Entry),
    Exit(&'a Exit),
}

impl<'a> Movement<'a> {
    pub fn kind(&self) -> MovementKind {
        match self {
            Movement::Entry(_) => MovementKind::Entry,
            Movement::Exit(_) => MovementKind::Exit,
        }
    }

    pub fn id(&self) -> &'a str {
        match self {
            Movement::Entry(entry) => &entry.id,
            Movement::Exit(exit) => &exit.id,
        }
    }

    pub fn toner_id(&self) -> &'a str {
        match self {
            Movement::Entry(entry) => &entry.toner_id,
            Movement::Exit(exit) => &exit.toner_id,
        }
    }

    pub fn quantity(&self) -> u32 {
        match self {
            Movement::Entry(entry) => entry.quantity,
            Movement::Exit(exit) => exit.quantity,
        }
    }

    /// Creation timestamp of the underlying record.
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Movement::Entry(entry) => entry.created_at,
            Movement::Exit(exit) => exit.created_at,
        }
    }

    /// Business date: `entryDate` or `exitDate`.
    pub fn date(&self) -> DateTime<Utc> {
        match self {
            Movement::Entry(entry) => entry.entry_date,
            Movement::Exit(exit) => exit.exit_date,
        }
    }
}

// -----------------------------------------------------------------------------
// STOCK MOVEMENT (receipt for a recorded event)
// -----------------------------------------------------------------------------
/// Returned by the session after an entry or exit has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    pub toner_id: String,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub quantity: u32,
    pub previous_stock: u32,
    pub new_stock: u32,
    pub date: DateTime<Utc>,

    /// Who requested the movement
    pub user: String,

    /// Id of the entry or exit that caused it
    pub reference: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// =============================================================================
// REPORTS
// =============================================================================

/// Badge shown next to a toner in the stock table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    Low,
    Ok,
}

/// A toner at or below its threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockAlert {
    pub toner_id: String,

    /// "Brand Model" label
    pub name: String,
    pub brand: String,
    pub model: String,
    pub quantity: u32,
    pub min_stock: u32,
    pub location: String,
}

/// Total units issued for one toner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TonerUsage {
    pub toner_id: String,
    pub brand: String,
    pub model: String,
    pub usage: u64,
}

/// Cached quantity disagreeing with the quantity folded from the logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDrift {
    pub toner_id: String,
    pub cached: u32,
    pub derived: i64,
}

/// Everything the dashboard view shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary<'a> {
    pub total_toners: usize,
    pub total_units: u64,
    pub low_stock_items: usize,
    pub total_value: Decimal,
    pub movements_today: usize,
    pub recent_movements: Vec<Movement<'a>>,
    pub top_used: Vec<TonerUsage>,
}

// =============================================================================
// ERROR RESPONSES
// =============================================================================

/// User-visible error body handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Stable error code
    pub error: String,

    /// Human-readable message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }
}
