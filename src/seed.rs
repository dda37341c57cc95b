// =============================================================================
// SEED MODULE
// =============================================================================
// The fixed catalog a fresh session starts from, with the purchase and
// issuance already recorded against it.
// =============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::ledger;
use crate::models::{Entry, Exit, Toner, TonerColor, User, UserRole};

fn seed_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

/// Sample toners as (id, barcode, brand, model, color, printer, quantity,
/// min, location, created, updated).
pub fn toners() -> Vec<Toner> {
    let sample_toners = [
        (
            "1",
            "7891234567890",
            "HP",
            "CF280A",
            TonerColor::Black,
            "LaserJet Pro M404",
            15,
            5,
            "Storeroom A1",
            (2024, 1, 15),
            (2024, 1, 20),
        ),
        (
            "2",
            "7891234567891",
            "Canon",
            "CRG-045C",
            TonerColor::Cyan,
            "ImageCLASS MF634",
            3,
            5,
            "Storeroom A2",
            (2024, 1, 10),
            (2024, 1, 18),
        ),
        (
            "3",
            "7891234567892",
            "Epson",
            "T664120",
            TonerColor::Black,
            "EcoTank L3150",
            8,
            3,
            "Storeroom B1",
            (2024, 1, 12),
            (2024, 1, 19),
        ),
    ];

    sample_toners
        .into_iter()
        .map(|row| {
            let (id, barcode, brand, model, color, printer_model, quantity, min_stock, ..) = row;
            let (location, created, updated) = (row.8, row.9, row.10);
            Toner {
                id: id.to_string(),
                barcode: barcode.to_string(),
                brand: brand.to_string(),
                model: model.to_string(),
                color,
                printer_model: printer_model.to_string(),
                quantity,
                min_stock,
                location: location.to_string(),
                created_at: seed_date(created.0, created.1, created.2),
                updated_at: seed_date(updated.0, updated.1, updated.2),
            }
        })
        .collect()
}

pub fn entries() -> Vec<Entry> {
    let unit_price = Decimal::new(8550, 2);
    vec![Entry {
        id: "1".to_string(),
        toner_id: "1".to_string(),
        quantity: 20,
        purchase_date: seed_date(2024, 1, 10),
        entry_date: seed_date(2024, 1, 15),
        requested_by: "Joao Silva".to_string(),
        authorized_by: "Maria Santos".to_string(),
        supplier: "Supplier ABC".to_string(),
        unit_price,
        total_price: unit_price * Decimal::from(20u32),
        invoice_number: Some("NF-001234".to_string()),
        notes: Some("Routine purchase".to_string()),
        created_at: seed_date(2024, 1, 15),
    }]
}

pub fn exits() -> Vec<Exit> {
    vec![Exit {
        id: "1".to_string(),
        toner_id: "1".to_string(),
        quantity: 5,
        exit_date: seed_date(2024, 1, 20),
        requested_by: "Pedro Costa".to_string(),
        authorized_by: "Joao Silva".to_string(),
        department: "Sales".to_string(),
        printer_location: "Room 201".to_string(),
        reason: "Replacing empty toner".to_string(),
        notes: Some("Printer showing faults".to_string()),
        created_at: seed_date(2024, 1, 20),
    }]
}

/// Staff directory. Only the first two may authorize movements.
pub fn users() -> Vec<User> {
    let sample_users = [
        ("1", "João Silva", "joao.silva@empresa.com", "TI", UserRole::Admin, true),
        (
            "2",
            "Maria Santos",
            "maria.santos@empresa.com",
            "Administrativo",
            UserRole::Manager,
            true,
        ),
        ("3", "Pedro Costa", "pedro.costa@empresa.com", "Vendas", UserRole::User, false),
    ];

    sample_users
        .into_iter()
        .map(|(id, name, email, department, role, can_authorize)| User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            department: department.to_string(),
            role,
            can_authorize,
        })
        .collect()
}

/// Quantity each catalog toner held before the seeded logs.
///
/// Seeded quantity minus seeded entries plus seeded exits, so that folding
/// the seeded logs from here reproduces the seeded quantity.
pub fn opening_stock() -> BTreeMap<String, u32> {
    let toners = toners();
    let entries = entries();
    let exits = exits();

    let zero: BTreeMap<String, u32> = toners.iter().map(|t| (t.id.clone(), 0)).collect();
    let movement = ledger::derive_quantities(&zero, &entries, &exits);

    toners
        .iter()
        .map(|toner| {
            let net = movement.get(&toner.id).copied().unwrap_or(0);
            let opening = i64::from(toner.quantity) - net;
            (toner.id.clone(), u32::try_from(opening).unwrap_or(0))
        })
        .collect()
}
