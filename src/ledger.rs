// =============================================================================
// LEDGER MODULE
// =============================================================================
// Pure functions over the toner collection and the entry/exit logs.
//
// NOTES:
// - Nothing here touches persistence; callers save the results
// - Mutators return a new collection and leave their input alone
// - A missing toner reference is a silent no-op at this level; the session
//   rejects it before calling in
// =============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::InsufficientStock;
use crate::models::{
    Entry, Exit, LowStockAlert, Movement, StockDrift, StockStatus, Toner, TonerUsage, User,
};

// =============================================================================
// MUTATORS
// =============================================================================

/// Receive stock: the referenced toner gains `entry.quantity` units.
///
/// Every other toner is returned unchanged. Unknown `toner_id` returns the
/// collection as-is. The count saturates at `u32::MAX`; the session rejects
/// entries that would reach past it before calling in.
pub fn apply_entry(toners: &[Toner], entry: &Entry) -> Vec<Toner> {
    apply_entry_at(toners, entry, Utc::now())
}

/// [`apply_entry`] with an explicit `updated_at` timestamp.
pub fn apply_entry_at(toners: &[Toner], entry: &Entry, now: DateTime<Utc>) -> Vec<Toner> {
    toners
        .iter()
        .map(|toner| {
            if toner.id == entry.toner_id {
                Toner {
                    quantity: toner.quantity.saturating_add(entry.quantity),
                    updated_at: now,
                    ..toner.clone()
                }
            } else {
                toner.clone()
            }
        })
        .collect()
}

/// Issue stock: the referenced toner loses `exit.quantity` units.
///
/// Fails with [`InsufficientStock`] when the toner holds fewer units than
/// requested; nothing is mutated in that case. Unknown `toner_id` returns the
/// collection as-is.
pub fn apply_exit(toners: &[Toner], exit: &Exit) -> Result<Vec<Toner>, InsufficientStock> {
    apply_exit_at(toners, exit, Utc::now())
}

/// [`apply_exit`] with an explicit `updated_at` timestamp.
pub fn apply_exit_at(
    toners: &[Toner],
    exit: &Exit,
    now: DateTime<Utc>,
) -> Result<Vec<Toner>, InsufficientStock> {
    // Validate first, then mutate
    if let Some(toner) = toners.iter().find(|t| t.id == exit.toner_id) {
        if toner.quantity < exit.quantity {
            return Err(InsufficientStock {
                toner_id: toner.id.clone(),
                available: toner.quantity,
                requested: exit.quantity,
            });
        }
    }

    Ok(toners
        .iter()
        .map(|toner| {
            if toner.id == exit.toner_id {
                Toner {
                    quantity: toner.quantity - exit.quantity,
                    updated_at: now,
                    ..toner.clone()
                }
            } else {
                toner.clone()
            }
        })
        .collect())
}

// =============================================================================
// QUERIES
// =============================================================================

/// Quantity at or below the threshold.
pub fn is_low_stock(toner: &Toner) -> bool {
    toner.is_low_stock()
}

pub fn stock_status(toner: &Toner) -> StockStatus {
    if toner.quantity == 0 {
        StockStatus::OutOfStock
    } else if toner.is_low_stock() {
        StockStatus::Low
    } else {
        StockStatus::Ok
    }
}

/// Value of the stock on hand at each toner's last purchase price.
///
/// For every toner the entry with the latest `entry_date` supplies the unit
/// price; on equal dates the one later in the log wins. A toner never
/// purchased is valued at zero. This is not FIFO/LIFO/average costing.
pub fn total_inventory_value(toners: &[Toner], entries: &[Entry]) -> Decimal {
    toners
        .iter()
        .map(|toner| {
            let unit_price = entries
                .iter()
                .filter(|entry| entry.toner_id == toner.id)
                .fold(None::<&Entry>, |latest, entry| match latest {
                    Some(latest) if latest.entry_date > entry.entry_date => Some(latest),
                    _ => Some(entry),
                })
                .map(|entry| entry.unit_price)
                .unwrap_or(Decimal::ZERO);
            unit_price * Decimal::from(toner.quantity)
        })
        .sum()
}

/// Both logs merged, newest `created_at` first, cut to `limit`.
///
/// Equal timestamps keep log order, entries ahead of exits.
pub fn recent_movements<'a>(
    entries: &'a [Entry],
    exits: &'a [Exit],
    limit: usize,
) -> Vec<Movement<'a>> {
    let mut movements: Vec<Movement<'a>> = entries
        .iter()
        .map(Movement::Entry)
        .chain(exits.iter().map(Movement::Exit))
        .collect();

    // sort_by is stable
    movements.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    movements.truncate(limit);
    movements
}

/// Every low toner, fewest units first.
pub fn low_stock_alerts(toners: &[Toner]) -> Vec<LowStockAlert> {
    let mut alerts: Vec<LowStockAlert> = toners
        .iter()
        .filter(|toner| toner.is_low_stock())
        .map(|toner| LowStockAlert {
            toner_id: toner.id.clone(),
            name: toner.display_name(),
            brand: toner.brand.clone(),
            model: toner.model.clone(),
            quantity: toner.quantity,
            min_stock: toner.min_stock,
            location: toner.location.clone(),
        })
        .collect();
    alerts.sort_by_key(|alert| alert.quantity);
    alerts
}

pub fn total_units(toners: &[Toner]) -> u64 {
    toners.iter().map(|toner| u64::from(toner.quantity)).sum()
}

/// Entries and exits whose business date falls on `day` (UTC).
pub fn movements_on(entries: &[Entry], exits: &[Exit], day: NaiveDate) -> usize {
    let entered = entries
        .iter()
        .filter(|entry| entry.entry_date.date_naive() == day)
        .count();
    let issued = exits
        .iter()
        .filter(|exit| exit.exit_date.date_naive() == day)
        .count();
    entered + issued
}

/// Toners ranked by units issued, most used first.
///
/// Toners that were never issued are left out. Ties keep catalog order.
pub fn top_used_toners(toners: &[Toner], exits: &[Exit], limit: usize) -> Vec<TonerUsage> {
    let mut usage: Vec<TonerUsage> = toners
        .iter()
        .filter_map(|toner| {
            let issued: u64 = exits
                .iter()
                .filter(|exit| exit.toner_id == toner.id)
                .map(|exit| u64::from(exit.quantity))
                .sum();
            (issued > 0).then(|| TonerUsage {
                toner_id: toner.id.clone(),
                brand: toner.brand.clone(),
                model: toner.model.clone(),
                usage: issued,
            })
        })
        .collect();
    usage.sort_by(|a, b| b.usage.cmp(&a.usage));
    usage.truncate(limit);
    usage
}

/// Staff who may sign off on a movement, in directory order.
pub fn authorizers(users: &[User]) -> Vec<&User> {
    users.iter().filter(|user| user.can_authorize).collect()
}

// =============================================================================
// RECONCILIATION
// =============================================================================
// `Toner::quantity` is maintained incrementally. Folding the logs from the
// opening stock gives the quantity it should hold; any difference is drift.

/// Opening stock plus entries minus exits, per toner id.
///
/// Ids that only appear in the logs start from zero.
pub fn derive_quantities(
    openings: &BTreeMap<String, u32>,
    entries: &[Entry],
    exits: &[Exit],
) -> BTreeMap<String, i64> {
    let mut derived: BTreeMap<String, i64> = openings
        .iter()
        .map(|(id, quantity)| (id.clone(), i64::from(*quantity)))
        .collect();

    for entry in entries {
        *derived.entry(entry.toner_id.clone()).or_insert(0) += i64::from(entry.quantity);
    }
    for exit in exits {
        *derived.entry(exit.toner_id.clone()).or_insert(0) -= i64::from(exit.quantity);
    }
    derived
}

/// Toners whose cached quantity disagrees with the logs.
pub fn reconcile(
    toners: &[Toner],
    openings: &BTreeMap<String, u32>,
    entries: &[Entry],
    exits: &[Exit],
) -> Vec<StockDrift> {
    let derived = derive_quantities(openings, entries, exits);
    toners
        .iter()
        .filter_map(|toner| {
            let expected = derived.get(&toner.id).copied().unwrap_or(0);
            (expected != i64::from(toner.quantity)).then(|| StockDrift {
                toner_id: toner.id.clone(),
                cached: toner.quantity,
                derived: expected,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MovementKind, TonerColor, UserRole};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn toner(id: &str, quantity: u32, min_stock: u32) -> Toner {
        Toner {
            id: id.to_string(),
            barcode: format!("789000000000{id}"),
            brand: "HP".to_string(),
            model: format!("CF28{id}A"),
            color: TonerColor::Black,
            printer_model: "LaserJet Pro M404".to_string(),
            quantity,
            min_stock,
            location: "Storeroom A1".to_string(),
            created_at: day(1),
            updated_at: day(1),
        }
    }

    fn entry(
        id: &str,
        toner_id: &str,
        quantity: u32,
        unit_price: Decimal,
        entry_date: DateTime<Utc>,
    ) -> Entry {
        Entry {
            id: id.to_string(),
            toner_id: toner_id.to_string(),
            quantity,
            purchase_date: entry_date,
            entry_date,
            requested_by: "Joao Silva".to_string(),
            authorized_by: "Maria Santos".to_string(),
            supplier: "Supplier ABC".to_string(),
            unit_price,
            total_price: unit_price * Decimal::from(quantity),
            invoice_number: None,
            notes: None,
            created_at: entry_date,
        }
    }

    fn exit(id: &str, toner_id: &str, quantity: u32, exit_date: DateTime<Utc>) -> Exit {
        Exit {
            id: id.to_string(),
            toner_id: toner_id.to_string(),
            quantity,
            exit_date,
            requested_by: "Pedro Costa".to_string(),
            authorized_by: "Joao Silva".to_string(),
            department: "Sales".to_string(),
            printer_location: "Room 201".to_string(),
            reason: "Empty cartridge".to_string(),
            notes: None,
            created_at: exit_date,
        }
    }

    #[test]
    fn test_apply_entry_only_touches_referenced_toner() {
        let toners = vec![toner("1", 15, 5), toner("2", 3, 5)];
        let now = day(20);

        let updated = apply_entry_at(&toners, &entry("e1", "1", 20, dec!(85.50), day(15)), now);

        assert_eq!(updated[0].quantity, 35);
        assert_eq!(updated[0].updated_at, now);
        assert_eq!(updated[1], toners[1]);
        // input untouched
        assert_eq!(toners[0].quantity, 15);
    }

    #[test]
    fn test_apply_entry_unknown_toner_is_noop() {
        let toners = vec![toner("1", 15, 5)];
        let updated = apply_entry(&toners, &entry("e1", "99", 20, dec!(1), day(15)));
        assert_eq!(updated, toners);
    }

    #[test]
    fn test_apply_entry_saturates_at_max() {
        let toners = vec![toner("1", u32::MAX - 1, 5)];
        let updated = apply_entry(&toners, &entry("e1", "1", 5, dec!(1), day(15)));
        assert_eq!(updated[0].quantity, u32::MAX);
    }

    #[test]
    fn test_apply_exit_decrements() {
        let toners = vec![toner("1", 35, 5), toner("2", 3, 5)];
        let updated = apply_exit_at(&toners, &exit("x1", "1", 5, day(20)), day(20)).unwrap();

        assert_eq!(updated[0].quantity, 30);
        assert_eq!(updated[0].updated_at, day(20));
        assert_eq!(updated[1], toners[1]);
        assert_eq!(updated[1].updated_at, day(1));
    }

    #[test]
    fn test_apply_exit_can_empty_stock() {
        let toners = vec![toner("1", 5, 2)];
        let updated = apply_exit(&toners, &exit("x1", "1", 5, day(20))).unwrap();
        assert_eq!(updated[0].quantity, 0);
        assert_eq!(stock_status(&updated[0]), StockStatus::OutOfStock);
    }

    #[test]
    fn test_apply_exit_insufficient_stock() {
        let toners = vec![toner("2", 3, 5)];
        let err = apply_exit(&toners, &exit("x1", "2", 5, day(20))).unwrap_err();

        assert_eq!(
            err,
            InsufficientStock {
                toner_id: "2".to_string(),
                available: 3,
                requested: 5,
            }
        );
        assert_eq!(toners[0].quantity, 3);
    }

    #[test]
    fn test_apply_exit_unknown_toner_is_noop() {
        let toners = vec![toner("1", 15, 5)];
        let updated = apply_exit(&toners, &exit("x1", "99", 500, day(20))).unwrap();
        assert_eq!(updated, toners);
    }

    #[test]
    fn test_entry_then_exit_scenario() {
        let toners = vec![toner("1", 15, 5)];
        assert!(!is_low_stock(&toners[0]));

        let toners = apply_entry(&toners, &entry("e1", "1", 20, dec!(85.50), day(15)));
        assert_eq!(toners[0].quantity, 35);
        assert!(!is_low_stock(&toners[0]));

        let toners = apply_exit(&toners, &exit("x1", "1", 5, day(20))).unwrap();
        assert_eq!(toners[0].quantity, 30);
        assert!(!is_low_stock(&toners[0]));
    }

    #[test]
    fn test_is_low_stock_boundary() {
        assert!(is_low_stock(&toner("1", 5, 5)));
        assert!(is_low_stock(&toner("1", 3, 5)));
        assert!(!is_low_stock(&toner("1", 6, 5)));
        assert_eq!(stock_status(&toner("1", 5, 5)), StockStatus::Low);
        assert_eq!(stock_status(&toner("1", 6, 5)), StockStatus::Ok);
    }

    #[test]
    fn test_total_value_single_entry() {
        let toners = vec![toner("1", 15, 5)];
        let entries = vec![entry("e1", "1", 20, dec!(85.50), day(1))];
        assert_eq!(total_inventory_value(&toners, &entries), dec!(1282.50));
    }

    #[test]
    fn test_total_value_uses_latest_entry_date() {
        let toners = vec![toner("1", 10, 5), toner("2", 4, 5)];
        let entries = vec![
            entry("e1", "1", 5, dec!(100.00), day(10)),
            entry("e2", "1", 5, dec!(90.00), day(3)),
            entry("e3", "1", 5, dec!(80.00), day(10)),
        ];

        // day 10 twice: the later log record (80.00) wins; toner 2 has no entry
        assert_eq!(total_inventory_value(&toners, &entries), dec!(800.00));
    }

    #[test]
    fn test_recent_movements_newest_first() {
        let entries = vec![
            entry("e1", "1", 20, dec!(1), day(15)),
            entry("e2", "1", 5, dec!(1), day(22)),
        ];
        let exits = vec![exit("x1", "1", 5, day(20)), exit("x2", "1", 1, day(15))];

        let recent = recent_movements(&entries, &exits, 3);
        let ids: Vec<&str> = recent.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["e2", "x1", "e1"]);

        let all = recent_movements(&entries, &exits, 10);
        assert_eq!(all.len(), 4);
        // equal timestamps keep entries ahead of exits
        assert_eq!(all[2].id(), "e1");
        assert_eq!(all[3].id(), "x2");
    }

    #[test]
    fn test_movement_reports_underlying_record() {
        let entries = vec![entry("e1", "2", 20, dec!(85.50), day(10))];
        let mut exits = vec![exit("x1", "1", 5, day(12))];
        exits[0].created_at = day(12) + Duration::hours(9);

        let recent = recent_movements(&entries, &exits, 10);

        assert_eq!(recent[0].kind(), MovementKind::Exit);
        assert_eq!(recent[0].toner_id(), "1");
        assert_eq!(recent[0].quantity(), 5);
        assert_eq!(recent[0].date(), day(12));
        assert_eq!(recent[1].kind(), MovementKind::Entry);
        assert_eq!(recent[1].toner_id(), "2");
        assert_eq!(recent[1].quantity(), 20);
        assert_eq!(recent[1].date(), day(10));
    }

    #[test]
    fn test_low_stock_alerts_sorted_by_quantity() {
        let toners = vec![toner("1", 5, 5), toner("2", 15, 5), toner("3", 1, 3)];
        let alerts = low_stock_alerts(&toners);
        let ids: Vec<&str> = alerts.iter().map(|a| a.toner_id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
        assert_eq!(alerts[0].name, "HP CF283A");
    }

    #[test]
    fn test_movements_on_day() {
        let entries = vec![entry("e1", "1", 20, dec!(1), day(15) + Duration::hours(13))];
        let exits = vec![exit("x1", "1", 5, day(15)), exit("x2", "1", 5, day(16))];
        assert_eq!(movements_on(&entries, &exits, day(15).date_naive()), 2);
        assert_eq!(movements_on(&entries, &exits, day(17).date_naive()), 0);
    }

    #[test]
    fn test_top_used_toners() {
        let toners = vec![toner("1", 10, 5), toner("2", 10, 5), toner("3", 10, 5)];
        let exits = vec![
            exit("x1", "2", 2, day(10)),
            exit("x2", "1", 4, day(11)),
            exit("x3", "2", 2, day(12)),
        ];

        let top = top_used_toners(&toners, &exits, 5);
        let ranked: Vec<(&str, u64)> = top.iter().map(|u| (u.toner_id.as_str(), u.usage)).collect();
        // 1 and 2 tie on 4 units; catalog order wins
        assert_eq!(ranked, vec![("1", 4), ("2", 4)]);
        assert_eq!(top_used_toners(&toners, &exits, 1).len(), 1);
    }

    #[test]
    fn test_reconcile_detects_drift() {
        let openings = BTreeMap::from([("1".to_string(), 0), ("2".to_string(), 3)]);
        let entries = vec![entry("e1", "1", 20, dec!(85.50), day(15))];
        let exits = vec![exit("x1", "1", 5, day(20))];

        let consistent = vec![toner("1", 15, 5), toner("2", 3, 5)];
        assert!(reconcile(&consistent, &openings, &entries, &exits).is_empty());

        let drifted = vec![toner("1", 12, 5), toner("2", 3, 5)];
        assert_eq!(
            reconcile(&drifted, &openings, &entries, &exits),
            vec![StockDrift {
                toner_id: "1".to_string(),
                cached: 12,
                derived: 15,
            }]
        );
    }

    #[test]
    fn test_authorizers_keep_directory_order() {
        let user = |id: &str, role: UserRole, can_authorize: bool| User {
            id: id.to_string(),
            name: format!("User {id}"),
            email: format!("user{id}@empresa.com"),
            department: "TI".to_string(),
            role,
            can_authorize,
        };
        let users = vec![
            user("1", UserRole::User, false),
            user("2", UserRole::Manager, true),
            user("3", UserRole::Admin, true),
        ];

        let ids: Vec<&str> = authorizers(&users).iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert!(authorizers(&[]).is_empty());
    }

    #[test]
    fn test_total_units() {
        let toners = vec![toner("1", 15, 5), toner("2", 3, 5)];
        assert_eq!(total_units(&toners), 18);
    }
}
