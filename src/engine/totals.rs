//! Aggregation engine - per-filament consumption and order economics
//!
//! One loop over every part of every piece buckets grams by filament id
//! (or the "unassigned" sentinel), prices assigned filament against the
//! injected cost lookup, and accumulates revenue from priced pieces.
//! Total over all valid orders; there are no error outcomes here.

use std::collections::BTreeMap;

use crate::entities::order::{FilamentTotal, Order, Piece, UNASSIGNED_KEY};

const GRAMS_PER_KILO: f64 = 1000.0;

/// Cost-per-kilogram lookup, injected so the engine never touches storage
pub trait CostLookup {
    /// Price per kilogram for a filament id, or None when unknown
    fn cost_per_kilo(&self, filament_id: &str) -> Option<f64>;
}

impl CostLookup for BTreeMap<String, f64> {
    fn cost_per_kilo(&self, filament_id: &str) -> Option<f64> {
        self.get(filament_id).copied()
    }
}

/// The derived economic view of an order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals {
    /// Grams and cost per filament id, plus the "unassigned" bucket for
    /// parts with no selection
    pub by_filament: BTreeMap<String, FilamentTotal>,

    /// Sum of unit_price * quantity over pieces with a price
    pub revenue: f64,

    /// Total filament cost; None when no part resolves to a known cost,
    /// which means "unknown" rather than zero
    pub expenses: Option<f64>,

    /// revenue - expenses, or plain revenue while expenses are unknown
    pub profit: f64,
}

/// Derive totals from a piece tree
pub fn recompute(pieces: &[Piece], costs: &impl CostLookup) -> OrderTotals {
    let mut by_filament: BTreeMap<String, FilamentTotal> = BTreeMap::new();
    let mut revenue = 0.0;
    let mut expenses_sum = 0.0;
    let mut has_any_assigned = false;

    for piece in pieces {
        for part in &piece.parts {
            let grams = part.required_grams * piece.quantity as f64;
            let key = part.filament_id.as_deref().unwrap_or(UNASSIGNED_KEY);
            let bucket = by_filament.entry(key.to_string()).or_default();
            bucket.total_grams += grams;

            if let Some(filament_id) = part.filament_id.as_deref() {
                if let Some(per_kilo) = costs.cost_per_kilo(filament_id) {
                    let cost = grams / GRAMS_PER_KILO * per_kilo;
                    bucket.total_cost += cost;
                    expenses_sum += cost;
                    has_any_assigned = true;
                }
            }
        }

        if let Some(price) = piece.unit_price {
            revenue += price * piece.quantity as f64;
        }
    }

    let expenses = has_any_assigned.then_some(expenses_sum);
    let profit = revenue - expenses.unwrap_or(0.0);

    OrderTotals {
        by_filament,
        revenue,
        expenses,
        profit,
    }
}

/// Recompute and write the derived fields onto the record. Every composer
/// operation ends here so no stale-totals state is ever observable.
pub fn apply(order: &mut Order, costs: &impl CostLookup) {
    let totals = recompute(&order.pieces, costs);
    order.totals_by_filament = totals.by_filament;
    order.revenue = totals.revenue;
    order.expenses = totals.expenses;
    order.profit = totals.profit;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::order::PartSlot;

    fn piece(quantity: u32, unit_price: Option<f64>, parts: Vec<PartSlot>) -> Piece {
        Piece {
            product_id: "PROD-TEST".to_string(),
            product_title: "Test product".to_string(),
            quantity,
            unit_price,
            parts,
        }
    }

    fn part(grams: f64, filament_id: Option<&str>) -> PartSlot {
        PartSlot {
            label: "part".to_string(),
            required_grams: grams,
            filament_id: filament_id.map(str::to_owned),
        }
    }

    #[test]
    fn test_mass_and_cost_scale_with_quantity() {
        // One piece, quantity 2, a 10 g part on filament A at $20/kg
        let costs = BTreeMap::from([("A".to_string(), 20.0)]);
        let pieces = vec![piece(2, None, vec![part(10.0, Some("A"))])];

        let totals = recompute(&pieces, &costs);
        let a = &totals.by_filament["A"];
        assert_eq!(a.total_grams, 20.0);
        assert_eq!(a.total_cost, 0.40);
        assert_eq!(totals.expenses, Some(0.40));
    }

    #[test]
    fn test_revenue_sums_priced_pieces() {
        // Prices $5 and $10, quantities 1 and 2
        let costs = BTreeMap::new();
        let pieces = vec![
            piece(1, Some(5.0), vec![]),
            piece(2, Some(10.0), vec![]),
        ];

        let totals = recompute(&pieces, &costs);
        assert_eq!(totals.revenue, 25.0);
    }

    #[test]
    fn test_unpriced_piece_contributes_nothing() {
        let costs = BTreeMap::new();
        let pieces = vec![piece(3, None, vec![]), piece(1, Some(7.0), vec![])];

        let totals = recompute(&pieces, &costs);
        assert_eq!(totals.revenue, 7.0);
    }

    #[test]
    fn test_unassigned_parts_bucket_under_sentinel() {
        let costs = BTreeMap::new();
        let pieces = vec![piece(2, None, vec![part(15.0, None)])];

        let totals = recompute(&pieces, &costs);
        assert_eq!(totals.by_filament[UNASSIGNED_KEY].total_grams, 30.0);
        assert_eq!(totals.by_filament[UNASSIGNED_KEY].total_cost, 0.0);
    }

    #[test]
    fn test_no_assignments_means_unknown_expenses() {
        let costs = BTreeMap::new();
        let pieces = vec![piece(1, Some(12.0), vec![part(20.0, None)])];

        let totals = recompute(&pieces, &costs);
        assert_eq!(totals.expenses, None);
        // Profit falls back to revenue rather than implying zero cost
        assert_eq!(totals.profit, 12.0);
    }

    #[test]
    fn test_assigned_but_unknown_cost_keeps_expenses_unknown() {
        // A filament id with no catalog entry gets mass but no cost
        let costs = BTreeMap::new();
        let pieces = vec![piece(1, None, vec![part(10.0, Some("FIL-GONE"))])];

        let totals = recompute(&pieces, &costs);
        assert_eq!(totals.by_filament["FIL-GONE"].total_grams, 10.0);
        assert_eq!(totals.by_filament["FIL-GONE"].total_cost, 0.0);
        assert_eq!(totals.expenses, None);
    }

    #[test]
    fn test_known_cost_yields_profit() {
        let costs = BTreeMap::from([("A".to_string(), 20.0)]);
        let pieces = vec![piece(2, Some(5.0), vec![part(10.0, Some("A"))])];

        let totals = recompute(&pieces, &costs);
        assert_eq!(totals.revenue, 10.0);
        assert_eq!(totals.expenses, Some(0.40));
        assert_eq!(totals.profit, 9.60);
    }

    #[test]
    fn test_buckets_partition_referenced_filaments() {
        let costs = BTreeMap::from([("A".to_string(), 10.0), ("B".to_string(), 30.0)]);
        let pieces = vec![piece(
            1,
            None,
            vec![part(5.0, Some("A")), part(7.0, Some("B")), part(3.0, None)],
        )];

        let totals = recompute(&pieces, &costs);
        let keys: Vec<&str> = totals.by_filament.keys().map(String::as_str).collect();
        assert_eq!(keys, ["A", "B", UNASSIGNED_KEY]);
    }

    #[test]
    fn test_empty_order_is_all_zero() {
        let costs = BTreeMap::new();
        let totals = recompute(&[], &costs);

        assert!(totals.by_filament.is_empty());
        assert_eq!(totals.revenue, 0.0);
        assert_eq!(totals.expenses, None);
        assert_eq!(totals.profit, 0.0);
    }

    #[test]
    fn test_apply_writes_record_fields() {
        let costs = BTreeMap::from([("A".to_string(), 20.0)]);
        let mut order = crate::entities::order::Order::new("Test", None);
        order.pieces = vec![piece(2, Some(5.0), vec![part(10.0, Some("A"))])];

        apply(&mut order, &costs);

        assert_eq!(order.revenue, 10.0);
        assert_eq!(order.expenses, Some(0.40));
        assert_eq!(order.profit, 9.60);
        assert_eq!(order.totals_by_filament["A"].total_grams, 20.0);
    }
}
