//! Inventory bookkeeping tests
//!
//! Tests for stock levels including:
//! - Status tier always matches quantity
//! - Quantity never goes negative
//! - On-hand stock equals adjustments minus units held by live sales

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    adjustment_for_delta, apply_adjustment, bookkeeping, AdjustmentType, InventoryItem,
    PaymentMethod, Sale, SaleStatus, StockError, StockStatus, DASHBOARD_LOW_STOCK_BELOW,
    LOW_STOCK_MAX_QUANTITY,
};
use uuid::Uuid;

fn item(quantity: i32) -> InventoryItem {
    InventoryItem::new(Uuid::new_v4(), "Desk lamp", "LAMP-01", quantity, Decimal::from(12)).unwrap()
}

fn sale_for(item: &InventoryItem, quantity: i32) -> Sale {
    Sale::new(
        item.company_id,
        item.id,
        "Counter",
        PaymentMethod::Cash,
        quantity,
        Decimal::from(20),
    )
    .unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Selling 10 then 5 from 15 walks through every tier, then refuses
    #[test]
    fn test_sell_through_all_tiers() {
        let mut stock = item(15);
        assert_eq!(stock.status(), StockStatus::InStock);

        bookkeeping::withdraw_for_sale(&mut stock, 10).unwrap();
        assert_eq!((stock.quantity(), stock.status()), (5, StockStatus::LowStock));

        bookkeeping::withdraw_for_sale(&mut stock, 5).unwrap();
        assert_eq!((stock.quantity(), stock.status()), (0, StockStatus::OutOfStock));

        assert_eq!(
            bookkeeping::withdraw_for_sale(&mut stock, 1),
            Err(StockError::InsufficientStock {
                available: 0,
                requested: 1
            })
        );
    }

    /// Subtracting more than on hand clamps at zero and keeps the request
    #[test]
    fn test_subtract_clamps_at_zero() {
        let mut stock = item(5);
        let outcome = apply_adjustment(&mut stock, AdjustmentType::Subtract, 20).unwrap();

        assert_eq!(stock.quantity(), 0);
        assert_eq!(stock.status(), StockStatus::OutOfStock);
        assert_eq!(outcome.requested_quantity, 20);
        assert_eq!(outcome.movement.previous_quantity, 5);
        assert!(outcome.clamped);
    }

    /// Adding to an empty item brings it back in stock
    #[test]
    fn test_restock_from_empty() {
        let mut stock = item(0);
        apply_adjustment(&mut stock, AdjustmentType::Add, 11).unwrap();
        assert_eq!(stock.status(), StockStatus::InStock);
    }

    /// Signed deltas from the SKU endpoint
    #[test]
    fn test_signed_delta_split() {
        assert_eq!(adjustment_for_delta(4), Ok((AdjustmentType::Add, 4)));
        assert_eq!(adjustment_for_delta(-9), Ok((AdjustmentType::Subtract, 9)));
        assert_eq!(adjustment_for_delta(0), Err(StockError::InvalidQuantity(0)));
    }

    /// The two low stock thresholds stay distinct constants
    #[test]
    fn test_thresholds() {
        assert_eq!(LOW_STOCK_MAX_QUANTITY, 10);
        assert_eq!(DASHBOARD_LOW_STOCK_BELOW, 10);
        assert_eq!(StockStatus::for_quantity(LOW_STOCK_MAX_QUANTITY), StockStatus::LowStock);
        assert_eq!(
            StockStatus::for_quantity(LOW_STOCK_MAX_QUANTITY + 1),
            StockStatus::InStock
        );
    }

    /// Status strings match the stored column values
    #[test]
    fn test_status_wire_names() {
        for (status, name) in [
            (StockStatus::InStock, "\"in_stock\""),
            (StockStatus::LowStock, "\"low_stock\""),
            (StockStatus::OutOfStock, "\"out_of_stock\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), name);
        }
    }

    /// Item serialization exposes the derived status
    #[test]
    fn test_item_json_includes_status() {
        let json = serde_json::to_value(item(3)).unwrap();
        assert_eq!(json["quantity"], 3);
        assert_eq!(json["status"], "low_stock");
        assert_eq!(json["price"], "12");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Adjust(AdjustmentType, i32),
    Sell(i32),
    Revise(usize, i32),
    Cancel(usize),
    Refund(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (prop_oneof![Just(AdjustmentType::Add), Just(AdjustmentType::Subtract)], 1..40i32)
            .prop_map(|(t, q)| Op::Adjust(t, q)),
        (1..25i32).prop_map(Op::Sell),
        (0..8usize, 1..25i32).prop_map(|(i, q)| Op::Revise(i, q)),
        (0..8usize).prop_map(Op::Cancel),
        (0..8usize).prop_map(Op::Refund),
    ]
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Status tier always equals the tier derived from quantity
        #[test]
        fn prop_status_tracks_quantity(initial in 0..60i32, ops in prop::collection::vec(op_strategy(), 1..40)) {
            let mut stock = item(initial);
            let mut sales: Vec<Sale> = Vec::new();
            let mut net_adjustment = 0i64;

            for op in ops {
                let before = stock.clone();
                let result = match op {
                    Op::Adjust(t, q) => apply_adjustment(&mut stock, t, q).map(|o| {
                        net_adjustment += i64::from(o.movement.delta());
                    }),
                    Op::Sell(q) => {
                        let sale = sale_for(&stock, q);
                        bookkeeping::withdraw_for_sale(&mut stock, q).map(|_| sales.push(sale))
                    }
                    Op::Revise(i, q) => match sales.get_mut(i) {
                        Some(sale) => bookkeeping::revise_sale(&mut stock, sale, q, Decimal::from(20)).map(|_| ()),
                        None => Ok(()),
                    },
                    Op::Cancel(i) => match sales.get_mut(i) {
                        Some(sale) => bookkeeping::cancel_sale(&mut stock, sale).map(|_| ()),
                        None => Ok(()),
                    },
                    Op::Refund(i) => match sales.get_mut(i) {
                        Some(sale) => bookkeeping::refund_sale(sale),
                        None => Ok(()),
                    },
                };

                if result.is_err() {
                    prop_assert_eq!(stock.quantity(), before.quantity());
                    prop_assert_eq!(stock.status(), before.status());
                }
                prop_assert!(stock.quantity() >= 0);
                prop_assert_eq!(stock.status(), StockStatus::for_quantity(stock.quantity()));

                // units held by sales that were not cancelled
                let held: i64 = sales
                    .iter()
                    .filter(|s| s.status() != SaleStatus::Cancelled)
                    .map(|s| i64::from(s.quantity_sold()))
                    .sum();
                prop_assert_eq!(
                    i64::from(stock.quantity()),
                    i64::from(initial) + net_adjustment - held
                );
            }
        }

        /// A subtraction never leaves negative stock, and reports clamping
        /// exactly when it asked for more than was on hand
        #[test]
        fn prop_subtract_clamps(on_hand in 0..100i32, requested in 1..200i32) {
            let mut stock = item(on_hand);
            let outcome = apply_adjustment(&mut stock, AdjustmentType::Subtract, requested).unwrap();

            prop_assert_eq!(stock.quantity(), (on_hand - requested).max(0));
            prop_assert_eq!(outcome.clamped, requested > on_hand);
            prop_assert_eq!(outcome.requested_quantity, requested);
        }

        /// Selling more than on hand fails and leaves the item unchanged
        #[test]
        fn prop_oversell_is_rejected(on_hand in 0..50i32, extra in 1..50i32) {
            let mut stock = item(on_hand);
            let requested = on_hand + extra;
            let err = bookkeeping::withdraw_for_sale(&mut stock, requested).unwrap_err();

            prop_assert_eq!(err, StockError::InsufficientStock { available: on_hand, requested });
            prop_assert_eq!(stock.quantity(), on_hand);
        }
    }
}
