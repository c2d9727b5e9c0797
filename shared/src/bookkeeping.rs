//! Stock bookkeeping rules
//!
//! Every change to an item's on-hand quantity is expressed here, so the status
//! tier is rederived the same way whether stock moves through an adjustment, a
//! sale, a sale revision or a cancellation. The functions validate first and
//! mutate last: on error neither the item nor the sale is modified.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::{AdjustmentType, InventoryItem, Sale, SaleStatus, StockStatus};

/// Violations of the stock bookkeeping rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("Quantity must be a positive whole number, got {0}")]
    InvalidQuantity(i32),

    #[error("Quantity cannot be negative, got {0}")]
    NegativeQuantity(i32),

    #[error("Price cannot be negative, got {0}")]
    NegativePrice(Decimal),

    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Quantity overflow")]
    QuantityOverflow,

    #[error("Cannot move sale from {from} to {to}")]
    InvalidTransition { from: SaleStatus, to: SaleStatus },

    #[error("Sale is {0}; only active sales can be revised")]
    SaleNotActive(SaleStatus),
}

/// Before and after levels of one quantity change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockMovement {
    pub previous_quantity: i32,
    pub resulting_quantity: i32,
    pub status: StockStatus,
}

impl StockMovement {
    fn between(previous_quantity: i32, item: &InventoryItem) -> Self {
        Self {
            previous_quantity,
            resulting_quantity: item.quantity(),
            status: item.status(),
        }
    }

    /// Signed change actually applied to the item
    pub fn delta(&self) -> i32 {
        self.resulting_quantity - self.previous_quantity
    }
}

/// Outcome of a ledger adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdjustmentOutcome {
    pub movement: StockMovement,
    /// Quantity as requested by the caller, before any clamping
    pub requested_quantity: i32,
    /// A subtraction asked for more than was on hand and stopped at zero
    pub clamped: bool,
}

/// Apply an add/subtract adjustment. Subtractions below zero are clamped to
/// zero rather than rejected.
pub fn apply_adjustment(
    item: &mut InventoryItem,
    adjustment_type: AdjustmentType,
    quantity: i32,
) -> Result<AdjustmentOutcome, StockError> {
    if quantity <= 0 {
        return Err(StockError::InvalidQuantity(quantity));
    }

    let previous = item.quantity();
    let (next, clamped) = match adjustment_type {
        AdjustmentType::Add => (
            previous
                .checked_add(quantity)
                .ok_or(StockError::QuantityOverflow)?,
            false,
        ),
        AdjustmentType::Subtract => {
            let raw = previous - quantity;
            (raw.max(0), raw < 0)
        }
    };

    item.set_quantity(next)?;
    Ok(AdjustmentOutcome {
        movement: StockMovement::between(previous, item),
        requested_quantity: quantity,
        clamped,
    })
}

/// Split a signed delta into an adjustment type and a positive quantity
pub fn adjustment_for_delta(delta: i32) -> Result<(AdjustmentType, i32), StockError> {
    match delta {
        0 => Err(StockError::InvalidQuantity(0)),
        d if d > 0 => Ok((AdjustmentType::Add, d)),
        d => Ok((
            AdjustmentType::Subtract,
            d.checked_neg().ok_or(StockError::QuantityOverflow)?,
        )),
    }
}

/// Take stock out for a new sale
pub fn withdraw_for_sale(
    item: &mut InventoryItem,
    quantity_sold: i32,
) -> Result<StockMovement, StockError> {
    if quantity_sold < 1 {
        return Err(StockError::InvalidQuantity(quantity_sold));
    }

    let previous = item.quantity();
    if previous < quantity_sold {
        return Err(StockError::InsufficientStock {
            available: previous,
            requested: quantity_sold,
        });
    }

    item.set_quantity(previous - quantity_sold)?;
    Ok(StockMovement::between(previous, item))
}

/// Change the quantity and price of an active sale, moving the difference in
/// units between the sale and the item.
pub fn revise_sale(
    item: &mut InventoryItem,
    sale: &mut Sale,
    quantity_sold: i32,
    unit_price: Decimal,
) -> Result<StockMovement, StockError> {
    if !sale.is_active() {
        return Err(StockError::SaleNotActive(sale.status()));
    }
    // validates the new line before touching stock
    crate::models::line_total(quantity_sold, unit_price)?;

    let previous = item.quantity();
    let extra_units = quantity_sold - sale.quantity_sold();
    let next = previous
        .checked_sub(extra_units)
        .ok_or(StockError::QuantityOverflow)?;
    if next < 0 {
        return Err(StockError::InsufficientStock {
            available: previous,
            requested: extra_units,
        });
    }

    item.set_quantity(next)?;
    sale.reprice(quantity_sold, unit_price)?;
    Ok(StockMovement::between(previous, item))
}

/// Cancel an active sale and put its units back on the shelf
pub fn cancel_sale(item: &mut InventoryItem, sale: &mut Sale) -> Result<StockMovement, StockError> {
    if !sale.status().can_transition_to(SaleStatus::Cancelled) {
        return Err(StockError::InvalidTransition {
            from: sale.status(),
            to: SaleStatus::Cancelled,
        });
    }

    let previous = item.quantity();
    let restored = previous
        .checked_add(sale.quantity_sold())
        .ok_or(StockError::QuantityOverflow)?;

    item.set_quantity(restored)?;
    sale.transition(SaleStatus::Cancelled)?;
    Ok(StockMovement::between(previous, item))
}

/// Mark an active sale refunded. Stock is left as is.
pub fn refund_sale(sale: &mut Sale) -> Result<(), StockError> {
    sale.transition(SaleStatus::Refunded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;
    use uuid::Uuid;

    fn item(quantity: i32) -> InventoryItem {
        InventoryItem::new(Uuid::new_v4(), "Notebook", "NB-A5", quantity, Decimal::from(4)).unwrap()
    }

    fn sale_for(item: &InventoryItem, quantity: i32) -> Sale {
        Sale::new(
            item.company_id,
            item.id,
            "Walk-in",
            PaymentMethod::Cash,
            quantity,
            Decimal::from(6),
        )
        .unwrap()
    }

    #[test]
    fn sell_down_to_zero_then_refuse() {
        let mut stock = item(15);
        assert_eq!(stock.status(), StockStatus::InStock);

        withdraw_for_sale(&mut stock, 10).unwrap();
        assert_eq!(stock.quantity(), 5);
        assert_eq!(stock.status(), StockStatus::LowStock);

        withdraw_for_sale(&mut stock, 5).unwrap();
        assert_eq!(stock.quantity(), 0);
        assert_eq!(stock.status(), StockStatus::OutOfStock);

        let err = withdraw_for_sale(&mut stock, 1).unwrap_err();
        assert_eq!(err, StockError::InsufficientStock { available: 0, requested: 1 });
        assert_eq!(stock.quantity(), 0);
    }

    #[test]
    fn subtract_clamps_and_reports_request() {
        let mut stock = item(5);
        let outcome = apply_adjustment(&mut stock, AdjustmentType::Subtract, 20).unwrap();
        assert!(outcome.clamped);
        assert_eq!(outcome.requested_quantity, 20);
        assert_eq!(outcome.movement.previous_quantity, 5);
        assert_eq!(outcome.movement.resulting_quantity, 0);
        assert_eq!(stock.status(), StockStatus::OutOfStock);
    }

    #[test]
    fn adjustment_rejects_non_positive_quantity() {
        let mut stock = item(5);
        assert_eq!(
            apply_adjustment(&mut stock, AdjustmentType::Add, 0),
            Err(StockError::InvalidQuantity(0))
        );
        assert!(apply_adjustment(&mut stock, AdjustmentType::Subtract, -3).is_err());
        assert_eq!(stock.quantity(), 5);
    }

    #[test]
    fn add_overflow_is_an_error() {
        let mut stock = item(i32::MAX - 1);
        assert_eq!(
            apply_adjustment(&mut stock, AdjustmentType::Add, 5),
            Err(StockError::QuantityOverflow)
        );
        assert_eq!(stock.quantity(), i32::MAX - 1);
    }

    #[test]
    fn signed_delta_maps_to_adjustment() {
        assert_eq!(adjustment_for_delta(7), Ok((AdjustmentType::Add, 7)));
        assert_eq!(adjustment_for_delta(-3), Ok((AdjustmentType::Subtract, 3)));
        assert!(adjustment_for_delta(0).is_err());
        assert!(adjustment_for_delta(i32::MIN).is_err());
    }

    #[test]
    fn revise_moves_difference() {
        let mut stock = item(20);
        let mut sale = sale_for(&stock, 4);
        withdraw_for_sale(&mut stock, 4).unwrap();

        // sell three more
        let movement = revise_sale(&mut stock, &mut sale, 7, Decimal::from(6)).unwrap();
        assert_eq!(movement.delta(), -3);
        assert_eq!(stock.quantity(), 13);
        assert_eq!(sale.total_amount(), Decimal::from(42));

        // hand back five
        revise_sale(&mut stock, &mut sale, 2, Decimal::from(5)).unwrap();
        assert_eq!(stock.quantity(), 18);
        assert_eq!(sale.total_amount(), Decimal::from(10));
    }

    #[test]
    fn revise_beyond_stock_changes_nothing() {
        let mut stock = item(3);
        let mut sale = sale_for(&stock, 2);
        withdraw_for_sale(&mut stock, 2).unwrap();

        let err = revise_sale(&mut stock, &mut sale, 5, Decimal::from(6)).unwrap_err();
        assert_eq!(err, StockError::InsufficientStock { available: 1, requested: 3 });
        assert_eq!(stock.quantity(), 1);
        assert_eq!(sale.quantity_sold(), 2);
    }

    #[test]
    fn cancel_restores_once() {
        let mut stock = item(12);
        let mut sale = sale_for(&stock, 12);
        withdraw_for_sale(&mut stock, 12).unwrap();
        assert_eq!(stock.status(), StockStatus::OutOfStock);

        cancel_sale(&mut stock, &mut sale).unwrap();
        assert_eq!(stock.quantity(), 12);
        assert_eq!(stock.status(), StockStatus::InStock);
        assert_eq!(sale.status(), SaleStatus::Cancelled);

        let err = cancel_sale(&mut stock, &mut sale).unwrap_err();
        assert!(matches!(err, StockError::InvalidTransition { .. }));
        assert_eq!(stock.quantity(), 12);
    }

    #[test]
    fn refunded_sale_keeps_stock_and_cannot_be_cancelled() {
        let mut stock = item(8);
        let mut sale = sale_for(&stock, 3);
        withdraw_for_sale(&mut stock, 3).unwrap();

        refund_sale(&mut sale).unwrap();
        assert_eq!(stock.quantity(), 5);
        assert!(cancel_sale(&mut stock, &mut sale).is_err());
        assert_eq!(
            revise_sale(&mut stock, &mut sale, 1, Decimal::ONE),
            Err(StockError::SaleNotActive(SaleStatus::Refunded))
        );
        assert_eq!(stock.quantity(), 5);
    }
}
