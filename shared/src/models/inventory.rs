//! Inventory item models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bookkeeping::StockError;

/// Highest quantity still classified as [`StockStatus::LowStock`]
pub const LOW_STOCK_MAX_QUANTITY: i32 = 10;

/// The inventory dashboard counts items strictly below this quantity as low
/// stock. It is independent of [`LOW_STOCK_MAX_QUANTITY`].
pub const DASHBOARD_LOW_STOCK_BELOW: i32 = 10;

/// Stock level tier derived from the item quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "VARCHAR", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Derive the tier for a quantity. Every code path that changes a
    /// quantity goes through [`InventoryItem::set_quantity`], which calls this.
    pub fn for_quantity(quantity: i32) -> Self {
        if quantity <= 0 {
            StockStatus::OutOfStock
        } else if quantity <= LOW_STOCK_MAX_QUANTITY {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stock-keeping unit owned by one company
///
/// `quantity` and `status` are private: they can only change together through
/// [`InventoryItem::set_quantity`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryItem {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    quantity: i32,
    pub price: Decimal,
    pub category: Option<String>,
    pub supplier: Option<String>,
    /// Opaque reference (URL or path) to the item image
    pub image: Option<String>,
    status: StockStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Create a new item with a derived status
    pub fn new(
        company_id: Uuid,
        name: impl Into<String>,
        sku: impl Into<String>,
        quantity: i32,
        price: Decimal,
    ) -> Result<Self, StockError> {
        if quantity < 0 {
            return Err(StockError::NegativeQuantity(quantity));
        }
        if price < Decimal::ZERO {
            return Err(StockError::NegativePrice(price));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            company_id,
            name: name.into(),
            description: None,
            sku: sku.into(),
            quantity,
            price,
            category: None,
            supplier: None,
            image: None,
            status: StockStatus::for_quantity(quantity),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn status(&self) -> StockStatus {
        self.status
    }

    /// Set the on-hand quantity and rederive the status tier
    pub fn set_quantity(&mut self, quantity: i32) -> Result<(), StockError> {
        if quantity < 0 {
            return Err(StockError::NegativeQuantity(quantity));
        }
        self.quantity = quantity;
        self.status = StockStatus::for_quantity(quantity);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_price(&mut self, price: Decimal) -> Result<(), StockError> {
        if price < Decimal::ZERO {
            return Err(StockError::NegativePrice(price));
        }
        self.price = price;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Item details joined onto sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tiers() {
        assert_eq!(StockStatus::for_quantity(0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::for_quantity(1), StockStatus::LowStock);
        assert_eq!(StockStatus::for_quantity(10), StockStatus::LowStock);
        assert_eq!(StockStatus::for_quantity(11), StockStatus::InStock);
    }

    #[test]
    fn new_item_derives_status() {
        let item = InventoryItem::new(Uuid::new_v4(), "Widget", "WID-1", 0, Decimal::ONE).unwrap();
        assert_eq!(item.status(), StockStatus::OutOfStock);

        let item = InventoryItem::new(Uuid::new_v4(), "Widget", "WID-2", 25, Decimal::ONE).unwrap();
        assert_eq!(item.status(), StockStatus::InStock);
    }

    #[test]
    fn new_item_rejects_negative_values() {
        assert!(InventoryItem::new(Uuid::new_v4(), "W", "W-1", -1, Decimal::ONE).is_err());
        assert!(InventoryItem::new(Uuid::new_v4(), "W", "W-1", 1, Decimal::NEGATIVE_ONE).is_err());
    }

    #[test]
    fn set_quantity_keeps_status_in_sync() {
        let mut item = InventoryItem::new(Uuid::new_v4(), "W", "W-1", 50, Decimal::ONE).unwrap();
        item.set_quantity(3).unwrap();
        assert_eq!(item.status(), StockStatus::LowStock);
        assert!(item.set_quantity(-4).is_err());
        assert_eq!(item.quantity(), 3);
    }

    #[test]
    fn dashboard_and_tier_thresholds_disagree_at_ten() {
        // An item holding exactly ten units is "low_stock" by tier but not
        // counted by the dashboard's low stock counter.
        assert_eq!(StockStatus::for_quantity(10), StockStatus::LowStock);
        assert!(!(10 < DASHBOARD_LOW_STOCK_BELOW));
    }
}
