//! Sales transaction models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bookkeeping::StockError;

/// Payment channel used for a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "VARCHAR", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Online,
    Card,
    Upi,
    Cheque,
}

/// Settlement state of the payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "VARCHAR", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    #[default]
    Completed,
    Failed,
}

/// Lifecycle state of a sale
///
/// `Active` is the only state with an inventory effect. Both `Cancelled` and
/// `Refunded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "VARCHAR", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    #[default]
    Active,
    Cancelled,
    Refunded,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Active => "active",
            SaleStatus::Cancelled => "cancelled",
            SaleStatus::Refunded => "refunded",
        }
    }

    pub fn can_transition_to(&self, next: SaleStatus) -> bool {
        matches!(
            (self, next),
            (SaleStatus::Active, SaleStatus::Cancelled) | (SaleStatus::Active, SaleStatus::Refunded)
        )
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sale recorded against one inventory item
///
/// Quantity, unit price, total and status are private so the total always
/// matches the line and status changes follow [`SaleStatus::can_transition_to`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: Uuid,
    pub company_id: Uuid,
    pub inventory_id: Uuid,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    quantity_sold: i32,
    unit_price: Decimal,
    total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub sale_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub sold_by: Option<String>,
    status: SaleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Create an active sale with a computed total
    pub fn new(
        company_id: Uuid,
        inventory_id: Uuid,
        customer_name: impl Into<String>,
        payment_method: PaymentMethod,
        quantity_sold: i32,
        unit_price: Decimal,
    ) -> Result<Self, StockError> {
        let total_amount = line_total(quantity_sold, unit_price)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            company_id,
            inventory_id,
            customer_name: customer_name.into(),
            customer_email: None,
            customer_phone: None,
            quantity_sold,
            unit_price,
            total_amount,
            payment_method,
            payment_status: PaymentStatus::default(),
            transaction_id: None,
            sale_date: now,
            notes: None,
            sold_by: None,
            status: SaleStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn quantity_sold(&self) -> i32 {
        self.quantity_sold
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn status(&self) -> SaleStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SaleStatus::Active
    }

    /// Replace the line and recompute the total
    pub fn reprice(&mut self, quantity_sold: i32, unit_price: Decimal) -> Result<(), StockError> {
        self.total_amount = line_total(quantity_sold, unit_price)?;
        self.quantity_sold = quantity_sold;
        self.unit_price = unit_price;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Move to a new lifecycle state
    pub fn transition(&mut self, next: SaleStatus) -> Result<(), StockError> {
        if !self.status.can_transition_to(next) {
            return Err(StockError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// `quantity_sold * unit_price` after checking both inputs
pub fn line_total(quantity_sold: i32, unit_price: Decimal) -> Result<Decimal, StockError> {
    if quantity_sold < 1 {
        return Err(StockError::InvalidQuantity(quantity_sold));
    }
    if unit_price < Decimal::ZERO {
        return Err(StockError::NegativePrice(unit_price));
    }
    Ok(Decimal::from(quantity_sold) * unit_price)
}
