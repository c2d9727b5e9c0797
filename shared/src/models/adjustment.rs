//! Stock adjustment ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a stock adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "VARCHAR", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    Add,
    Subtract,
}

impl AdjustmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Add => "add",
            AdjustmentType::Subtract => "subtract",
        }
    }
}

/// Immutable ledger entry for one quantity change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockAdjustment {
    pub id: Uuid,
    pub inventory_id: Uuid,
    #[serde(rename = "type")]
    pub adjustment_type: AdjustmentType,
    /// Requested quantity, recorded even when a subtraction was clamped
    pub quantity: i32,
    /// Unit price at the time of the adjustment
    pub price: Decimal,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub previous_quantity: i32,
    pub resulting_quantity: i32,
    pub created_at: DateTime<Utc>,
}
