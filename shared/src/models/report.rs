//! Dashboard and report models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PaymentMethod;
use crate::reporting::Period;

/// Inventory dashboard counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryDashboard {
    pub total_items: i64,
    /// Items created within `period`
    pub period_items: i64,
    /// Sum of `quantity * price` over matching items
    pub total_value: Decimal,
    /// Items with fewer than `DASHBOARD_LOW_STOCK_BELOW` units
    pub low_stock: i64,
    pub period: Period,
}

/// Sale count and revenue for one payment method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentBreakdown {
    pub payment_method: PaymentMethod,
    pub count: i64,
    pub total: Decimal,
}

/// Best selling product with its display details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TopProduct {
    pub inventory_id: Uuid,
    pub total_sold: i64,
    pub total_revenue: Decimal,
    pub first_sold_at: DateTime<Utc>,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub image: Option<String>,
}

/// Sales dashboard counters, restricted to active sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesDashboard {
    pub total_sales: i64,
    pub period_sales: i64,
    pub weekly_sales: i64,
    pub total_revenue: Decimal,
    pub period_revenue: Decimal,
    pub payment_breakdown: Vec<PaymentBreakdown>,
    pub top_products: Vec<TopProduct>,
    pub period: Period,
    pub week: Period,
}

/// Aggregate totals for a sales report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: i64,
    pub total_revenue: Decimal,
    pub total_quantity_sold: i64,
    pub average_sale_value: Decimal,
}

impl SalesSummary {
    /// Build a summary from raw sums; an empty set averages to zero
    pub fn from_totals(total_sales: i64, total_revenue: Decimal, total_quantity_sold: i64) -> Self {
        let average_sale_value = if total_sales > 0 {
            (total_revenue / Decimal::from(total_sales)).round_dp(2)
        } else {
            Decimal::ZERO
        };
        Self {
            total_sales,
            total_revenue,
            total_quantity_sold,
            average_sale_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn empty_summary_is_all_zero() {
        let summary = SalesSummary::from_totals(0, Decimal::ZERO, 0);
        assert_eq!(summary.total_sales, 0);
        assert_eq!(summary.total_revenue, Decimal::ZERO);
        assert_eq!(summary.average_sale_value, Decimal::ZERO);
    }

    #[test]
    fn average_rounds_to_cents() {
        let summary = SalesSummary::from_totals(3, Decimal::from(100), 7);
        assert_eq!(summary.average_sale_value, Decimal::from_str("33.33").unwrap());
        assert_eq!(summary.total_quantity_sold, 7);
    }
}
