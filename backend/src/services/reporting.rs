//! Reporting service for sales dashboards and reports
//!
//! Read-only. Each figure comes from its own aggregate query; the queries are
//! not wrapped in a shared transaction.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    DateRange, PaymentBreakdown, PaymentMethod, PaymentStatus, Period, SaleStatus,
    SalesDashboard, SalesSummary, TopProduct,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::sales::{SaleProductRow, SaleWithProduct, SALE_WITH_PRODUCT};

/// Number of best sellers shown on the sales dashboard
pub const TOP_PRODUCTS_LIMIT: i64 = 5;

/// Reporting service scoped to one company
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
    company_id: Uuid,
}

/// Dashboard period selection
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Output shape of a sales report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Summary,
    #[default]
    Detailed,
    Csv,
}

/// Sales report request
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub format: Option<ReportFormat>,
}

impl ReportQuery {
    fn period(&self) -> AppResult<Period> {
        let start = self
            .start_date
            .ok_or_else(|| AppError::validation("start_date", "Start date is required"))?;
        let end = self
            .end_date
            .ok_or_else(|| AppError::validation("end_date", "End date is required"))?;
        let range = DateRange::new(start, end).map_err(|m| AppError::validation("start_date", m))?;
        Ok(Period::from_range(&range))
    }
}

/// Totals and payment mix for a report period
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub summary: SalesSummary,
    pub payment_breakdown: Vec<PaymentBreakdown>,
    pub period: Period,
}

/// A generated sales report
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SalesReport {
    Summary(SummaryReport),
    Detailed(Vec<SaleWithProduct>),
    Csv(String),
}

/// One CSV line of a detailed report
#[derive(Debug, Serialize)]
pub struct SalesReportRow {
    pub sale_id: Uuid,
    pub sale_date: String,
    pub customer_name: String,
    pub product_name: String,
    pub product_sku: String,
    pub quantity_sold: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: SaleStatus,
}

impl From<&SaleWithProduct> for SalesReportRow {
    fn from(row: &SaleWithProduct) -> Self {
        Self {
            sale_id: row.sale.id,
            sale_date: row.sale.sale_date.to_rfc3339(),
            customer_name: row.sale.customer_name.clone(),
            product_name: row.product.name.clone(),
            product_sku: row.product.sku.clone(),
            quantity_sold: row.sale.quantity_sold(),
            unit_price: row.sale.unit_price(),
            total_amount: row.sale.total_amount(),
            payment_method: row.sale.payment_method,
            payment_status: row.sale.payment_status,
            status: row.sale.status(),
        }
    }
}

#[derive(Debug, FromRow)]
struct SalesCountsRow {
    total_sales: i64,
    period_sales: i64,
    weekly_sales: i64,
    total_revenue: Decimal,
    period_revenue: Decimal,
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    total_sales: i64,
    total_revenue: Decimal,
    total_quantity_sold: i64,
}

impl ReportingService {
    pub fn for_company(db: PgPool, company_id: Uuid) -> Self {
        Self { db, company_id }
    }

    /// Sales dashboard over active sales
    pub async fn sales_dashboard(&self, query: &DashboardQuery) -> AppResult<SalesDashboard> {
        let now = Utc::now();
        let period = Period::resolve(query.from_date, query.to_date, now)
            .map_err(|m| AppError::validation("from_date", m))?;
        let week = Period::week_containing(now);

        let counts = sqlx::query_as::<_, SalesCountsRow>(
            r#"
            SELECT COUNT(*) AS total_sales,
                   COUNT(*) FILTER (WHERE sale_date >= $2 AND sale_date < $3) AS period_sales,
                   COUNT(*) FILTER (WHERE sale_date >= $4 AND sale_date < $5) AS weekly_sales,
                   COALESCE(SUM(total_amount), 0) AS total_revenue,
                   COALESCE(SUM(total_amount) FILTER (WHERE sale_date >= $2 AND sale_date < $3), 0)
                       AS period_revenue
            FROM sales
            WHERE company_id = $1 AND status = 'active'
            "#,
        )
        .bind(self.company_id)
        .bind(period.start)
        .bind(period.end)
        .bind(week.start)
        .bind(week.end)
        .fetch_one(&self.db)
        .await?;

        let payment_breakdown = self.payment_breakdown(None).await?;

        let top_products = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT t.inventory_id, t.total_sold, t.total_revenue, t.first_sold_at,
                   i.name, i.sku, i.price, i.image
            FROM (
                SELECT inventory_id,
                       SUM(quantity_sold)::BIGINT AS total_sold,
                       SUM(total_amount) AS total_revenue,
                       MIN(sale_date) AS first_sold_at
                FROM sales
                WHERE company_id = $1 AND status = 'active'
                GROUP BY inventory_id
            ) t
            JOIN inventory_items i ON i.id = t.inventory_id
            ORDER BY t.total_sold DESC, t.first_sold_at ASC, t.inventory_id
            LIMIT $2
            "#,
        )
        .bind(self.company_id)
        .bind(TOP_PRODUCTS_LIMIT)
        .fetch_all(&self.db)
        .await?;

        Ok(SalesDashboard {
            total_sales: counts.total_sales,
            period_sales: counts.period_sales,
            weekly_sales: counts.weekly_sales,
            total_revenue: counts.total_revenue,
            period_revenue: counts.period_revenue,
            payment_breakdown,
            top_products,
            period,
            week,
        })
    }

    /// Sales report over active sales between two calendar dates
    pub async fn sales_report(&self, query: &ReportQuery) -> AppResult<SalesReport> {
        let period = query.period()?;

        match query.format.unwrap_or_default() {
            ReportFormat::Summary => {
                let totals = sqlx::query_as::<_, SummaryRow>(
                    r#"
                    SELECT COUNT(*) AS total_sales,
                           COALESCE(SUM(total_amount), 0) AS total_revenue,
                           COALESCE(SUM(quantity_sold), 0)::BIGINT AS total_quantity_sold
                    FROM sales
                    WHERE company_id = $1 AND status = 'active'
                      AND sale_date >= $2 AND sale_date < $3
                    "#,
                )
                .bind(self.company_id)
                .bind(period.start)
                .bind(period.end)
                .fetch_one(&self.db)
                .await?;

                let payment_breakdown = self.payment_breakdown(Some(period)).await?;

                Ok(SalesReport::Summary(SummaryReport {
                    summary: SalesSummary::from_totals(
                        totals.total_sales,
                        totals.total_revenue,
                        totals.total_quantity_sold,
                    ),
                    payment_breakdown,
                    period,
                }))
            }
            ReportFormat::Detailed => Ok(SalesReport::Detailed(self.report_sales(period).await?)),
            ReportFormat::Csv => {
                let sales = self.report_sales(period).await?;
                let rows: Vec<SalesReportRow> = sales.iter().map(SalesReportRow::from).collect();
                Ok(SalesReport::Csv(Self::export_to_csv(&rows)?))
            }
        }
    }

    async fn report_sales(&self, period: Period) -> AppResult<Vec<SaleWithProduct>> {
        let rows = sqlx::query_as::<_, SaleProductRow>(&format!(
            r#"
            {}
            WHERE s.company_id = $1 AND s.status = 'active'
              AND s.sale_date >= $2 AND s.sale_date < $3
            ORDER BY s.sale_date DESC, s.id
            "#,
            SALE_WITH_PRODUCT
        ))
        .bind(self.company_id)
        .bind(period.start)
        .bind(period.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SaleWithProduct::from).collect())
    }

    async fn payment_breakdown(&self, period: Option<Period>) -> AppResult<Vec<PaymentBreakdown>> {
        let breakdown = sqlx::query_as::<_, PaymentBreakdown>(
            r#"
            SELECT payment_method, COUNT(*) AS count, COALESCE(SUM(total_amount), 0) AS total
            FROM sales
            WHERE company_id = $1 AND status = 'active'
              AND ($2::timestamptz IS NULL OR sale_date >= $2)
              AND ($3::timestamptz IS NULL OR sale_date < $3)
            GROUP BY payment_method
            ORDER BY count DESC, payment_method
            "#,
        )
        .bind(self.company_id)
        .bind(period.map(|p| p.start))
        .bind(period.map(|p| p.end))
        .fetch_all(&self.db)
        .await?;

        Ok(breakdown)
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{ProductSummary, Sale};

    #[test]
    fn report_requires_both_dates() {
        let missing_end = ReportQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert!(matches!(
            missing_end.period(),
            Err(AppError::Validation { ref field, .. }) if field == "end_date"
        ));

        let reversed = ReportQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            format: None,
        };
        assert!(reversed.period().is_err());
    }

    #[test]
    fn format_defaults_to_detailed() {
        let query: ReportQuery = serde_json::from_value(serde_json::json!({
            "start_date": "2024-01-01",
            "end_date": "2024-01-31"
        }))
        .unwrap();
        assert_eq!(query.format.unwrap_or_default(), ReportFormat::Detailed);

        let csv: ReportFormat = serde_json::from_str("\"csv\"").unwrap();
        assert_eq!(csv, ReportFormat::Csv);
    }

    #[test]
    fn csv_export_writes_header_and_rows() {
        let sale = Sale::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Lena",
            PaymentMethod::Cheque,
            4,
            Decimal::new(250, 2),
        )
        .unwrap();
        let row = SaleWithProduct {
            product: ProductSummary {
                id: sale.inventory_id,
                name: "Tea, green".to_string(),
                sku: "TEA-G".to_string(),
                price: Decimal::new(250, 2),
                image: None,
                description: None,
                category: None,
            },
            sale,
        };

        let csv = ReportingService::export_to_csv(&[SalesReportRow::from(&row)]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("sale_id,sale_date,customer_name,product_name,product_sku,quantity_sold,unit_price,total_amount,payment_method,payment_status,status")
        );
        let line = lines.next().unwrap();
        assert!(line.contains("\"Tea, green\""));
        assert!(line.ends_with(",4,2.50,10.00,cheque,completed,active"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_export_is_empty() {
        let rows: Vec<SalesReportRow> = Vec::new();
        assert_eq!(ReportingService::export_to_csv(&rows).unwrap(), "");
    }
}
