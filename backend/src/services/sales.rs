//! Sales service
//!
//! Recording, revising and cancelling a sale move stock on the linked item.
//! Both rows are locked (sale first, then item) and written in one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    bookkeeping, validate_name_field, validate_non_negative_field, validate_phone_field,
    DateRange, Pagination, PaginatedResponse, PaymentMethod, PaymentStatus, Period,
    ProductSummary, Sale, SaleStatus,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::inventory::{like_pattern, lock_item, store_quantity};

/// Sales service scoped to one company
#[derive(Clone)]
pub struct SalesService {
    db: PgPool,
    company_id: Uuid,
}

/// Input for recording a sale
#[derive(Debug, Deserialize, Validate)]
pub struct RecordSaleInput {
    pub inventory_id: Uuid,
    #[validate(custom = "validate_name_field")]
    pub customer_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub customer_email: Option<String>,
    #[validate(custom = "validate_phone_field")]
    pub customer_phone: Option<String>,
    #[validate(range(min = 1, message = "Quantity sold must be at least 1"))]
    pub quantity_sold: i32,
    #[validate(custom = "validate_non_negative_field")]
    pub unit_price: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    pub sold_by: Option<String>,
    pub sale_date: Option<DateTime<Utc>>,
}

/// Input for revising a sale. Status and total are never taken from callers.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReviseSaleInput {
    #[validate(custom = "validate_name_field")]
    pub customer_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub customer_email: Option<String>,
    #[validate(custom = "validate_phone_field")]
    pub customer_phone: Option<String>,
    #[validate(range(min = 1, message = "Quantity sold must be at least 1"))]
    pub quantity_sold: Option<i32>,
    #[validate(custom = "validate_non_negative_field")]
    pub unit_price: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    pub sold_by: Option<String>,
}

impl ReviseSaleInput {
    fn changes_line(&self, sale: &Sale) -> bool {
        self.quantity_sold.is_some_and(|q| q != sale.quantity_sold())
            || self.unit_price.is_some_and(|p| p != sale.unit_price())
    }
}

/// Sales listing filters
#[derive(Debug, Default, Deserialize)]
pub struct SalesFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub status: Option<SaleStatus>,
    pub customer_name: Option<String>,
    pub sold_by: Option<String>,
    /// Applied only together with `end_date`
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl SalesFilters {
    fn sale_period(&self) -> AppResult<Option<Period>> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => {
                let range =
                    DateRange::new(start, end).map_err(|m| AppError::validation("start_date", m))?;
                Ok(Some(Period::from_range(&range)))
            }
            _ => Ok(None),
        }
    }
}

/// A sale with the details of the item it sold
#[derive(Debug, Clone, Serialize)]
pub struct SaleWithProduct {
    #[serde(flatten)]
    pub sale: Sale,
    pub product: ProductSummary,
}

#[derive(Debug, FromRow)]
pub(crate) struct SaleProductRow {
    #[sqlx(flatten)]
    sale: Sale,
    product_name: String,
    product_sku: String,
    product_price: Decimal,
    product_image: Option<String>,
    product_description: Option<String>,
    product_category: Option<String>,
}

impl From<SaleProductRow> for SaleWithProduct {
    fn from(row: SaleProductRow) -> Self {
        let product = ProductSummary {
            id: row.sale.inventory_id,
            name: row.product_name,
            sku: row.product_sku,
            price: row.product_price,
            image: row.product_image,
            description: row.product_description,
            category: row.product_category,
        };
        Self {
            sale: row.sale,
            product,
        }
    }
}

/// Sale columns joined with item details, aliased for [`SaleProductRow`]
pub(crate) const SALE_WITH_PRODUCT: &str = r#"
    SELECT s.id, s.company_id, s.inventory_id, s.customer_name, s.customer_email,
           s.customer_phone, s.quantity_sold, s.unit_price, s.total_amount,
           s.payment_method, s.payment_status, s.transaction_id, s.sale_date,
           s.notes, s.sold_by, s.status, s.created_at, s.updated_at,
           i.name AS product_name, i.sku AS product_sku, i.price AS product_price,
           i.image AS product_image, i.description AS product_description,
           i.category AS product_category
    FROM sales s
    JOIN inventory_items i ON i.id = s.inventory_id
"#;

/// Binds: $1 company, $2 payment method, $3 payment status, $4 status,
/// $5 customer pattern, $6 sold-by pattern, $7 from, $8 before,
/// $9 min amount, $10 max amount.
const SALES_FILTER: &str = r#"
    s.company_id = $1
    AND ($2::varchar IS NULL OR s.payment_method = $2)
    AND ($3::varchar IS NULL OR s.payment_status = $3)
    AND ($4::varchar IS NULL OR s.status = $4)
    AND ($5::varchar IS NULL OR s.customer_name ILIKE $5)
    AND ($6::varchar IS NULL OR s.sold_by ILIKE $6)
    AND ($7::timestamptz IS NULL OR s.sale_date >= $7)
    AND ($8::timestamptz IS NULL OR s.sale_date < $8)
    AND ($9::numeric IS NULL OR s.total_amount >= $9)
    AND ($10::numeric IS NULL OR s.total_amount <= $10)
"#;

impl SalesService {
    /// Create a service whose every query is restricted to `company_id`
    pub fn for_company(db: PgPool, company_id: Uuid) -> Self {
        Self { db, company_id }
    }

    /// Record a sale and take its units out of stock
    pub async fn record_sale(&self, input: RecordSaleInput) -> AppResult<SaleWithProduct> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let mut item = lock_item(&mut tx, self.company_id, input.inventory_id).await?;

        let mut sale = Sale::new(
            self.company_id,
            item.id,
            input.customer_name.trim(),
            input.payment_method,
            input.quantity_sold,
            input.unit_price,
        )?;
        sale.customer_email = input.customer_email;
        sale.customer_phone = input.customer_phone;
        sale.payment_status = input.payment_status.unwrap_or_default();
        sale.transaction_id = input.transaction_id;
        sale.notes = input.notes;
        sale.sold_by = input.sold_by;
        if let Some(sale_date) = input.sale_date {
            sale.sale_date = sale_date;
        }

        let movement = bookkeeping::withdraw_for_sale(&mut item, sale.quantity_sold())?;
        store_quantity(&mut tx, &item).await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, company_id, inventory_id, customer_name, customer_email, customer_phone,
                quantity_sold, unit_price, total_amount, payment_method, payment_status,
                transaction_id, sale_date, notes, sold_by, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(sale.id)
        .bind(sale.company_id)
        .bind(sale.inventory_id)
        .bind(&sale.customer_name)
        .bind(&sale.customer_email)
        .bind(&sale.customer_phone)
        .bind(sale.quantity_sold())
        .bind(sale.unit_price())
        .bind(sale.total_amount())
        .bind(sale.payment_method)
        .bind(sale.payment_status)
        .bind(&sale.transaction_id)
        .bind(sale.sale_date)
        .bind(&sale.notes)
        .bind(&sale.sold_by)
        .bind(sale.status())
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            company_id = %self.company_id,
            sale_id = %sale.id,
            inventory_id = %item.id,
            quantity_sold = sale.quantity_sold(),
            remaining = movement.resulting_quantity,
            "Sale recorded"
        );

        Ok(SaleWithProduct {
            product: ProductSummary {
                id: item.id,
                name: item.name,
                sku: item.sku,
                price: item.price,
                image: item.image,
                description: item.description,
                category: item.category,
            },
            sale,
        })
    }

    /// Revise a sale. Changing quantity or price needs an active sale and
    /// moves the unit difference between the sale and the item.
    pub async fn revise_sale(&self, sale_id: Uuid, input: ReviseSaleInput) -> AppResult<SaleWithProduct> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let mut sale = self.lock_sale(&mut tx, sale_id).await?;

        if input.changes_line(&sale) {
            let mut item = lock_item(&mut tx, self.company_id, sale.inventory_id).await?;
            let quantity_sold = input.quantity_sold.unwrap_or(sale.quantity_sold());
            let unit_price = input.unit_price.unwrap_or(sale.unit_price());

            let movement = bookkeeping::revise_sale(&mut item, &mut sale, quantity_sold, unit_price)
                .inspect_err(|e| tracing::warn!(sale_id = %sale_id, "Sale revision rejected: {}", e))?;
            store_quantity(&mut tx, &item).await?;

            tracing::info!(
                sale_id = %sale_id,
                inventory_id = %item.id,
                stock_delta = movement.delta(),
                "Sale line revised"
            );
        }

        if let Some(customer_name) = input.customer_name {
            sale.customer_name = customer_name.trim().to_string();
        }
        if input.customer_email.is_some() {
            sale.customer_email = input.customer_email;
        }
        if input.customer_phone.is_some() {
            sale.customer_phone = input.customer_phone;
        }
        if let Some(payment_method) = input.payment_method {
            sale.payment_method = payment_method;
        }
        if let Some(payment_status) = input.payment_status {
            sale.payment_status = payment_status;
        }
        if input.transaction_id.is_some() {
            sale.transaction_id = input.transaction_id;
        }
        if input.notes.is_some() {
            sale.notes = input.notes;
        }
        if input.sold_by.is_some() {
            sale.sold_by = input.sold_by;
        }
        sale.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE sales
            SET customer_name = $1, customer_email = $2, customer_phone = $3,
                quantity_sold = $4, unit_price = $5, total_amount = $6,
                payment_method = $7, payment_status = $8, transaction_id = $9,
                notes = $10, sold_by = $11, updated_at = $12
            WHERE id = $13 AND company_id = $14
            "#,
        )
        .bind(&sale.customer_name)
        .bind(&sale.customer_email)
        .bind(&sale.customer_phone)
        .bind(sale.quantity_sold())
        .bind(sale.unit_price())
        .bind(sale.total_amount())
        .bind(sale.payment_method)
        .bind(sale.payment_status)
        .bind(&sale.transaction_id)
        .bind(&sale.notes)
        .bind(&sale.sold_by)
        .bind(sale.updated_at)
        .bind(sale.id)
        .bind(self.company_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_sale(sale_id).await
    }

    /// Cancel an active sale and return its units to stock. Serves both the
    /// delete and cancel endpoints.
    pub async fn cancel_sale(&self, sale_id: Uuid) -> AppResult<Sale> {
        let mut tx = self.db.begin().await?;
        let mut sale = self.lock_sale(&mut tx, sale_id).await?;
        let mut item = lock_item(&mut tx, self.company_id, sale.inventory_id).await?;

        let movement = bookkeeping::cancel_sale(&mut item, &mut sale)
            .inspect_err(|e| tracing::warn!(sale_id = %sale_id, "Cancellation rejected: {}", e))?;

        store_quantity(&mut tx, &item).await?;
        store_status(&mut tx, &sale).await?;
        tx.commit().await?;

        tracing::info!(
            company_id = %self.company_id,
            sale_id = %sale.id,
            inventory_id = %item.id,
            restored = movement.delta(),
            "Sale cancelled"
        );

        Ok(sale)
    }

    /// Mark an active sale refunded. Stock is not touched.
    pub async fn refund_sale(&self, sale_id: Uuid) -> AppResult<Sale> {
        let mut tx = self.db.begin().await?;
        let mut sale = self.lock_sale(&mut tx, sale_id).await?;

        bookkeeping::refund_sale(&mut sale)
            .inspect_err(|e| tracing::warn!(sale_id = %sale_id, "Refund rejected: {}", e))?;

        store_status(&mut tx, &sale).await?;
        tx.commit().await?;

        tracing::info!(company_id = %self.company_id, sale_id = %sale.id, "Sale refunded");

        Ok(sale)
    }

    /// Get one sale with full item details
    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<SaleWithProduct> {
        sqlx::query_as::<_, SaleProductRow>(&format!(
            "{} WHERE s.id = $1 AND s.company_id = $2",
            SALE_WITH_PRODUCT
        ))
        .bind(sale_id)
        .bind(self.company_id)
        .fetch_optional(&self.db)
        .await?
        .map(SaleWithProduct::from)
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))
    }

    /// List sales, most recent sale date first
    pub async fn list_sales(
        &self,
        filters: &SalesFilters,
        default_limit: u32,
    ) -> AppResult<PaginatedResponse<SaleWithProduct>> {
        let pagination = Pagination::resolve(filters.page, filters.limit, default_limit);
        let period = filters.sale_period()?;
        let customer = filters.customer_name.as_deref().map(like_pattern);
        let sold_by = filters.sold_by.as_deref().map(like_pattern);

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM sales s WHERE {}",
            SALES_FILTER
        ))
        .bind(self.company_id)
        .bind(filters.payment_method)
        .bind(filters.payment_status)
        .bind(filters.status)
        .bind(&customer)
        .bind(&sold_by)
        .bind(period.map(|p| p.start))
        .bind(period.map(|p| p.end))
        .bind(filters.min_amount)
        .bind(filters.max_amount)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, SaleProductRow>(&format!(
            "{} WHERE {} ORDER BY s.sale_date DESC, s.id LIMIT $11 OFFSET $12",
            SALE_WITH_PRODUCT, SALES_FILTER
        ))
        .bind(self.company_id)
        .bind(filters.payment_method)
        .bind(filters.payment_status)
        .bind(filters.status)
        .bind(&customer)
        .bind(&sold_by)
        .bind(period.map(|p| p.start))
        .bind(period.map(|p| p.end))
        .bind(filters.min_amount)
        .bind(filters.max_amount)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let sales = rows.into_iter().map(SaleWithProduct::from).collect();
        Ok(PaginatedResponse::new(sales, &pagination, total.max(0) as u64))
    }

    async fn lock_sale(&self, conn: &mut PgConnection, sale_id: Uuid) -> AppResult<Sale> {
        sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, company_id, inventory_id, customer_name, customer_email, customer_phone,
                   quantity_sold, unit_price, total_amount, payment_method, payment_status,
                   transaction_id, sale_date, notes, sold_by, status, created_at, updated_at
            FROM sales
            WHERE id = $1 AND company_id = $2
            FOR UPDATE
            "#,
        )
        .bind(sale_id)
        .bind(self.company_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))
    }
}

async fn store_status(conn: &mut PgConnection, sale: &Sale) -> AppResult<()> {
    sqlx::query("UPDATE sales SET status = $1, updated_at = $2 WHERE id = $3 AND company_id = $4")
        .bind(sale.status())
        .bind(sale.updated_at)
        .bind(sale.id)
        .bind(sale.company_id)
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale() -> Sale {
        Sale::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Ravi",
            PaymentMethod::Card,
            2,
            Decimal::from(15),
        )
        .unwrap()
    }

    #[test]
    fn only_real_line_changes_need_stock() {
        let s = sale();
        assert!(!ReviseSaleInput::default().changes_line(&s));

        let same = ReviseSaleInput {
            quantity_sold: Some(2),
            unit_price: Some(Decimal::from(15)),
            ..Default::default()
        };
        assert!(!same.changes_line(&s));

        let more = ReviseSaleInput {
            quantity_sold: Some(3),
            ..Default::default()
        };
        assert!(more.changes_line(&s));

        let cheaper = ReviseSaleInput {
            unit_price: Some(Decimal::from(12)),
            ..Default::default()
        };
        assert!(cheaper.changes_line(&s));
    }

    #[test]
    fn date_filter_needs_both_ends() {
        let only_start = SalesFilters {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        };
        assert_eq!(only_start.sale_period().unwrap(), None);

        let reversed = SalesFilters {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        };
        assert!(reversed.sale_period().is_err());
    }

    #[test]
    fn record_input_checks_contact_fields() {
        let input: RecordSaleInput = serde_json::from_value(serde_json::json!({
            "inventory_id": Uuid::nil(),
            "customer_name": "Meera",
            "customer_email": "not-an-email",
            "customer_phone": "12",
            "quantity_sold": 0,
            "unit_price": "9.99",
            "payment_method": "upi"
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("customer_email"));
        assert!(fields.contains_key("customer_phone"));
        assert!(fields.contains_key("quantity_sold"));
    }

    #[test]
    fn blank_customer_name_is_rejected() {
        let input: RecordSaleInput = serde_json::from_value(serde_json::json!({
            "inventory_id": Uuid::nil(),
            "customer_name": "   ",
            "quantity_sold": 1,
            "unit_price": "1",
            "payment_method": "cash"
        }))
        .unwrap();
        assert!(input.validate().unwrap_err().field_errors().contains_key("customer_name"));

        let revision = ReviseSaleInput {
            customer_name: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(revision.validate().is_err());
    }

    #[test]
    fn flattened_sale_serializes_with_product() {
        let s = sale();
        let row = SaleWithProduct {
            product: ProductSummary {
                id: s.inventory_id,
                name: "Kettle".to_string(),
                sku: "KT-1".to_string(),
                price: Decimal::from(15),
                image: None,
                description: None,
                category: None,
            },
            sale: s,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["quantity_sold"], 2);
        assert_eq!(json["product"]["sku"], "KT-1");
        assert!(json["product"].get("category").is_none());
    }
}
