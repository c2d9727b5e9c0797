//! Inventory service: stock items and their adjustment ledger
//!
//! Every quantity change runs inside a transaction that locks the item row,
//! applies the bookkeeping rules from `shared` and appends a ledger entry.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    adjustment_for_delta, apply_adjustment, day_after, day_start, validate_image_field,
    validate_name_field, validate_non_negative_field, validate_sku_field, AdjustmentType,
    InventoryDashboard, Pagination, PaginatedResponse, Period, StockError, StockStatus,
    DASHBOARD_LOW_STOCK_BELOW,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{map_unique_violation, AppError, AppResult};
use crate::external::MediaClient;
use crate::models::{InventoryItem, StockAdjustment};

/// Ledger note for quantity changes made through an item update
pub const MANUAL_CORRECTION_NOTE: &str = "manual quantity correction";

/// Ledger note for signed adjustments addressed by SKU
pub const SKU_ADJUSTMENT_NOTE: &str = "quantity adjustment";

/// Inventory service scoped to one company
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
    company_id: Uuid,
    media: Option<MediaClient>,
}

/// Input for creating an inventory item
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInventoryInput {
    #[validate(custom = "validate_name_field")]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom = "validate_sku_field")]
    pub sku: String,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(custom = "validate_non_negative_field")]
    pub price: Decimal,
    pub category: Option<String>,
    pub supplier: Option<String>,
    #[validate(custom = "validate_image_field")]
    pub image: Option<String>,
}

/// Input for updating an inventory item; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateInventoryInput {
    #[validate(custom = "validate_name_field")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "validate_sku_field")]
    pub sku: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i32>,
    #[validate(custom = "validate_non_negative_field")]
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    #[validate(custom = "validate_image_field")]
    pub image: Option<String>,
}

/// Input for a ledger adjustment
#[derive(Debug, Deserialize, Validate)]
pub struct StockAdjustmentInput {
    pub inventory_id: Uuid,
    #[serde(rename = "type")]
    pub adjustment_type: AdjustmentType,
    #[validate(range(min = 1, message = "Quantity must be a positive whole number"))]
    pub quantity: i32,
    #[validate(custom = "validate_non_negative_field")]
    pub price: Decimal,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

/// Input for a signed adjustment addressed by SKU
#[derive(Debug, Deserialize, Validate)]
pub struct AdjustBySkuInput {
    #[validate(custom = "validate_sku_field")]
    pub sku: String,
    pub adjustment: i32,
}

/// Listing and dashboard filters
#[derive(Debug, Default, Deserialize)]
pub struct InventoryFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub status: Option<StockStatus>,
    pub search: Option<String>,
    pub min_quantity: Option<i32>,
    pub max_quantity: Option<i32>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Ledger entry together with the item it changed
#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentResult {
    pub adjustment: StockAdjustment,
    pub item: InventoryItem,
    /// A subtraction asked for more than was on hand and stopped at zero
    pub clamped: bool,
}

#[derive(Debug, FromRow)]
struct DashboardRow {
    total_items: i64,
    period_items: i64,
    total_value: Decimal,
    low_stock: i64,
}

/// Filter predicate shared by listing, counting and the dashboard.
/// Binds: $1 company, $2 category, $3 status, $4 name pattern,
/// $5 min quantity, $6 max quantity, $7 created from, $8 created before.
const INVENTORY_FILTER: &str = r#"
    company_id = $1
    AND ($2::varchar IS NULL OR category = $2)
    AND ($3::varchar IS NULL OR status = $3)
    AND ($4::varchar IS NULL OR name ILIKE $4)
    AND ($5::int IS NULL OR quantity >= $5)
    AND ($6::int IS NULL OR quantity <= $6)
    AND ($7::timestamptz IS NULL OR created_at >= $7)
    AND ($8::timestamptz IS NULL OR created_at < $8)
"#;

impl InventoryService {
    /// Create a service whose every query is restricted to `company_id`
    pub fn for_company(db: PgPool, company_id: Uuid) -> Self {
        Self {
            db,
            company_id,
            media: None,
        }
    }

    /// Release replaced or deleted images through the media service
    pub fn with_media(mut self, media: MediaClient) -> Self {
        self.media = Some(media);
        self
    }

    /// Create an inventory item
    pub async fn create_item(&self, input: CreateInventoryInput) -> AppResult<InventoryItem> {
        input.validate()?;

        let mut item = InventoryItem::new(
            self.company_id,
            input.name.trim(),
            input.sku.trim(),
            input.quantity,
            input.price,
        )?;
        item.description = input.description;
        item.category = input.category;
        item.supplier = input.supplier;
        item.image = input.image;

        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            INSERT INTO inventory_items (
                id, company_id, name, description, sku, quantity, price,
                category, supplier, image, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, company_id, name, description, sku, quantity, price,
                      category, supplier, image, status, created_at, updated_at
            "#,
        )
        .bind(item.id)
        .bind(item.company_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.sku)
        .bind(item.quantity())
        .bind(item.price)
        .bind(&item.category)
        .bind(&item.supplier)
        .bind(&item.image)
        .bind(item.status())
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "sku"))?;

        tracing::info!(
            company_id = %self.company_id,
            inventory_id = %item.id,
            sku = %item.sku,
            quantity = item.quantity(),
            "Inventory item created"
        );

        Ok(item)
    }

    /// Get one item
    pub async fn get_item(&self, inventory_id: Uuid) -> AppResult<InventoryItem> {
        sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT id, company_id, name, description, sku, quantity, price,
                   category, supplier, image, status, created_at, updated_at
            FROM inventory_items
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(inventory_id)
        .bind(self.company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }

    /// List items, newest first
    pub async fn list_items(
        &self,
        filters: &InventoryFilters,
        default_limit: u32,
    ) -> AppResult<PaginatedResponse<InventoryItem>> {
        let pagination = Pagination::resolve(filters.page, filters.limit, default_limit);
        let pattern = filters.search.as_deref().map(like_pattern);
        let created_from = filters.from_date.map(day_start);
        let created_before = filters.to_date.map(day_after);

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM inventory_items WHERE {}",
            INVENTORY_FILTER
        ))
        .bind(self.company_id)
        .bind(&filters.category)
        .bind(filters.status.map(|s| s.as_str()))
        .bind(&pattern)
        .bind(filters.min_quantity)
        .bind(filters.max_quantity)
        .bind(created_from)
        .bind(created_before)
        .fetch_one(&self.db)
        .await?;

        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            SELECT id, company_id, name, description, sku, quantity, price,
                   category, supplier, image, status, created_at, updated_at
            FROM inventory_items
            WHERE {}
            ORDER BY created_at DESC, id
            LIMIT $9 OFFSET $10
            "#,
            INVENTORY_FILTER
        ))
        .bind(self.company_id)
        .bind(&filters.category)
        .bind(filters.status.map(|s| s.as_str()))
        .bind(&pattern)
        .bind(filters.min_quantity)
        .bind(filters.max_quantity)
        .bind(created_from)
        .bind(created_before)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(items, &pagination, total.max(0) as u64))
    }

    /// Update an item. A quantity change is written to the ledger and a
    /// replaced image is released.
    ///
    /// The release runs before commit so a failed release rolls the update
    /// back and the item keeps its old image. If the commit itself fails after
    /// a successful release, the row still names an asset the media service
    /// has dropped; the error is logged with the reference.
    pub async fn update_item(
        &self,
        inventory_id: Uuid,
        input: UpdateInventoryInput,
    ) -> AppResult<InventoryItem> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let mut item = self.lock_item(&mut tx, inventory_id).await?;

        if let Some(name) = input.name {
            item.name = name.trim().to_string();
        }
        if let Some(sku) = input.sku {
            item.sku = sku.trim().to_string();
        }
        if input.description.is_some() {
            item.description = input.description;
        }
        if input.category.is_some() {
            item.category = input.category;
        }
        if input.supplier.is_some() {
            item.supplier = input.supplier;
        }
        if let Some(price) = input.price {
            item.set_price(price)?;
        }

        let replaced_image = match input.image {
            Some(image) if item.image.as_deref() != Some(image.as_str()) => {
                item.image.replace(image)
            }
            _ => None,
        };

        let correction = match input.quantity {
            Some(quantity) if quantity != item.quantity() => {
                let (adjustment_type, units) = adjustment_for_delta(quantity - item.quantity())?;
                let outcome = apply_adjustment(&mut item, adjustment_type, units)?;
                Some((adjustment_type, outcome))
            }
            _ => None,
        };

        item.updated_at = Utc::now();
        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            UPDATE inventory_items
            SET name = $1, description = $2, sku = $3, quantity = $4, price = $5,
                category = $6, supplier = $7, image = $8, status = $9, updated_at = $10
            WHERE id = $11 AND company_id = $12
            RETURNING id, company_id, name, description, sku, quantity, price,
                      category, supplier, image, status, created_at, updated_at
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.sku)
        .bind(item.quantity())
        .bind(item.price)
        .bind(&item.category)
        .bind(&item.supplier)
        .bind(&item.image)
        .bind(item.status())
        .bind(item.updated_at)
        .bind(item.id)
        .bind(self.company_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "sku"))?;

        if let Some((adjustment_type, outcome)) = correction {
            insert_adjustment(
                &mut tx,
                &item,
                NewAdjustment {
                    adjustment_type,
                    quantity: outcome.requested_quantity,
                    price: item.price,
                    supplier: None,
                    notes: Some(MANUAL_CORRECTION_NOTE.to_string()),
                    previous_quantity: outcome.movement.previous_quantity,
                    resulting_quantity: outcome.movement.resulting_quantity,
                },
            )
            .await?;
        }

        if let Some(old_image) = &replaced_image {
            self.release_image(old_image).await?;
        }

        tx.commit()
            .await
            .inspect_err(|e| log_orphaned_release(replaced_image.as_deref(), e))?;

        tracing::info!(
            company_id = %self.company_id,
            inventory_id = %item.id,
            quantity = item.quantity(),
            status = %item.status(),
            "Inventory item updated"
        );

        Ok(item)
    }

    /// Delete an item with its ledger. Items referenced by sales are kept.
    ///
    /// As with updates, the image is released before commit and a failed
    /// release keeps the item.
    pub async fn delete_item(&self, inventory_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        let item = self.lock_item(&mut tx, inventory_id).await?;

        let has_sales = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sales WHERE inventory_id = $1 AND company_id = $2)",
        )
        .bind(item.id)
        .bind(self.company_id)
        .fetch_one(&mut *tx)
        .await?;

        if has_sales {
            return Err(AppError::Conflict {
                resource: "inventory_item".to_string(),
                message: "Inventory item has recorded sales and cannot be deleted".to_string(),
            });
        }

        sqlx::query("DELETE FROM inventory_items WHERE id = $1 AND company_id = $2")
            .bind(item.id)
            .bind(self.company_id)
            .execute(&mut *tx)
            .await?;

        if let Some(image) = &item.image {
            self.release_image(image).await?;
        }

        tx.commit()
            .await
            .inspect_err(|e| log_orphaned_release(item.image.as_deref(), e))?;

        tracing::info!(
            company_id = %self.company_id,
            inventory_id = %item.id,
            sku = %item.sku,
            "Inventory item deleted"
        );

        Ok(())
    }

    /// Apply an add/subtract adjustment and append it to the ledger
    pub async fn apply_adjustment(&self, input: StockAdjustmentInput) -> AppResult<AdjustmentResult> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let mut item = self.lock_item(&mut tx, input.inventory_id).await?;

        let outcome = apply_adjustment(&mut item, input.adjustment_type, input.quantity)?;
        if outcome.clamped {
            tracing::warn!(
                inventory_id = %item.id,
                requested = outcome.requested_quantity,
                available = outcome.movement.previous_quantity,
                "Subtraction clamped at zero"
            );
        }

        store_quantity(&mut tx, &item).await?;
        let adjustment = insert_adjustment(
            &mut tx,
            &item,
            NewAdjustment {
                adjustment_type: input.adjustment_type,
                quantity: outcome.requested_quantity,
                price: input.price,
                supplier: input.supplier,
                notes: input.notes,
                previous_quantity: outcome.movement.previous_quantity,
                resulting_quantity: outcome.movement.resulting_quantity,
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            company_id = %self.company_id,
            inventory_id = %item.id,
            adjustment_type = adjustment.adjustment_type.as_str(),
            quantity = item.quantity(),
            "Stock adjusted"
        );

        Ok(AdjustmentResult {
            adjustment,
            item,
            clamped: outcome.clamped,
        })
    }

    /// Apply a signed adjustment to the item with the given SKU
    pub async fn adjust_by_sku(&self, input: AdjustBySkuInput) -> AppResult<AdjustmentResult> {
        input.validate()?;
        let (adjustment_type, quantity) = signed_adjustment(input.adjustment)?;

        let inventory_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM inventory_items WHERE sku = $1 AND company_id = $2",
        )
        .bind(input.sku.trim())
        .bind(self.company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        let price = self.get_item(inventory_id).await?.price;
        self.apply_adjustment(StockAdjustmentInput {
            inventory_id,
            adjustment_type,
            quantity,
            price,
            supplier: None,
            notes: Some(SKU_ADJUSTMENT_NOTE.to_string()),
        })
        .await
    }

    /// Ledger entries for an item, newest first
    pub async fn stock_history(&self, inventory_id: Uuid) -> AppResult<Vec<StockAdjustment>> {
        // tenant check through the owning item
        self.get_item(inventory_id).await?;

        let history = sqlx::query_as::<_, StockAdjustment>(
            r#"
            SELECT id, inventory_id, adjustment_type, quantity, price, supplier, notes,
                   previous_quantity, resulting_quantity, created_at
            FROM stock_adjustments
            WHERE inventory_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(inventory_id)
        .fetch_all(&self.db)
        .await?;

        Ok(history)
    }

    /// Dashboard counters. An explicit `from_date` sets the period and also
    /// restricts every counter to it.
    pub async fn dashboard(&self, filters: &InventoryFilters) -> AppResult<InventoryDashboard> {
        let period = Period::resolve(filters.from_date, filters.to_date, Utc::now())
            .map_err(|m| AppError::validation("from_date", m))?;
        let (created_from, created_before) = match filters.from_date {
            Some(_) => (Some(period.start), Some(period.end)),
            None => (None, None),
        };
        let pattern = filters.search.as_deref().map(like_pattern);

        let row = sqlx::query_as::<_, DashboardRow>(&format!(
            r#"
            SELECT COUNT(*) AS total_items,
                   COUNT(*) FILTER (WHERE created_at >= $9 AND created_at < $10) AS period_items,
                   COALESCE(SUM(quantity * price), 0) AS total_value,
                   COUNT(*) FILTER (WHERE quantity < $11) AS low_stock
            FROM inventory_items
            WHERE {}
            "#,
            INVENTORY_FILTER
        ))
        .bind(self.company_id)
        .bind(&filters.category)
        .bind(filters.status.map(|s| s.as_str()))
        .bind(&pattern)
        .bind(filters.min_quantity)
        .bind(filters.max_quantity)
        .bind(created_from)
        .bind(created_before)
        .bind(period.start)
        .bind(period.end)
        .bind(DASHBOARD_LOW_STOCK_BELOW)
        .fetch_one(&self.db)
        .await?;

        Ok(InventoryDashboard {
            total_items: row.total_items,
            period_items: row.period_items,
            total_value: row.total_value,
            low_stock: row.low_stock,
            period,
        })
    }

    /// Public lookup of an item by company and SKU
    pub async fn lookup_by_sku(db: &PgPool, company_id: Uuid, sku: &str) -> AppResult<InventoryItem> {
        sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT id, company_id, name, description, sku, quantity, price,
                   category, supplier, image, status, created_at, updated_at
            FROM inventory_items
            WHERE company_id = $1 AND sku = $2
            "#,
        )
        .bind(company_id)
        .bind(sku)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }

    async fn lock_item(&self, conn: &mut PgConnection, inventory_id: Uuid) -> AppResult<InventoryItem> {
        lock_item(conn, self.company_id, inventory_id).await
    }

    async fn release_image(&self, reference: &str) -> AppResult<()> {
        match &self.media {
            Some(media) => media.release(reference).await,
            None => {
                tracing::info!(reference, "Image release requested without a media client");
                Ok(())
            }
        }
    }
}

fn log_orphaned_release(reference: Option<&str>, err: &sqlx::Error) {
    if let Some(reference) = reference {
        tracing::error!(
            reference,
            error = %err,
            "Commit failed after the image was released"
        );
    }
}

/// Load an item with a row lock held until the transaction ends
pub(crate) async fn lock_item(
    conn: &mut PgConnection,
    company_id: Uuid,
    inventory_id: Uuid,
) -> AppResult<InventoryItem> {
    sqlx::query_as::<_, InventoryItem>(
        r#"
        SELECT id, company_id, name, description, sku, quantity, price,
               category, supplier, image, status, created_at, updated_at
        FROM inventory_items
        WHERE id = $1 AND company_id = $2
        FOR UPDATE
        "#,
    )
    .bind(inventory_id)
    .bind(company_id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
}

/// Persist an item's quantity and derived status
pub(crate) async fn store_quantity(conn: &mut PgConnection, item: &InventoryItem) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE inventory_items
        SET quantity = $1, status = $2, updated_at = $3
        WHERE id = $4 AND company_id = $5
        "#,
    )
    .bind(item.quantity())
    .bind(item.status())
    .bind(item.updated_at)
    .bind(item.id)
    .bind(item.company_id)
    .execute(conn)
    .await?;
    Ok(())
}

struct NewAdjustment {
    adjustment_type: AdjustmentType,
    quantity: i32,
    price: Decimal,
    supplier: Option<String>,
    notes: Option<String>,
    previous_quantity: i32,
    resulting_quantity: i32,
}

async fn insert_adjustment(
    conn: &mut PgConnection,
    item: &InventoryItem,
    entry: NewAdjustment,
) -> AppResult<StockAdjustment> {
    let adjustment = sqlx::query_as::<_, StockAdjustment>(
        r#"
        INSERT INTO stock_adjustments (
            id, inventory_id, adjustment_type, quantity, price, supplier, notes,
            previous_quantity, resulting_quantity
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, inventory_id, adjustment_type, quantity, price, supplier, notes,
                  previous_quantity, resulting_quantity, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(item.id)
    .bind(entry.adjustment_type)
    .bind(entry.quantity)
    .bind(entry.price)
    .bind(&entry.supplier)
    .bind(&entry.notes)
    .bind(entry.previous_quantity)
    .bind(entry.resulting_quantity)
    .fetch_one(conn)
    .await?;
    Ok(adjustment)
}

/// Split a signed SKU adjustment. Only a zero delta is reported against the
/// `adjustment` field; other rule violations keep their own mapping.
fn signed_adjustment(delta: i32) -> AppResult<(AdjustmentType, i32)> {
    match adjustment_for_delta(delta) {
        Ok(split) => Ok(split),
        Err(StockError::InvalidQuantity(0)) => {
            Err(AppError::validation("adjustment", "Adjustment cannot be zero"))
        }
        Err(err) => Err(err.into()),
    }
}

/// Case-insensitive substring pattern with LIKE wildcards escaped
pub(crate) fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_adjustment_errors_keep_their_cause() {
        assert_eq!(
            signed_adjustment(-7).unwrap(),
            (AdjustmentType::Subtract, 7)
        );
        assert!(matches!(
            signed_adjustment(0),
            Err(AppError::Validation { ref field, .. }) if field == "adjustment"
        ));
        match signed_adjustment(i32::MIN) {
            Err(AppError::Validation { field, message }) => {
                assert_eq!(field, "quantity");
                assert_eq!(message, StockError::QuantityOverflow.to_string());
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn blank_names_are_rejected() {
        let input = CreateInventoryInput {
            name: "   ".to_string(),
            description: None,
            sku: "LAMP-2".to_string(),
            quantity: 1,
            price: Decimal::ONE,
            category: None,
            supplier: None,
            image: None,
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let patch = UpdateInventoryInput {
            name: Some("\t ".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("mug"), "%mug%");
        assert_eq!(like_pattern(" 50%_off "), "%50\\%\\_off%");
    }

    #[test]
    fn create_input_rules() {
        let input = CreateInventoryInput {
            name: "Mug".to_string(),
            description: None,
            sku: "MUG-1".to_string(),
            quantity: 0,
            price: Decimal::ZERO,
            category: None,
            supplier: None,
            image: Some("uploads/mug.jpeg".to_string()),
        };
        assert!(input.validate().is_ok());

        let bad = CreateInventoryInput {
            quantity: -1,
            image: Some("uploads/mug.bmp".to_string()),
            ..input
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("quantity"));
        assert!(fields.contains_key("image"));
    }

    #[test]
    fn update_input_allows_empty_patch() {
        assert!(UpdateInventoryInput::default().validate().is_ok());
        let negative_price = UpdateInventoryInput {
            price: Some(Decimal::NEGATIVE_ONE),
            ..Default::default()
        };
        assert!(negative_price.validate().is_err());
    }

    #[test]
    fn adjustment_input_reads_type_field() {
        let input: StockAdjustmentInput = serde_json::from_value(serde_json::json!({
            "inventory_id": Uuid::nil(),
            "type": "subtract",
            "quantity": 3,
            "price": "2.50"
        }))
        .unwrap();
        assert_eq!(input.adjustment_type, AdjustmentType::Subtract);
        assert!(input.validate().is_ok());
    }
}
