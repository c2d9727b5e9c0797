//! HTTP handlers for inventory endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::{ApiResponse, InventoryDashboard, PaginatedResponse};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentCompany;
use crate::models::{InventoryItem, StockAdjustment};
use crate::services::inventory::{
    AdjustBySkuInput, AdjustmentResult, CreateInventoryInput, InventoryFilters, InventoryService,
    StockAdjustmentInput, UpdateInventoryInput,
};
use crate::AppState;

/// Query for the public SKU lookup
#[derive(Debug, Deserialize)]
pub struct InventoryInfoQuery {
    pub company_id: Option<Uuid>,
    pub sku: Option<String>,
}

fn inventory_service(state: &AppState, company: &CurrentCompany) -> InventoryService {
    InventoryService::for_company(state.db.clone(), company.id()).with_media(state.media.clone())
}

/// Create an inventory item
pub async fn create_inventory(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(company_id): Path<Uuid>,
    Json(input): Json<CreateInventoryInput>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    company.0.ensure_company(company_id)?;
    let item = inventory_service(&state, &company).create_item(input).await?;
    Ok(Json(ApiResponse::ok("Inventory item created successfully", item)))
}

/// Apply a signed quantity adjustment by SKU
pub async fn adjust_inventory(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(company_id): Path<Uuid>,
    Json(input): Json<AdjustBySkuInput>,
) -> AppResult<Json<ApiResponse<AdjustmentResult>>> {
    company.0.ensure_company(company_id)?;
    let result = inventory_service(&state, &company).adjust_by_sku(input).await?;
    Ok(Json(ApiResponse::ok(
        "Inventory quantity adjusted successfully",
        result,
    )))
}

/// Record a ledger adjustment
pub async fn create_stock_adjustment(
    State(state): State<AppState>,
    company: CurrentCompany,
    Json(input): Json<StockAdjustmentInput>,
) -> AppResult<Json<ApiResponse<AdjustmentResult>>> {
    let result = inventory_service(&state, &company)
        .apply_adjustment(input)
        .await?;
    Ok(Json(ApiResponse::ok("Stock adjusted successfully", result)))
}

/// Ledger history for an item
pub async fn get_stock_history(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(inventory_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<StockAdjustment>>>> {
    let history = inventory_service(&state, &company)
        .stock_history(inventory_id)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Stock history fetched successfully",
        history,
    )))
}

/// Get one inventory item
pub async fn get_inventory_item(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(inventory_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    let item = inventory_service(&state, &company)
        .get_item(inventory_id)
        .await?;
    Ok(Json(ApiResponse::ok("Inventory item fetched", item)))
}

/// Update an inventory item
pub async fn update_inventory(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(inventory_id): Path<Uuid>,
    Json(input): Json<UpdateInventoryInput>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    let item = inventory_service(&state, &company)
        .update_item(inventory_id, input)
        .await?;
    Ok(Json(ApiResponse::ok("Inventory item updated successfully", item)))
}

/// Delete an inventory item
pub async fn delete_inventory(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(inventory_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    inventory_service(&state, &company)
        .delete_item(inventory_id)
        .await?;
    Ok(Json(ApiResponse::ok("Inventory item deleted successfully", ())))
}

/// List the company's inventory
pub async fn list_company_inventory(
    State(state): State<AppState>,
    company: CurrentCompany,
    Query(filters): Query<InventoryFilters>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<InventoryItem>>>> {
    let items = inventory_service(&state, &company)
        .list_items(&filters, state.config.pagination.inventory_limit)
        .await?;
    Ok(Json(ApiResponse::ok("Inventories fetched successfully", items)))
}

/// Inventory dashboard counters
pub async fn inventory_dashboard(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(company_id): Path<Uuid>,
    Query(filters): Query<InventoryFilters>,
) -> AppResult<Json<ApiResponse<InventoryDashboard>>> {
    company.0.ensure_company(company_id)?;
    let dashboard = inventory_service(&state, &company)
        .dashboard(&filters)
        .await?;
    Ok(Json(ApiResponse::ok("Inventory stats fetched", dashboard)))
}

/// Public lookup of an item by company and SKU
pub async fn inventory_info(
    State(state): State<AppState>,
    Query(query): Query<InventoryInfoQuery>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    let company_id = query
        .company_id
        .ok_or_else(|| AppError::validation("company_id", "Company ID is required"))?;
    let sku = query
        .sku
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("sku", "SKU is required"))?;

    let item = InventoryService::lookup_by_sku(&state.db, company_id, sku).await?;
    Ok(Json(ApiResponse::ok("Inventory data fetched", item)))
}
