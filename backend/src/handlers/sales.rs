//! HTTP handlers for sales endpoints

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use shared::{ApiResponse, PaginatedResponse, Sale, SalesDashboard};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentCompany;
use crate::services::reporting::{DashboardQuery, ReportQuery, ReportingService, SalesReport};
use crate::services::sales::{
    RecordSaleInput, ReviseSaleInput, SaleWithProduct, SalesFilters, SalesService,
};
use crate::AppState;

fn sales_service(state: &AppState, company: &CurrentCompany) -> SalesService {
    SalesService::for_company(state.db.clone(), company.id())
}

/// Record a sale
pub async fn create_sale(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(company_id): Path<Uuid>,
    Json(input): Json<RecordSaleInput>,
) -> AppResult<Json<ApiResponse<SaleWithProduct>>> {
    company.0.ensure_company(company_id)?;
    let sale = sales_service(&state, &company).record_sale(input).await?;
    Ok(Json(ApiResponse::ok("Sale created successfully", sale)))
}

/// List the company's sales
pub async fn list_company_sales(
    State(state): State<AppState>,
    company: CurrentCompany,
    Query(filters): Query<SalesFilters>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<SaleWithProduct>>>> {
    let sales = sales_service(&state, &company)
        .list_sales(&filters, state.config.pagination.sales_limit)
        .await?;
    Ok(Json(ApiResponse::ok("Sales fetched successfully", sales)))
}

/// Sales dashboard counters
pub async fn sales_dashboard(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(company_id): Path<Uuid>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<ApiResponse<SalesDashboard>>> {
    company.0.ensure_company(company_id)?;
    let dashboard = ReportingService::for_company(state.db.clone(), company.id())
        .sales_dashboard(&query)
        .await?;
    Ok(Json(ApiResponse::ok("Sales dashboard stats fetched", dashboard)))
}

/// Get one sale
pub async fn get_sale_details(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SaleWithProduct>>> {
    let sale = sales_service(&state, &company).get_sale(sale_id).await?;
    Ok(Json(ApiResponse::ok("Sale details fetched", sale)))
}

/// Revise a sale
pub async fn update_sale(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<ReviseSaleInput>,
) -> AppResult<Json<ApiResponse<SaleWithProduct>>> {
    let sale = sales_service(&state, &company)
        .revise_sale(sale_id, input)
        .await?;
    Ok(Json(ApiResponse::ok("Sale updated successfully", sale)))
}

/// Delete a sale. Sales are never removed: this cancels it and restores stock.
pub async fn delete_sale(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Sale>>> {
    let sale = sales_service(&state, &company).cancel_sale(sale_id).await?;
    Ok(Json(ApiResponse::ok("Sale cancelled successfully", sale)))
}

/// Cancel a sale and restore stock
pub async fn cancel_sale(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Sale>>> {
    let sale = sales_service(&state, &company).cancel_sale(sale_id).await?;
    Ok(Json(ApiResponse::ok("Sale cancelled successfully", sale)))
}

/// Mark a sale refunded
pub async fn refund_sale(
    State(state): State<AppState>,
    company: CurrentCompany,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Sale>>> {
    let sale = sales_service(&state, &company).refund_sale(sale_id).await?;
    Ok(Json(ApiResponse::ok("Sale refunded successfully", sale)))
}

/// Sales report in summary, detailed or CSV form
pub async fn sales_report(
    State(state): State<AppState>,
    company: CurrentCompany,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let report = ReportingService::for_company(state.db.clone(), company.id())
        .sales_report(&query)
        .await?;

    match report {
        SalesReport::Csv(csv) => Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"sales_report.csv\"",
                ),
            ],
            csv,
        )
            .into_response()),
        report => Ok(Json(ApiResponse::ok("Sales report generated", report)).into_response()),
    }
}
