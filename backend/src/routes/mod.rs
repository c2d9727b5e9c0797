//! Route definitions for Stockbook

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Inventory management, with a public SKU lookup
        .nest("/inventory", inventory_routes(state.clone()))
        // Sales management (protected)
        .nest("/sales", sales_routes(state))
}

/// Inventory routes
fn inventory_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/create/:company_id", post(handlers::create_inventory))
        .route("/adjust/:company_id", post(handlers::adjust_inventory))
        .route("/adjustment", post(handlers::create_stock_adjustment))
        .route("/history/:inventory_id", get(handlers::get_stock_history))
        .route("/item/:inventory_id", get(handlers::get_inventory_item))
        .route("/update/:inventory_id", put(handlers::update_inventory))
        .route("/delete/:inventory_id", delete(handlers::delete_inventory))
        .route("/company-inventory", get(handlers::list_company_inventory))
        .route("/dashboard/:company_id", get(handlers::inventory_dashboard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        // Public lookup (unauthenticated)
        .route("/info", get(handlers::inventory_info))
}

/// Sales routes (protected)
fn sales_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/create/:company_id", post(handlers::create_sale))
        .route("/company-sales", get(handlers::list_company_sales))
        .route("/dashboard/:company_id", get(handlers::sales_dashboard))
        .route("/details/:sale_id", get(handlers::get_sale_details))
        .route("/update/:sale_id", put(handlers::update_sale))
        .route("/delete/:sale_id", delete(handlers::delete_sale))
        .route("/:sale_id/cancel", post(handlers::cancel_sale))
        .route("/:sale_id/refund", post(handlers::refund_sale))
        .route("/report", get(handlers::sales_report))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
