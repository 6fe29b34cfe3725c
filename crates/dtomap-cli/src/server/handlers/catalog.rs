//! User, product and dashboard endpoints.

use axum::{extract::State, Json};
use dtomap::Record;
use serde::Serialize;
use serde_json::Value;

use crate::server::state::AppState;

/// Response for the dashboard endpoint.
#[derive(Serialize)]
pub struct DashboardResponse {
    /// Public projection of the current user.
    pub user: Record,
    /// Id and name of every product.
    pub products: Vec<Record>,
}

/// Get the full product list.
pub async fn get_products(State(state): State<AppState>) -> Json<Value> {
    Json(state.raw_products.as_ref().clone())
}

/// Get the user trimmed to its public fields.
pub async fn get_slim_user(State(state): State<AppState>) -> Json<Record> {
    let (record, audits) = state.slim_user.map_with_audit(&state.raw_user);
    state.report_fallbacks("/api/slim-user", &audits);
    Json(record)
}

/// Aggregate the user projection and product summaries.
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        user: state.slim_user.map(&state.raw_user),
        products: state.product_summary.map_many(&state.raw_products),
    })
}
