//! Order endpoint.

use axum::{extract::State, Json};
use dtomap::Record;

use crate::server::state::AppState;

/// Get the mock order, mapped into its client shape.
pub async fn get_order(State(state): State<AppState>) -> Json<Record> {
    let (record, audits) = state.order.map_with_audit(&state.raw_order);
    state.report_fallbacks("/api/order", &audits);
    Json(record)
}
