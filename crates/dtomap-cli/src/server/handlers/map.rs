//! Ad-hoc mapping endpoint.

use axum::{extract::State, Json};
use dtomap::{FieldAudit, RuleEntry, RuleSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Request body for the map endpoint.
#[derive(Deserialize)]
pub struct MapRequest {
    /// Raw JSON to map. Arrays map element-wise.
    pub raw: Value,
    /// Rules, in rule-file entry form.
    pub rules: Vec<RuleEntry>,
    /// Include the per-field audit in the response.
    #[serde(default)]
    pub audit: bool,
}

/// Response for the map endpoint.
#[derive(Serialize)]
pub struct MapResponse {
    /// Mapped object, or array of objects.
    pub result: Value,
    /// Number of fields that used their fallback.
    pub fallbacks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<Vec<FieldAudit>>,
}

/// Map a caller-supplied document through caller-supplied rules.
pub async fn map_document(
    State(state): State<AppState>,
    Json(request): Json<MapRequest>,
) -> Result<Json<MapResponse>, ApiError> {
    if request.rules.is_empty() {
        return Err(ApiError::BadRequest("At least one rule is required".to_string()));
    }

    let rules = RuleSet::from_entries(&request.rules)?;
    let (result, audits) = dtomap::map_document(&request.raw, &rules);
    state.report_fallbacks("/api/map", &audits);

    let fallbacks = audits.iter().filter(|a| a.outcome.is_fallback()).count();

    Ok(Json(MapResponse {
        result,
        fallbacks,
        audit: request.audit.then_some(audits),
    }))
}
