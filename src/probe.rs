use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::errors::ApiError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProbeResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Operational diagnostic: confirms the connection string and credentials
/// are valid and the database answers a trivial query.
#[utoipa::path(
    get,
    path = "/v1/test",
    tag = "diagnostics",
    responses(
        (status = 200, description = "Database reachable", body = ProbeResponse),
        (status = 500, description = "Database unreachable")
    )
)]
pub async fn probe_connection(
    State(state): State<AppState>,
) -> Result<Json<ProbeResponse>, ApiError> {
    let probe = state
        .matches
        .probe()
        .await
        .map_err(|e| state.database_error(e))?;
    info!("database probe successful");
    Ok(Json(ProbeResponse {
        success: true,
        message: "Database connection successful".to_string(),
        timestamp: probe.now,
        version: probe.version,
    }))
}
