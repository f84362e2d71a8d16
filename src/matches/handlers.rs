use std::collections::BTreeMap;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::info;

use crate::app_state::AppState;
use crate::errors::ApiError;
use crate::matches::dtos::{
    ClearResponse, InitResponse, ListMatchesResponse, MatchData, SuccessResponse,
    UpsertMatchRequest,
};

/// All matches keyed by game key, defaults substituted for absent fields.
#[utoipa::path(
    get,
    path = "/v1/matches",
    tag = "matches",
    responses(
        (status = 200, description = "All match records", body = ListMatchesResponse),
        (status = 500, description = "Database failure")
    )
)]
pub async fn list_matches(
    State(state): State<AppState>,
) -> Result<Json<ListMatchesResponse>, ApiError> {
    let rows = state
        .matches
        .list_matches()
        .await
        .map_err(|e| state.database_error(e))?;
    info!("found {} matches in database", rows.len());

    let matches: BTreeMap<String, MatchData> = rows
        .into_iter()
        .map(|row| (row.game_key.clone(), MatchData::from(row)))
        .collect();
    Ok(Json(ListMatchesResponse { matches }))
}

/// Atomic insert-or-update of one match record.
#[utoipa::path(
    post,
    path = "/v1/matches",
    tag = "matches",
    request_body = UpsertMatchRequest,
    responses(
        (status = 200, description = "Record saved", body = SuccessResponse),
        (status = 400, description = "Missing key or matchData"),
        (status = 500, description = "Database failure")
    )
)]
pub async fn upsert_match(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::validation(format!("Invalid body: {e}")))?;
    let request: UpsertMatchRequest = serde_json::from_value(payload)
        .map_err(|e| ApiError::validation(format!("Invalid body: {e}")))?;
    request.validate().map_err(ApiError::Validation)?;
    let Some(data) = request.match_data else {
        return Err(ApiError::validation("Missing key or matchData"));
    };

    info!(
        "saving match {}: club={:?}, attendance entries={}",
        request.key,
        data.club,
        data.attendance.len()
    );
    state
        .matches
        .upsert_match(request.key, data.into_fields())
        .await
        .map_err(|e| state.database_error(e))?;
    Ok(Json(SuccessResponse {
        success: true,
        message: "Match saved successfully".to_string(),
    }))
}

/// Unconditionally delete every match record.
#[utoipa::path(
    delete,
    path = "/v1/matches",
    tag = "matches",
    responses(
        (status = 200, description = "All records removed", body = SuccessResponse),
        (status = 500, description = "Database failure")
    )
)]
pub async fn delete_matches(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let deleted = state
        .matches
        .clear_matches()
        .await
        .map_err(|e| state.database_error(e))?;
    info!("cleared {deleted} matches");
    Ok(Json(SuccessResponse {
        success: true,
        message: "All matches cleared".to_string(),
    }))
}

/// Administrative: create the matches table, or add any columns an older
/// schema revision is missing. Request handlers never do this implicitly.
#[utoipa::path(
    post,
    path = "/v1/init",
    tag = "admin",
    responses(
        (status = 200, description = "Schema creation summary", body = InitResponse),
        (status = 500, description = "Database failure")
    )
)]
pub async fn init_schema(State(state): State<AppState>) -> Result<Json<InitResponse>, ApiError> {
    let summary = state
        .matches
        .ensure_schema()
        .await
        .map_err(|e| state.database_error(e))?;
    let message = if summary.created {
        "Database table created successfully".to_string()
    } else {
        "Table already exists - preserving existing data".to_string()
    };
    info!("{message}");
    Ok(Json(InitResponse {
        success: true,
        created: summary.created,
        columns_added: summary.columns_added,
        message,
    }))
}

/// Administrative variant of clear that reports how many rows were removed.
#[utoipa::path(
    post,
    path = "/v1/clear",
    tag = "admin",
    responses(
        (status = 200, description = "Deletion summary", body = ClearResponse),
        (status = 500, description = "Database failure")
    )
)]
pub async fn clear_matches(State(state): State<AppState>) -> Result<Json<ClearResponse>, ApiError> {
    let deleted = state
        .matches
        .clear_matches()
        .await
        .map_err(|e| state.database_error(e))?;
    info!("cleared {deleted} matches");
    Ok(Json(ClearResponse {
        success: true,
        deleted,
        message: format!("Deleted {deleted} matches"),
    }))
}

/// Fallback for unsupported methods on known paths.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
