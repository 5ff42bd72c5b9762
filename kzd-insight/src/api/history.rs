//! Check-in history endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::scans;
use crate::models::HistoryEntry;
use crate::services::{summarize, HistorySummary};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

#[derive(Debug, Serialize)]
pub struct ImportedResponse {
    pub imported: u64,
}

/// GET /api/history
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
    Ok(Json(scans::list_entries(&state.db, query.limit).await?))
}

/// GET /api/history/summary
pub async fn history_summary(State(state): State<AppState>) -> ApiResult<Json<HistorySummary>> {
    let entries = scans::list_entries(&state.db, None).await?;
    Ok(Json(summarize(&entries)))
}

/// GET /api/history/:id
pub async fn get_history_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<HistoryEntry>> {
    scans::get_entry(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Check-in {}", id)))
}

/// DELETE /api/history/:id
pub async fn delete_history_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if scans::delete_entry(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Check-in {}", id)))
    }
}

/// DELETE /api/history
pub async fn clear_history(State(state): State<AppState>) -> ApiResult<Json<DeletedResponse>> {
    let deleted = scans::clear_history(&state.db).await?;
    tracing::info!(deleted, "Cleared check-in history");
    Ok(Json(DeletedResponse { deleted }))
}

/// POST /api/history/import
///
/// Accepts the JSON array the web client kept in local storage.
pub async fn import_history(
    State(state): State<AppState>,
    Json(entries): Json<Vec<HistoryEntry>>,
) -> ApiResult<Json<ImportedResponse>> {
    let imported = scans::import_legacy(&state.db, &entries).await?;
    Ok(Json(ImportedResponse { imported }))
}

/// Build history routes
pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/api/history", get(list_history).delete(clear_history))
        .route("/api/history/summary", get(history_summary))
        .route("/api/history/import", post(import_history))
        .route(
            "/api/history/:id",
            get(get_history_entry).delete(delete_history_entry),
        )
}
