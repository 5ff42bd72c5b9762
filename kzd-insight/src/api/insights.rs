//! Insight generation endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use kzd_common::{CheckIn, Insight};
use tracing::{info, warn};

use crate::db::scans;
use crate::models::{HistoryEntry, NewEntry};
use crate::services::GeneratedInsight;
use crate::{ApiResult, AppState};

/// POST /api/generate-insights
///
/// AI only. Upstream failures surface as error responses.
pub async fn generate_insights(
    State(state): State<AppState>,
    Json(checkin): Json<CheckIn>,
) -> ApiResult<Json<Insight>> {
    match state.generator.generate_strict(&checkin).await {
        Ok(generated) => {
            info!(source = %generated.source, "Generated insight");
            Ok(Json(generated.insight))
        }
        Err(error) => {
            warn!(error = %error, "Insight generation failed");
            state.record_error(error.to_string()).await;
            Err(error.into())
        }
    }
}

async fn orchestrate(state: &AppState, checkin: &CheckIn) -> ApiResult<GeneratedInsight> {
    checkin.validate()?;

    let generated = state.generator.generate(checkin).await;
    if let Some(error) = &generated.insight.debug_error {
        state.record_error(error.clone()).await;
    }
    info!(source = %generated.source, vibe = ?checkin.parsed_vibe(), "Generated insight");
    Ok(generated)
}

/// POST /api/insights
///
/// Validated check-in in, insight out. AI failures are replaced with fallback content.
pub async fn create_insight(
    State(state): State<AppState>,
    Json(checkin): Json<CheckIn>,
) -> ApiResult<Json<GeneratedInsight>> {
    Ok(Json(orchestrate(&state, &checkin).await?))
}

/// POST /api/checkins
///
/// Generates an insight and records the check-in in history.
pub async fn create_checkin(
    State(state): State<AppState>,
    Json(checkin): Json<CheckIn>,
) -> ApiResult<(StatusCode, Json<HistoryEntry>)> {
    let generated = orchestrate(&state, &checkin).await?;

    let entry = scans::save_entry(
        &state.db,
        NewEntry {
            checkin,
            insight: Some(generated.insight),
            source: Some(generated.source),
        },
    )
    .await?;

    info!(id = %entry.id, "Saved check-in");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Build insight routes
pub fn insight_routes() -> Router<AppState> {
    Router::new()
        .route("/api/generate-insights", post(generate_insights))
        .route("/api/insights", post(create_insight))
        .route("/api/checkins", post(create_checkin))
}
