//! AI explanation of a calculator result.

use axum::{extract::State, Json};
use domain::models::ai::{AiSummaryRequest, AiSummaryResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidJson;

/// POST /api/ai/summary
///
/// 503 `not_configured` when no provider is set up.
pub async fn summarize(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<AiSummaryRequest>,
) -> Result<Json<AiSummaryResponse>, ApiError> {
    let question = request
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());

    let summary = state
        .ai
        .summarize(request.tool, &request.result, question)
        .await?;

    Ok(Json(AiSummaryResponse { ok: true, summary }))
}
