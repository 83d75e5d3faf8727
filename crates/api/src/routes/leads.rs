//! Public lead capture: tool result submissions and the contact form.

use axum::{extract::State, Json};
use domain::models::lead::{ContactRequest, LeadIntakeResponse, ToolLeadRequest};
use domain::models::LeadSubmission;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidJson;
use crate::services::lead_intake::LeadIntakeService;

async fn intake(state: &AppState, submission: LeadSubmission) -> Result<Json<LeadIntakeResponse>, ApiError> {
    let service = LeadIntakeService::new(
        state.pool.clone(),
        state.email.clone(),
        state.config.site.clone(),
    );
    let outcome = service.submit(submission).await?;

    Ok(Json(LeadIntakeResponse {
        ok: true,
        lead_id: outcome.lead_id,
        updated: outcome.updated,
        email_sent: outcome.email_sent,
    }))
}

/// POST /api/tools/lead
pub async fn submit_tool_lead(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<ToolLeadRequest>,
) -> Result<Json<LeadIntakeResponse>, ApiError> {
    intake(&state, request.into()).await
}

/// POST /api/contact
pub async fn submit_contact(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<ContactRequest>,
) -> Result<Json<LeadIntakeResponse>, ApiError> {
    intake(&state, request.into()).await
}
