//! Admin API routes: session login, lead pipeline, event log and drip dispatch.
//!
//! Everything except login and logout sits behind [`crate::middleware::require_admin`].

use axum::{
    extract::{Extension, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use domain::models::event::{ListEventsQuery, ListEventsResponse};
use domain::models::lead::{
    LeadResponse, ListLeadsQuery, ListLeadsResponse, UpdateLeadRequest,
};
use domain::models::{Event, Lead};
use persistence::repositories::{EventRepository, LeadRepository};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ValidJson, ValidQuery};
use crate::services::drip_dispatch::DripRunSummary;
use crate::services::session::AdminPrincipal;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 1024, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct LeadUpdateResponse {
    pub ok: bool,
    pub lead: LeadResponse,
}

#[derive(Debug, Serialize)]
pub struct DripProcessResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub summary: DripRunSummary,
}

/// POST /api/admin/login
///
/// Verifies the password against the configured Argon2id hash and sets the
/// session cookie.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.sessions.password_login_enabled() {
        return Err(ApiError::NotConfigured("Password login is not configured".into()));
    }

    let sessions = state.sessions.clone();
    let valid = tokio::task::spawn_blocking(move || sessions.check_password(&request.password))
        .await
        .map_err(|e| ApiError::Internal(format!("Password check task failed: {}", e)))?
        .map_err(|e| ApiError::Internal(format!("Password check failed: {}", e)))?;

    if !valid {
        warn!("Admin login rejected");
        return Err(ApiError::Unauthorized("Invalid password".into()));
    }

    let token = state
        .sessions
        .issue()
        .map_err(|e| ApiError::Internal(format!("Failed to issue session: {}", e)))?;

    info!("Admin logged in");
    Ok((
        [(header::SET_COOKIE, state.sessions.session_cookie(&token))],
        Json(OkResponse { ok: true }),
    ))
}

/// POST /api/admin/logout
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, state.sessions.clear_cookie())],
        Json(OkResponse { ok: true }),
    )
}

/// GET /api/admin/leads?status=&limit=&offset=
pub async fn list_leads(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListLeadsQuery>,
) -> Result<Json<ListLeadsResponse>, ApiError> {
    let repo = LeadRepository::new(state.pool.clone());
    let leads = repo.list(query.status, query.limit, query.offset).await?;
    let total = repo.count(query.status).await?;

    Ok(Json(ListLeadsResponse {
        ok: true,
        leads: leads
            .into_iter()
            .map(|entity| LeadResponse::from(Lead::from(entity)))
            .collect(),
        total,
    }))
}

/// PATCH /api/admin/leads/:id
pub async fn update_lead(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
    Path(id): Path<Uuid>,
    ValidJson(request): ValidJson<UpdateLeadRequest>,
) -> Result<Json<LeadUpdateResponse>, ApiError> {
    if request.is_empty() {
        return Err(ApiError::Validation(
            "Provide a status and/or tags to update".to_string(),
        ));
    }

    let tags = request.normalized_tags();
    let repo = LeadRepository::new(state.pool.clone());
    let lead: Lead = repo
        .update_admin_fields(id, request.status, tags.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?
        .into();

    info!(
        lead_id = %id,
        status = %lead.status,
        admin = ?principal,
        "Admin updated lead"
    );

    Ok(Json(LeadUpdateResponse {
        ok: true,
        lead: lead.into(),
    }))
}

/// GET /api/admin/events?event_type=&limit=
pub async fn list_events(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListEventsQuery>,
) -> Result<Json<ListEventsResponse>, ApiError> {
    let repo = EventRepository::new(state.pool.clone());
    let events = repo.list_recent(query.event_type, query.limit).await?;

    Ok(Json(ListEventsResponse {
        ok: true,
        events: events.into_iter().map(Event::from).collect(),
    }))
}

/// POST /api/admin/drip/process
///
/// Same work as the background job; external cron callers use the shared secret.
pub async fn process_drip(
    State(state): State<AppState>,
    Extension(principal): Extension<AdminPrincipal>,
) -> Result<Json<DripProcessResponse>, ApiError> {
    let summary = state.drip.run(Utc::now()).await?;
    info!(admin = ?principal, processed = summary.processed, "Drip processed on request");

    Ok(Json(DripProcessResponse { ok: true, summary }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drip_response_is_flat() {
        let response = DripProcessResponse {
            ok: true,
            summary: DripRunSummary {
                processed: 3,
                sent: 1,
                failed: 1,
                skipped: 1,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["processed"], 3);
        assert_eq!(json["skipped"], 1);
    }

    #[test]
    fn test_login_request_requires_password() {
        let request = LoginRequest {
            password: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
