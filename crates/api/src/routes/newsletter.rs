//! Public newsletter endpoints.

use axum::{extract::State, Json};
use domain::models::newsletter::{
    SubscribeRequest, SubscribeResponse, UnsubscribeRequest, UnsubscribeResponse,
};
use shared::validation::normalize_email;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidJson;
use crate::services::newsletter::NewsletterService;

/// POST /api/newsletter/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<SubscribeRequest>,
) -> Result<Json<SubscribeResponse>, ApiError> {
    let service = NewsletterService::new(state.pool.clone(), &state.email, &state.config);
    let response = service.subscribe(&normalize_email(&request.email)).await?;
    Ok(Json(response))
}

/// POST /api/newsletter/unsubscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UnsubscribeRequest>,
) -> Result<Json<UnsubscribeResponse>, ApiError> {
    let service = NewsletterService::new(state.pool.clone(), &state.email, &state.config);
    let response = service
        .unsubscribe(&normalize_email(&request.email), request.token.trim())
        .await?;
    Ok(Json(response))
}
