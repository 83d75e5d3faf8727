//! Admin newsletter management: subscribers, drafts and sending.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::newsletter::{
    ListNewsletterPostsResponse, ListSubscribersQuery, ListSubscribersResponse,
    NewsletterPostRequest, NewsletterPostResponse, SendNewsletterResponse,
};
use domain::models::{NewsletterPost, NewsletterSubscriber};
use persistence::repositories::{NewsletterPostRepository, NewsletterSubscriberRepository};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ValidJson, ValidQuery};
use crate::routes::admin::OkResponse;
use crate::services::newsletter::NewsletterService;

/// GET /api/admin/newsletter/subscribers?status=
pub async fn list_subscribers(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListSubscribersQuery>,
) -> Result<Json<ListSubscribersResponse>, ApiError> {
    let repo = NewsletterSubscriberRepository::new(state.pool.clone());
    let subscribers: Vec<NewsletterSubscriber> = repo
        .list(query.status)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListSubscribersResponse {
        ok: true,
        total: subscribers.len(),
        subscribers,
    }))
}

/// GET /api/admin/newsletter/posts
pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<ListNewsletterPostsResponse>, ApiError> {
    let repo = NewsletterPostRepository::new(state.pool.clone());
    let posts = repo.list().await?.into_iter().map(Into::into).collect();
    Ok(Json(ListNewsletterPostsResponse { ok: true, posts }))
}

/// POST /api/admin/newsletter/posts
pub async fn create_post(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<NewsletterPostRequest>,
) -> Result<(StatusCode, Json<NewsletterPostResponse>), ApiError> {
    let repo = NewsletterPostRepository::new(state.pool.clone());
    let post: NewsletterPost = repo
        .create(request.subject.trim(), &request.content_html)
        .await?
        .into();
    info!(post_id = %post.id, "Newsletter draft created");

    Ok((
        StatusCode::CREATED,
        Json(NewsletterPostResponse { ok: true, post }),
    ))
}

/// Distinguishes a missing post from one that was already sent.
async fn draft_guard(repo: &NewsletterPostRepository, id: Uuid) -> ApiError {
    match repo.find_by_id(id).await {
        Ok(Some(_)) => ApiError::Conflict("Sent newsletter posts cannot be changed".into()),
        Ok(None) => ApiError::NotFound("Newsletter post not found".into()),
        Err(e) => e.into(),
    }
}

/// PUT /api/admin/newsletter/posts/:id
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(request): ValidJson<NewsletterPostRequest>,
) -> Result<Json<NewsletterPostResponse>, ApiError> {
    let repo = NewsletterPostRepository::new(state.pool.clone());
    match repo
        .update_draft(id, request.subject.trim(), &request.content_html)
        .await?
    {
        Some(entity) => {
            info!(post_id = %id, "Newsletter draft updated");
            Ok(Json(NewsletterPostResponse {
                ok: true,
                post: entity.into(),
            }))
        }
        None => Err(draft_guard(&repo, id).await),
    }
}

/// DELETE /api/admin/newsletter/posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OkResponse>, ApiError> {
    let repo = NewsletterPostRepository::new(state.pool.clone());
    if repo.delete_draft(id).await? == 0 {
        return Err(draft_guard(&repo, id).await);
    }
    info!(post_id = %id, "Newsletter draft deleted");
    Ok(Json(OkResponse { ok: true }))
}

/// POST /api/admin/newsletter/posts/:id/send
pub async fn send_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SendNewsletterResponse>, ApiError> {
    let service = NewsletterService::new(state.pool.clone(), &state.email, &state.config);
    Ok(Json(service.send_post(id).await?))
}
