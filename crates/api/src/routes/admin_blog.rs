//! Admin blog management. Posts are markdown files in the content directory.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::blog::{
    BlogPostDetail, BlogPostRequest, BlogPostResponse, BlogPostSummary, ListBlogResponse,
};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidJson;
use crate::routes::admin::OkResponse;

/// GET /api/admin/blog
///
/// Every post, drafts included.
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<ListBlogResponse>, ApiError> {
    let posts = state.blog.list().await?;
    Ok(Json(ListBlogResponse {
        ok: true,
        posts: posts.iter().map(BlogPostSummary::from).collect(),
    }))
}

/// POST /api/admin/blog
pub async fn create_post(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<BlogPostRequest>,
) -> Result<(StatusCode, Json<BlogPostResponse>), ApiError> {
    let slug = request.resolved_slug();
    if slug.is_empty() {
        return Err(ApiError::Validation(
            "Title must contain letters or digits to derive a slug".into(),
        ));
    }

    let post = request.into_post(slug, Utc::now().date_naive());
    state.blog.create(&post).await?;
    info!(slug = %post.slug(), status = ?post.frontmatter.status, "Blog post created");

    Ok((
        StatusCode::CREATED,
        Json(BlogPostResponse {
            ok: true,
            post: BlogPostDetail::admin(&post),
        }),
    ))
}

/// GET /api/admin/blog/:slug
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPostResponse>, ApiError> {
    let post = state.blog.get(&slug).await?;
    Ok(Json(BlogPostResponse {
        ok: true,
        post: BlogPostDetail::admin(&post),
    }))
}

/// PUT /api/admin/blog/:slug
///
/// Full replacement. A changed slug renames the file.
pub async fn update_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ValidJson(request): ValidJson<BlogPostRequest>,
) -> Result<Json<BlogPostResponse>, ApiError> {
    let new_slug = match request.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => slug.clone(),
    };

    let post = request.into_post(new_slug, Utc::now().date_naive());
    state.blog.update(&slug, &post).await?;
    info!(slug = %slug, new_slug = %post.slug(), "Blog post updated");

    Ok(Json(BlogPostResponse {
        ok: true,
        post: BlogPostDetail::admin(&post),
    }))
}

/// DELETE /api/admin/blog/:slug
pub async fn delete_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    state.blog.delete(&slug).await?;
    info!(slug = %slug, "Blog post deleted");
    Ok(Json(OkResponse { ok: true }))
}
