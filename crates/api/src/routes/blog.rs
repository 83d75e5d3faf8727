//! Public blog endpoints. Drafts are invisible here.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::blog::{
    BlogPostDetail, BlogPostResponse, BlogPostSummary, ListBlogQuery, ListBlogResponse,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidQuery;

/// GET /api/blog?tag=
pub async fn list_posts(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListBlogQuery>,
) -> Result<Json<ListBlogResponse>, ApiError> {
    let tag = query
        .tag
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let posts = state.blog.list_published(tag).await?;

    Ok(Json(ListBlogResponse {
        ok: true,
        posts: posts.iter().map(BlogPostSummary::from).collect(),
    }))
}

/// GET /api/blog/:slug
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPostResponse>, ApiError> {
    let post = state.blog.get(&slug).await?;
    if !post.is_published() {
        return Err(ApiError::NotFound("Post not found".into()));
    }

    Ok(Json(BlogPostResponse {
        ok: true,
        post: BlogPostDetail::public(&post),
    }))
}
