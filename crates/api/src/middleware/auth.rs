//! Admin authentication middleware.
//!
//! Accepts either a valid session cookie or the shared admin secret (in
//! `X-Admin-Secret` or as a bearer token). The resolved [`AdminPrincipal`] is
//! stored in request extensions.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::session::AdminPrincipal;

pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match state.sessions.authenticate(req.headers()) {
        Some(principal) => {
            if let AdminPrincipal::Session { jti } = &principal {
                tracing::debug!(session = %jti, "Admin session accepted");
            }
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        None => unauthorized_response(),
    }
}

fn unauthorized_response() -> Response {
    ApiError::Unauthorized("Admin authentication required".into()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_unauthorized_response() {
        let response = unauthorized_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
