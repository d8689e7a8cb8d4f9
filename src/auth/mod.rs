//! Admin authentication: password hashing, the session store, and the
//! middleware that gates admin routes.

mod password;
mod session;

pub use session::{AdminGuard, SessionState};

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Request},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;

/// Alternative header carrying the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Message returned to callers without a valid admin session.
pub const ADMIN_REQUIRED: &str = "Administrator access required";

/// Token from `Authorization: Bearer` or `x-admin-token`.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    bearer
        .or_else(|| {
            headers
                .get(ADMIN_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Post-login destination: a local path, otherwise the site root.
pub fn redirect_target(requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

/// Admin gate. Authenticated requests carry their `AdminSession` in the
/// request extensions; everyone else gets a 401 naming the login entry point
/// and the path they asked for.
pub async fn admin_guard_layer(guard: Arc<AdminGuard>, mut request: Request, next: Next) -> Response {
    let token = extract_token(request.headers());

    match guard.state(token.as_deref()).await {
        SessionState::Authenticated(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        SessionState::Unauthenticated => {
            let uri = request
                .extensions()
                .get::<OriginalUri>()
                .map(|original| original.0.clone())
                .unwrap_or_else(|| request.uri().clone());
            let redirect = uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| uri.path().to_string());

            tracing::debug!("Rejected admin request to {}", redirect);
            AppError::Unauthorized {
                message: ADMIN_REQUIRED.to_string(),
                redirect: Some(redirect),
            }
            .into_response()
        }
    }
}
