//! Admin login, session and logout endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};

use super::{success, ApiResult};
use crate::auth::{extract_token, redirect_target, SessionState};
use crate::errors::AppError;
use crate::models::{LoginRequest, LoginResponse, SessionInfo};
use crate::AppState;

/// POST /api/auth/login - Exchange credentials for an admin token.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) =
        payload.map_err(|e| AppError::BadRequest(format!("Invalid login request: {}", e)))?;

    let (token, session) = state
        .admin
        .login(request.username.trim(), &request.password)
        .await?;

    success(LoginResponse {
        token,
        username: session.identity.username,
        expires_at: session.expires_at,
        redirect_to: redirect_target(request.redirect.as_deref()),
    })
}

/// GET /api/auth/session - Whether the presented token is an admin session.
pub async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<SessionInfo> {
    let token = extract_token(&headers);

    let session_state = state.admin.state(token.as_deref()).await;
    let is_admin = session_state.is_admin();
    let (username, expires_at) = match session_state {
        SessionState::Authenticated(session) => {
            (Some(session.identity.username), Some(session.expires_at))
        }
        SessionState::Unauthenticated => (None, None),
    };

    success(SessionInfo {
        is_admin,
        username,
        expires_at,
    })
}

/// POST /api/auth/logout - End the presented session. Always succeeds.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<bool> {
    if let Some(token) = extract_token(&headers) {
        state.admin.logout(&token).await?;
    }
    success(true)
}
