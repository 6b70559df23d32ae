use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{HeaderMap, StatusCode, request::Parts},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, TokenDto};
use crate::db::User;

// ============================================================================
// Request types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ============================================================================
// Extractors
// ============================================================================

/// Requester resolved from the `Authorization` header; rejects with 401
/// when the header is missing or the token is unknown.
pub struct AuthUser(pub User);

/// Like [`AuthUser`] but missing credentials resolve to `None` instead
/// of rejecting. A present-but-invalid token is still a 401.
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_token(&parts.headers) else {
            return Err(ApiError::Unauthorized(
                "Authentication credentials were not provided".to_string(),
            ));
        };

        let user = state
            .store()
            .find_user_by_token(&token)
            .await
            .map_err(|e| ApiError::internal(format!("Token lookup failed: {e}")))?
            .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

        tracing::Span::current().record("user_id", user.id);

        Ok(Self(user))
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if extract_token(&parts.headers).is_none() {
            return Ok(Self(None));
        }

        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        Ok(Self(Some(user)))
    }
}

/// Accepts `Authorization: Token <key>` and `Authorization: Bearer <key>`.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization")?.to_str().ok()?;

    auth_header
        .strip_prefix("Token ")
        .or_else(|| auth_header.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/token/login/
/// Exchange email + password for an auth token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenDto>, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::detail("Email and password are required"));
    }

    let user = state
        .store()
        .verify_credentials(&payload.email, &payload.password)
        .await
        .map_err(|e| ApiError::internal(format!("Authentication error: {e}")))?
        .ok_or_else(|| ApiError::detail("Unable to log in with provided credentials"))?;

    let auth_token = state
        .store()
        .issue_auth_token(user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {e}")))?;

    tracing::info!("Issued auth token for user: {}", user.username);

    Ok(Json(TokenDto { auth_token }))
}

/// POST /api/auth/token/logout/
/// Invalidate the requester's token.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    state
        .store()
        .revoke_auth_token(user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to revoke token: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}
