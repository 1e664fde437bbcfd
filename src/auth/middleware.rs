use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use super::{parse_token, verify_secret};
use crate::server::AppState;
use crate::types::{Role, Token, User};

/// Extractor that requires any valid bearer credential. Carries the token row
/// and the owning user.
pub struct RequireAuth {
    pub token: Token,
    pub user: User,
}

/// Extractor that additionally requires the admin role.
pub struct RequireAdmin {
    pub token: Token,
    pub user: User,
}

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    NotAdmin,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
            AuthError::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "data": null, "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                "WWW-Authenticate",
                "Bearer realm=\"campusd\"".parse().unwrap(),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let (token, user) = authenticate(parts, state)?;
        Ok(RequireAuth { token, user })
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let (token, user) = authenticate(parts, state)?;

        if user.role != Role::Admin {
            return Err(AuthError::NotAdmin);
        }

        Ok(RequireAdmin { token, user })
    }
}

fn authenticate(parts: &Parts, state: &Arc<AppState>) -> Result<(Token, User), AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let raw_token = match auth_header {
        Some(header) => header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidScheme)?,
        None => return Err(AuthError::MissingAuth),
    };

    let (lookup, _secret) = parse_token(raw_token).map_err(|_| AuthError::InvalidToken)?;

    let token = state
        .store
        .get_token_by_lookup(&lookup)
        .map_err(|_| AuthError::InternalError)?
        .ok_or(AuthError::InvalidToken)?;

    if !verify_secret(raw_token, &token.token_hash).map_err(|_| AuthError::InternalError)? {
        return Err(AuthError::InvalidToken);
    }

    if token.expires_at < Utc::now() {
        return Err(AuthError::TokenExpired);
    }

    let user = state
        .store
        .get_user(&token.user_id)
        .map_err(|_| AuthError::InternalError)?
        .ok_or(AuthError::InvalidToken)?;

    if let Err(e) = state.store.update_token_last_used(&token.id) {
        tracing::warn!("Failed to update token last_used_at: {e}");
    }

    Ok((token, user))
}
