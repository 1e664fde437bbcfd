use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::{RequireAdmin, RequireAuth, generate_token, hash_secret, verify_secret};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{SigninRequest, SigninResponse, SignupRequest};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::require_nonempty;
use crate::types::{Role, Token, User};

/// Session lifetime for tokens issued by signin.
const TOKEN_TTL_DAYS: i64 = 7;

pub async fn signup(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    require_nonempty(&req.student_id, "student_id").map_err(ApiError::bad_request)?;
    require_nonempty(&req.name, "name").map_err(ApiError::bad_request)?;
    if req.password.len() < 8 {
        return Err(ApiError::bad_request(
            "password must be at least 8 characters",
        ));
    }

    let password_hash = hash_secret(&req.password).api_err("Failed to hash password")?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        student_id: req.student_id,
        name: req.name,
        password_hash,
        role: Role::Student,
        created_at: now,
        updated_at: now,
    };

    match state.store.create_user(&user) {
        Ok(()) => {}
        Err(Error::AlreadyExists) => {
            return Err(ApiError::conflict("Student ID already registered"));
        }
        Err(e) => {
            tracing::error!("Failed to create user: {e}");
            return Err(ApiError::internal("Failed to create user"));
        }
    }

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

pub async fn signin(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SigninRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let user = state
        .store
        .get_user_by_student_id(&req.student_id)
        .api_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let valid =
        verify_secret(&req.password, &user.password_hash).api_err("Failed to verify password")?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    // The 8-char lookup column is uniquely indexed; on the rare collision,
    // generate a fresh token instead of failing the signin.
    const MAX_RETRIES: u32 = 3;
    for _ in 0..MAX_RETRIES {
        let (raw_token, lookup, hash) = generate_token().api_err("Failed to generate token")?;

        let now = Utc::now();
        let token = Token {
            id: Uuid::new_v4().to_string(),
            token_hash: hash,
            token_lookup: lookup,
            user_id: user.id.clone(),
            created_at: now,
            expires_at: now + Duration::days(TOKEN_TTL_DAYS),
            last_used_at: None,
        };

        match state.store.create_token(&token) {
            Ok(()) => {
                return Ok(Json(ApiResponse::success(SigninResponse {
                    token: raw_token,
                    expires_at: token.expires_at,
                    user,
                })));
            }
            Err(Error::TokenLookupCollision) => continue,
            Err(e) => {
                tracing::error!("Failed to create token: {e}");
                return Err(ApiError::internal("Failed to create token"));
            }
        }
    }

    Err(ApiError::internal("Failed to create token after retries"))
}

/// Revokes the presented token. The token row is deleted, so the same
/// bearer value stops working immediately.
pub async fn signout(auth: RequireAuth, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state
        .store
        .delete_token(&auth.token.id)
        .api_err("Failed to delete token")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn me(auth: RequireAuth) -> impl IntoResponse {
    Json(ApiResponse::success(auth.user))
}

pub async fn list_users(_admin: RequireAdmin, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let users = state.store.list_users().api_err("Failed to list users")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(users)))
}
