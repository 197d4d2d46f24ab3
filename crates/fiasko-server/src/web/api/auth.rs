use crate::auth::{create_session_token, hash_password, verify_password};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use fiasko_common::models::auth::{AuthResponse, LoginRequest, RegisterRequest, User};
use fiasko_db::{UserRepo, UserRow};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

fn user_response(row: &UserRow) -> User {
    User {
        user_id: row.user_id,
        username: row.username.clone(),
        email: row.email.clone(),
        created_at: row.created_at,
    }
}

/// POST /api/auth/register
#[tracing::instrument(skip(state, req))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    let email = req.email.trim();
    let username = req.username.trim();
    if email.is_empty() || username.is_empty() || req.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Email, username and password are required"})),
        )
            .into_response();
    }

    let password_hash = match hash_password(&req.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Failed to hash password: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response();
        }
    };

    // The unique constraints arbitrate races; a duplicate comes back as a
    // typed outcome, never as a second row.
    let user = match UserRepo::create(&state.pool, Uuid::new_v4(), email, username, &password_hash)
        .await
    {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({"error": "Email or username already in use"})),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("DB error during register: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response();
        }
    };

    let token = match create_session_token(
        user.user_id,
        &user.email,
        &user.username,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_secs,
    ) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to create session token: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response();
        }
    };

    (
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user_response(&user),
            token,
        }),
    )
        .into_response()
}

/// POST /api/auth/login
#[tracing::instrument(skip(state, req))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let user = match UserRepo::get_by_email(&state.pool, &req.email).await {
        Ok(Some(u)) => u,
        // Unknown email and wrong password are indistinguishable on the wire
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid email or password"})),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("DB error during login: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response();
        }
    };

    match verify_password(&req.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid email or password"})),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Password verification error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response();
        }
    }

    let token = match create_session_token(
        user.user_id,
        &user.email,
        &user.username,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_secs,
    ) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to create session token: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response();
        }
    };

    Json(AuthResponse {
        user: user_response(&user),
        token,
    })
    .into_response()
}
