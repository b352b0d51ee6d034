use axum::{extract::Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{issue_token, verify_password};
use crate::config;
use crate::database::{manager::DatabaseManager, users};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - authenticate credentials and issue a JWT
pub async fn login(Json(body): Json<LoginRequest>) -> ApiResult<Value> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let pool = DatabaseManager::pool().await?;

    let user = users::fetch_by_email(&pool, body.email.trim())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !verify_password(&body.password, &user.password_hash) {
        tracing::warn!("Failed login attempt for '{}'", user.email);
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    if !user.is_active {
        return Err(ApiError::forbidden("This account has been deactivated"));
    }

    let token = issue_token(&user).map_err(|e| {
        tracing::error!("Token generation failed for '{}': {}", user.email, e);
        ApiError::internal_server_error("Failed to issue token")
    })?;

    let expires_in = config::config().security.jwt_expiry_hours * 3600;

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
        },
        "expires_in": expires_in,
    })))
}

/// GET /api/auth/whoami - current identity, re-read from storage
pub async fn whoami(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;

    let user = users::fetch_by_id(&pool, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User account no longer exists"))?;

    Ok(ApiResponse::success(json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "role": user.role,
        "is_active": user.is_active,
        "created_at": user.created_at,
    })))
}
