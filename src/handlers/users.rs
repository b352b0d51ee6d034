use axum::extract::{Extension, Path};
use axum::Json;
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::database::models::{Role, User};
use crate::database::{manager::DatabaseManager, users};
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::validate_user::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

fn parse_role(role: &str) -> Result<Role, ApiError> {
    role.parse::<Role>().map_err(|_| {
        let names: Vec<&str> = Role::ALL.iter().map(Role::as_str).collect();
        ApiError::bad_request(format!("Role must be one of: {}", names.join(", ")))
    })
}

/// GET /api/users
pub async fn list() -> ApiResult<Vec<User>> {
    let pool = DatabaseManager::pool().await?;
    let all = users::list_all(&pool).await?;
    Ok(ApiResponse::success(all))
}

/// POST /api/users
pub async fn create(Json(body): Json<CreateUserRequest>) -> ApiResult<User> {
    if body.name.trim().is_empty() || body.email.trim().is_empty() {
        return Err(ApiError::bad_request("Name and email are required"));
    }
    if body.password.len() < 8 {
        return Err(ApiError::bad_request("Password must be at least 8 characters"));
    }
    let role = parse_role(&body.role)?;

    let pool = DatabaseManager::pool().await?;
    let password_hash = hash_password(&body.password);

    let user = users::insert(
        &pool,
        body.name.trim(),
        body.email.trim(),
        &password_hash,
        role.as_str(),
    )
    .await?;

    Ok(ApiResponse::created(user))
}

/// GET /api/users/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<User> {
    let pool = DatabaseManager::pool().await?;

    let user = users::fetch_by_id(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(user))
}

/// PUT /api/users/:id - partial update of name, role, active status, password
pub async fn update(
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    // An owner cannot lock themselves out mid-session
    if current.id == id && body.is_active == Some(false) {
        return Err(ApiError::bad_request("You cannot deactivate your own account"));
    }

    let role = match body.role {
        Some(ref role) => Some(parse_role(role)?),
        None => None,
    };
    if let Some(ref password) = body.password {
        if password.len() < 8 {
            return Err(ApiError::bad_request("Password must be at least 8 characters"));
        }
    }

    let pool = DatabaseManager::pool().await?;

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET updated_at = now()");
    if let Some(ref name) = body.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Name cannot be empty"));
        }
        builder.push(", name = ").push_bind(name.trim().to_string());
    }
    if let Some(role) = role {
        builder.push(", role = ").push_bind(role.as_str());
    }
    if let Some(is_active) = body.is_active {
        builder.push(", is_active = ").push_bind(is_active);
    }
    if let Some(ref password) = body.password {
        builder.push(", password_hash = ").push_bind(hash_password(password));
    }
    builder.push(" WHERE id = ").push_bind(id);
    builder.push(" RETURNING id, name, email, password_hash, role, is_active, created_at, updated_at");

    let user = builder
        .build_query_as::<User>()
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(user))
}

/// DELETE /api/users/:id
pub async fn delete(
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    if current.id == id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(ApiResponse::<()>::no_content())
}
