use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::Client;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

const CLIENT_COLUMNS: &str = "id, name, phone, address, notes, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring match on name or phone
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClientInput {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub notes: Option<String>,
}

fn validate(input: &ClientInput) -> Result<(), ApiError> {
    if input.name.trim().is_empty() {
        return Err(ApiError::bad_request("Client name is required"));
    }
    if input.phone.trim().is_empty() {
        return Err(ApiError::bad_request("Client phone is required"));
    }
    Ok(())
}

/// GET /api/clients
pub async fn list(Query(query): Query<ListQuery>) -> ApiResult<Vec<Client>> {
    let pool = DatabaseManager::pool().await?;

    let clients = match query.q {
        Some(ref term) if !term.trim().is_empty() => {
            let pattern = format!("%{}%", term.trim());
            let sql = format!(
                "SELECT {} FROM clients WHERE name ILIKE $1 OR phone ILIKE $1 ORDER BY name",
                CLIENT_COLUMNS
            );
            sqlx::query_as::<_, Client>(&sql).bind(pattern).fetch_all(&pool).await?
        }
        _ => {
            let sql = format!("SELECT {} FROM clients ORDER BY name", CLIENT_COLUMNS);
            sqlx::query_as::<_, Client>(&sql).fetch_all(&pool).await?
        }
    };

    Ok(ApiResponse::success(clients))
}

/// POST /api/clients
pub async fn create(Json(input): Json<ClientInput>) -> ApiResult<Client> {
    validate(&input)?;
    let pool = DatabaseManager::pool().await?;

    let sql = format!(
        "INSERT INTO clients (id, name, phone, address, notes, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, now(), now()) RETURNING {}",
        CLIENT_COLUMNS
    );

    let client = sqlx::query_as::<_, Client>(&sql)
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(input.phone.trim())
        .bind(&input.address)
        .bind(&input.notes)
        .fetch_one(&pool)
        .await?;

    Ok(ApiResponse::created(client))
}

/// GET /api/clients/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Client> {
    let pool = DatabaseManager::pool().await?;

    let sql = format!("SELECT {} FROM clients WHERE id = $1", CLIENT_COLUMNS);
    let client = sqlx::query_as::<_, Client>(&sql)
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Client not found"))?;

    Ok(ApiResponse::success(client))
}

/// PUT /api/clients/:id
pub async fn update(Path(id): Path<Uuid>, Json(input): Json<ClientInput>) -> ApiResult<Client> {
    validate(&input)?;
    let pool = DatabaseManager::pool().await?;

    let sql = format!(
        "UPDATE clients SET name = $2, phone = $3, address = $4, notes = $5, updated_at = now() \
         WHERE id = $1 RETURNING {}",
        CLIENT_COLUMNS
    );

    let client = sqlx::query_as::<_, Client>(&sql)
        .bind(id)
        .bind(input.name.trim())
        .bind(input.phone.trim())
        .bind(&input.address)
        .bind(&input.notes)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Client not found"))?;

    Ok(ApiResponse::success(client))
}

/// DELETE /api/clients/:id
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Client not found"));
    }

    Ok(ApiResponse::<()>::no_content())
}
