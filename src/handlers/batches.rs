use axum::extract::{Path, Query};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::Batch;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

const BATCH_COLUMNS: &str = "id, name, product, started_on, initial_count, current_count, \
                             status, notes, created_at, updated_at";

const STATUSES: &[&str] = &["active", "closed"];

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchInput {
    pub name: String,
    pub product: String,
    pub started_on: NaiveDate,
    pub initial_count: i32,
    pub current_count: Option<i32>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

fn validate(input: &BatchInput) -> Result<(), ApiError> {
    if input.name.trim().is_empty() {
        return Err(ApiError::bad_request("Batch name is required"));
    }
    if input.product.trim().is_empty() {
        return Err(ApiError::bad_request("Batch product is required"));
    }
    if input.initial_count < 0 {
        return Err(ApiError::bad_request("Initial count cannot be negative"));
    }
    if let Some(count) = input.current_count {
        if count < 0 {
            return Err(ApiError::bad_request("Current count cannot be negative"));
        }
    }
    if let Some(ref status) = input.status {
        if !STATUSES.contains(&status.as_str()) {
            return Err(ApiError::bad_request(format!(
                "Status must be one of: {}",
                STATUSES.join(", ")
            )));
        }
    }
    Ok(())
}

/// GET /api/batches
pub async fn list(Query(query): Query<ListQuery>) -> ApiResult<Vec<Batch>> {
    let pool = DatabaseManager::pool().await?;

    let batches = match query.status {
        Some(ref status) => {
            let sql = format!(
                "SELECT {} FROM batches WHERE status = $1 ORDER BY started_on DESC",
                BATCH_COLUMNS
            );
            sqlx::query_as::<_, Batch>(&sql).bind(status).fetch_all(&pool).await?
        }
        None => {
            let sql = format!("SELECT {} FROM batches ORDER BY started_on DESC", BATCH_COLUMNS);
            sqlx::query_as::<_, Batch>(&sql).fetch_all(&pool).await?
        }
    };

    Ok(ApiResponse::success(batches))
}

/// POST /api/batches
pub async fn create(Json(input): Json<BatchInput>) -> ApiResult<Batch> {
    validate(&input)?;
    let pool = DatabaseManager::pool().await?;

    let current_count = input.current_count.unwrap_or(input.initial_count);
    let status = input.status.as_deref().unwrap_or("active");

    let sql = format!(
        "INSERT INTO batches (id, name, product, started_on, initial_count, current_count, \
         status, notes, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), now()) RETURNING {}",
        BATCH_COLUMNS
    );

    let batch = sqlx::query_as::<_, Batch>(&sql)
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(input.product.trim())
        .bind(input.started_on)
        .bind(input.initial_count)
        .bind(current_count)
        .bind(status)
        .bind(&input.notes)
        .fetch_one(&pool)
        .await?;

    Ok(ApiResponse::created(batch))
}

/// GET /api/batches/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Batch> {
    let pool = DatabaseManager::pool().await?;

    let sql = format!("SELECT {} FROM batches WHERE id = $1", BATCH_COLUMNS);
    let batch = sqlx::query_as::<_, Batch>(&sql)
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Batch not found"))?;

    Ok(ApiResponse::success(batch))
}

/// PUT /api/batches/:id
pub async fn update(Path(id): Path<Uuid>, Json(input): Json<BatchInput>) -> ApiResult<Batch> {
    validate(&input)?;
    let pool = DatabaseManager::pool().await?;

    let sql = format!(
        "UPDATE batches SET name = $2, product = $3, started_on = $4, initial_count = $5, \
         current_count = COALESCE($6, current_count), status = COALESCE($7, status), \
         notes = $8, updated_at = now() WHERE id = $1 RETURNING {}",
        BATCH_COLUMNS
    );

    let batch = sqlx::query_as::<_, Batch>(&sql)
        .bind(id)
        .bind(input.name.trim())
        .bind(input.product.trim())
        .bind(input.started_on)
        .bind(input.initial_count)
        .bind(input.current_count)
        .bind(&input.status)
        .bind(&input.notes)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Batch not found"))?;

    Ok(ApiResponse::success(batch))
}

/// DELETE /api/batches/:id
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM batches WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Batch not found"));
    }

    Ok(ApiResponse::<()>::no_content())
}
