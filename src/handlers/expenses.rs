use axum::extract::{Path, Query};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::Expense;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

const EXPENSE_COLUMNS: &str =
    "id, category, description, amount, batch_id, incurred_on, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub batch_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ExpenseInput {
    pub category: String,
    pub description: Option<String>,
    pub amount: f64,
    pub batch_id: Option<Uuid>,
    pub incurred_on: NaiveDate,
}

fn validate(input: &ExpenseInput) -> Result<(), ApiError> {
    if input.category.trim().is_empty() {
        return Err(ApiError::bad_request("Expense category is required"));
    }
    if input.amount <= 0.0 {
        return Err(ApiError::bad_request("Amount must be greater than zero"));
    }
    Ok(())
}

/// GET /api/expenses - optionally filtered by category, batch and date range
pub async fn list(Query(query): Query<ListQuery>) -> ApiResult<Vec<Expense>> {
    let pool = DatabaseManager::pool().await?;

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM expenses WHERE 1=1", EXPENSE_COLUMNS));

    if let Some(ref category) = query.category {
        builder.push(" AND category = ").push_bind(category);
    }
    if let Some(batch_id) = query.batch_id {
        builder.push(" AND batch_id = ").push_bind(batch_id);
    }
    if let Some(from) = query.from {
        builder.push(" AND incurred_on >= ").push_bind(from);
    }
    if let Some(to) = query.to {
        builder.push(" AND incurred_on <= ").push_bind(to);
    }
    builder.push(" ORDER BY incurred_on DESC, created_at DESC");

    let expenses = builder.build_query_as::<Expense>().fetch_all(&pool).await?;

    Ok(ApiResponse::success(expenses))
}

/// POST /api/expenses
pub async fn create(Json(input): Json<ExpenseInput>) -> ApiResult<Expense> {
    validate(&input)?;
    let pool = DatabaseManager::pool().await?;

    let sql = format!(
        "INSERT INTO expenses (id, category, description, amount, batch_id, incurred_on, \
         created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, now(), now()) RETURNING {}",
        EXPENSE_COLUMNS
    );

    let expense = sqlx::query_as::<_, Expense>(&sql)
        .bind(Uuid::new_v4())
        .bind(input.category.trim())
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.batch_id)
        .bind(input.incurred_on)
        .fetch_one(&pool)
        .await?;

    Ok(ApiResponse::created(expense))
}

/// GET /api/expenses/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Expense> {
    let pool = DatabaseManager::pool().await?;

    let sql = format!("SELECT {} FROM expenses WHERE id = $1", EXPENSE_COLUMNS);
    let expense = sqlx::query_as::<_, Expense>(&sql)
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Expense not found"))?;

    Ok(ApiResponse::success(expense))
}

/// PUT /api/expenses/:id
pub async fn update(Path(id): Path<Uuid>, Json(input): Json<ExpenseInput>) -> ApiResult<Expense> {
    validate(&input)?;
    let pool = DatabaseManager::pool().await?;

    let sql = format!(
        "UPDATE expenses SET category = $2, description = $3, amount = $4, batch_id = $5, \
         incurred_on = $6, updated_at = now() WHERE id = $1 RETURNING {}",
        EXPENSE_COLUMNS
    );

    let expense = sqlx::query_as::<_, Expense>(&sql)
        .bind(id)
        .bind(input.category.trim())
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.batch_id)
        .bind(input.incurred_on)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Expense not found"))?;

    Ok(ApiResponse::success(expense))
}

/// DELETE /api/expenses/:id
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Expense not found"));
    }

    Ok(ApiResponse::<()>::no_content())
}
