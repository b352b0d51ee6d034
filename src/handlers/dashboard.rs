use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sqlx::Row;

use crate::database::manager::DatabaseManager;
use crate::database::models::Sale;
use crate::middleware::response::{ApiResponse, ApiResult};

/// GET /api/dashboard - headline counts and the trailing week's activity
pub async fn summary() -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;

    let today = Utc::now().date_naive();
    let week_ago = today - Duration::days(7);

    let client_count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM clients")
        .fetch_one(&pool)
        .await?
        .get("count");

    let active_batches: i64 = sqlx::query("SELECT COUNT(*) AS count FROM batches WHERE status = 'active'")
        .fetch_one(&pool)
        .await?
        .get("count");

    let week_sales: f64 = sqlx::query(
        "SELECT COALESCE(SUM(total), 0) AS total FROM sales WHERE sold_on >= $1",
    )
    .bind(week_ago)
    .fetch_one(&pool)
    .await?
    .get("total");

    let week_expenses: f64 = sqlx::query(
        "SELECT COALESCE(SUM(amount), 0) AS total FROM expenses WHERE incurred_on >= $1",
    )
    .bind(week_ago)
    .fetch_one(&pool)
    .await?
    .get("total");

    let recent_sales = sqlx::query_as::<_, Sale>(
        "SELECT id, client_id, batch_id, product, quantity, unit_price, total, sold_on, \
         payment_method, payment_ref, created_at, updated_at \
         FROM sales ORDER BY sold_on DESC, created_at DESC LIMIT 5",
    )
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::success(json!({
        "clients": client_count,
        "active_batches": active_batches,
        "week": {
            "from": week_ago,
            "sales_total": week_sales,
            "expenses_total": week_expenses,
        },
        "recent_sales": recent_sales,
    })))
}
