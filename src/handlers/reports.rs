use axum::extract::Query;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{PgPool, Row};

use crate::database::manager::DatabaseManager;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// GET /api/reports/summary - period totals with per-product and per-category
/// breakdowns. Defaults to the trailing 30 days.
pub async fn summary(Query(query): Query<ReportQuery>) -> ApiResult<Value> {
    let to = query.to.unwrap_or_else(|| Utc::now().date_naive());
    let from = query.from.unwrap_or(to - Duration::days(30));

    let pool = DatabaseManager::pool().await?;

    let sales_row = sqlx::query(
        "SELECT COALESCE(SUM(total), 0) AS total, COUNT(*) AS count \
         FROM sales WHERE sold_on BETWEEN $1 AND $2",
    )
    .bind(from)
    .bind(to)
    .fetch_one(&pool)
    .await?;
    let sales_total: f64 = sales_row.get("total");
    let sales_count: i64 = sales_row.get("count");

    let expense_row = sqlx::query(
        "SELECT COALESCE(SUM(amount), 0) AS total, COUNT(*) AS count \
         FROM expenses WHERE incurred_on BETWEEN $1 AND $2",
    )
    .bind(from)
    .bind(to)
    .fetch_one(&pool)
    .await?;
    let expense_total: f64 = expense_row.get("total");
    let expense_count: i64 = expense_row.get("count");

    let sales_by_product = sales_breakdown(&pool, from, to).await?;
    let expenses_by_category = expense_breakdown(&pool, from, to).await?;

    Ok(ApiResponse::success(json!({
        "period": { "from": from, "to": to },
        "sales": {
            "total": sales_total,
            "count": sales_count,
            "by_product": sales_by_product,
        },
        "expenses": {
            "total": expense_total,
            "count": expense_count,
            "by_category": expenses_by_category,
        },
        "net": sales_total - expense_total,
    })))
}

async fn sales_breakdown(pool: &PgPool, from: NaiveDate, to: NaiveDate) -> Result<Vec<Value>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT product, COALESCE(SUM(quantity), 0) AS quantity, COALESCE(SUM(total), 0) AS amount \
         FROM sales WHERE sold_on BETWEEN $1 AND $2 GROUP BY product ORDER BY amount DESC",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            json!({
                "product": row.get::<String, _>("product"),
                "quantity": row.get::<f64, _>("quantity"),
                "amount": row.get::<f64, _>("amount"),
            })
        })
        .collect())
}

async fn expense_breakdown(pool: &PgPool, from: NaiveDate, to: NaiveDate) -> Result<Vec<Value>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT category, COALESCE(SUM(amount), 0) AS amount \
         FROM expenses WHERE incurred_on BETWEEN $1 AND $2 GROUP BY category ORDER BY amount DESC",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            json!({
                "category": row.get::<String, _>("category"),
                "amount": row.get::<f64, _>("amount"),
            })
        })
        .collect())
}
