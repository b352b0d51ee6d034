use axum::extract::{Path, Query};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::Sale;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

const SALE_COLUMNS: &str = "id, client_id, batch_id, product, quantity, unit_price, total, \
                            sold_on, payment_method, payment_ref, created_at, updated_at";

const PAYMENT_METHODS: &[&str] = &["cash", "upi", "credit"];

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub client_id: Option<Uuid>,
    pub batch_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SaleInput {
    pub client_id: Option<Uuid>,
    pub batch_id: Option<Uuid>,
    pub product: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub sold_on: NaiveDate,
    pub payment_method: String,
    pub payment_ref: Option<String>,
}

fn validate(input: &SaleInput) -> Result<(), ApiError> {
    if input.product.trim().is_empty() {
        return Err(ApiError::bad_request("Product is required"));
    }
    if input.quantity <= 0.0 {
        return Err(ApiError::bad_request("Quantity must be greater than zero"));
    }
    if input.unit_price < 0.0 {
        return Err(ApiError::bad_request("Unit price cannot be negative"));
    }
    if !PAYMENT_METHODS.contains(&input.payment_method.as_str()) {
        return Err(ApiError::bad_request(format!(
            "Payment method must be one of: {}",
            PAYMENT_METHODS.join(", ")
        )));
    }
    Ok(())
}

/// GET /api/sales - optionally filtered by client, batch and date range
pub async fn list(Query(query): Query<ListQuery>) -> ApiResult<Vec<Sale>> {
    let pool = DatabaseManager::pool().await?;

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM sales WHERE 1=1", SALE_COLUMNS));

    if let Some(client_id) = query.client_id {
        builder.push(" AND client_id = ").push_bind(client_id);
    }
    if let Some(batch_id) = query.batch_id {
        builder.push(" AND batch_id = ").push_bind(batch_id);
    }
    if let Some(from) = query.from {
        builder.push(" AND sold_on >= ").push_bind(from);
    }
    if let Some(to) = query.to {
        builder.push(" AND sold_on <= ").push_bind(to);
    }
    builder.push(" ORDER BY sold_on DESC, created_at DESC");

    let sales = builder.build_query_as::<Sale>().fetch_all(&pool).await?;

    Ok(ApiResponse::success(sales))
}

/// POST /api/sales
pub async fn create(Json(input): Json<SaleInput>) -> ApiResult<Sale> {
    validate(&input)?;
    let pool = DatabaseManager::pool().await?;

    let total = input.quantity * input.unit_price;

    let sql = format!(
        "INSERT INTO sales (id, client_id, batch_id, product, quantity, unit_price, total, \
         sold_on, payment_method, payment_ref, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now(), now()) RETURNING {}",
        SALE_COLUMNS
    );

    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(Uuid::new_v4())
        .bind(input.client_id)
        .bind(input.batch_id)
        .bind(input.product.trim())
        .bind(input.quantity)
        .bind(input.unit_price)
        .bind(total)
        .bind(input.sold_on)
        .bind(&input.payment_method)
        .bind(&input.payment_ref)
        .fetch_one(&pool)
        .await?;

    Ok(ApiResponse::created(sale))
}

/// GET /api/sales/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Sale> {
    let pool = DatabaseManager::pool().await?;

    let sql = format!("SELECT {} FROM sales WHERE id = $1", SALE_COLUMNS);
    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale not found"))?;

    Ok(ApiResponse::success(sale))
}

/// PUT /api/sales/:id
pub async fn update(Path(id): Path<Uuid>, Json(input): Json<SaleInput>) -> ApiResult<Sale> {
    validate(&input)?;
    let pool = DatabaseManager::pool().await?;

    let total = input.quantity * input.unit_price;

    let sql = format!(
        "UPDATE sales SET client_id = $2, batch_id = $3, product = $4, quantity = $5, \
         unit_price = $6, total = $7, sold_on = $8, payment_method = $9, payment_ref = $10, \
         updated_at = now() WHERE id = $1 RETURNING {}",
        SALE_COLUMNS
    );

    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .bind(input.client_id)
        .bind(input.batch_id)
        .bind(input.product.trim())
        .bind(input.quantity)
        .bind(input.unit_price)
        .bind(total)
        .bind(input.sold_on)
        .bind(&input.payment_method)
        .bind(&input.payment_ref)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale not found"))?;

    Ok(ApiResponse::success(sale))
}

/// DELETE /api/sales/:id
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM sales WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Sale not found"));
    }

    Ok(ApiResponse::<()>::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> SaleInput {
        SaleInput {
            client_id: None,
            batch_id: None,
            product: "eggs".to_string(),
            quantity: 30.0,
            unit_price: 6.5,
            sold_on: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            payment_method: "upi".to_string(),
            payment_ref: Some("221456789012".to_string()),
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(validate(&sample_input()).is_ok());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut input = sample_input();
        input.quantity = 0.0;
        assert!(validate(&input).is_err());
    }

    #[test]
    fn unknown_payment_method_is_rejected() {
        let mut input = sample_input();
        input.payment_method = "barter".to_string();
        assert!(validate(&input).is_err());
    }
}
