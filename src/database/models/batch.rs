use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Batch {
    pub id: Uuid,
    pub name: String,
    /// What the batch rears or produces, e.g. "broiler", "layer"
    pub product: String,
    pub started_on: NaiveDate,
    pub initial_count: i32,
    pub current_count: i32,
    /// "active" or "closed"
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
