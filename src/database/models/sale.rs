use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Sale {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub batch_id: Option<Uuid>,
    pub product: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Server-computed quantity * unit_price, stored for reporting
    pub total: f64,
    pub sold_on: NaiveDate,
    /// "cash", "upi" or "credit"
    pub payment_method: String,
    /// UPI UTR or similar external reference, when one exists
    pub payment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
