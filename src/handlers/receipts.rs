use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::receipt_parser::{parse_receipt_text, ParsedReceipt};

#[derive(Debug, Deserialize)]
pub struct ParseReceiptRequest {
    /// OCR output of a UPI payment receipt screenshot
    pub text: String,
}

/// POST /api/receipts/parse - structure the OCR text of a payment receipt
pub async fn parse(Json(body): Json<ParseReceiptRequest>) -> ApiResult<ParsedReceipt> {
    if body.text.trim().is_empty() {
        return Err(ApiError::bad_request("Receipt text is required"));
    }

    let parsed = parse_receipt_text(&body.text)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    Ok(ApiResponse::success(parsed))
}
