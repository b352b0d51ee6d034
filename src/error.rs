// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        match err {
            crate::database::manager::DatabaseError::ConfigMissing(name) => {
                tracing::error!("Database configuration missing: {}", name);
                ApiError::service_unavailable("Database is not configured")
            }
            crate::database::manager::DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return a generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return ApiError::conflict("A record with these values already exists");
            }
        }
        tracing::error!("Query error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

/// Authorization-chain error. Every variant is terminal for the current
/// request: the guard chain short-circuits and the handler is never invoked.
#[derive(Debug)]
pub enum AuthError {
    // 403 - guarded feature switched off in configuration
    FeatureDisabled(String),

    // 401 - no credential presented
    Unauthenticated(String),

    // 400 - credential presented but failed signature/expiry verification
    InvalidToken(String),

    // 404 - claimed user id has no persisted record
    UserNotFound(String),

    // 403 - persisted record exists but is_active is false
    AccountDeactivated(String),

    // 403 - role is not in the route's allow-list
    RoleNotPermitted(String),

    // 403 - role has no entry in the permission table
    RoleUnknown(String),

    // 403 - role's permission set lacks the required permission
    PermissionDenied(String),

    // 500 - unexpected failure; detail is logged, never surfaced
    InternalError(String),
}

impl AuthError {
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::FeatureDisabled(_) => 403,
            AuthError::Unauthenticated(_) => 401,
            AuthError::InvalidToken(_) => 400,
            AuthError::UserNotFound(_) => 404,
            AuthError::AccountDeactivated(_) => 403,
            AuthError::RoleNotPermitted(_) => 403,
            AuthError::RoleUnknown(_) => 403,
            AuthError::PermissionDenied(_) => 403,
            AuthError::InternalError(_) => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AuthError::FeatureDisabled(msg) => msg,
            AuthError::Unauthenticated(msg) => msg,
            AuthError::InvalidToken(msg) => msg,
            AuthError::UserNotFound(msg) => msg,
            AuthError::AccountDeactivated(msg) => msg,
            AuthError::RoleNotPermitted(msg) => msg,
            AuthError::RoleUnknown(msg) => msg,
            AuthError::PermissionDenied(msg) => msg,
            AuthError::InternalError(msg) => msg,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::FeatureDisabled(_) => "FEATURE_DISABLED",
            AuthError::Unauthenticated(_) => "UNAUTHENTICATED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::UserNotFound(_) => "USER_NOT_FOUND",
            AuthError::AccountDeactivated(_) => "ACCOUNT_DEACTIVATED",
            AuthError::RoleNotPermitted(_) => "ROLE_NOT_PERMITTED",
            AuthError::RoleUnknown(_) => "ROLE_UNKNOWN",
            AuthError::PermissionDenied(_) => "PERMISSION_DENIED",
            AuthError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

impl AuthError {
    pub fn feature_disabled(message: impl Into<String>) -> Self {
        AuthError::FeatureDisabled(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        AuthError::Unauthenticated(message.into())
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        AuthError::InvalidToken(message.into())
    }

    pub fn user_not_found(message: impl Into<String>) -> Self {
        AuthError::UserNotFound(message.into())
    }

    pub fn account_deactivated(message: impl Into<String>) -> Self {
        AuthError::AccountDeactivated(message.into())
    }

    pub fn role_not_permitted(message: impl Into<String>) -> Self {
        AuthError::RoleNotPermitted(message.into())
    }

    pub fn role_unknown(message: impl Into<String>) -> Self {
        AuthError::RoleUnknown(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        AuthError::PermissionDenied(message.into())
    }

    /// Internal failures surface a generic message; callers log the detail.
    pub fn internal(message: impl Into<String>) -> Self {
        AuthError::InternalError(message.into())
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_status_mapping() {
        assert_eq!(AuthError::feature_disabled("off").status_code(), 403);
        assert_eq!(AuthError::unauthenticated("no token").status_code(), 401);
        assert_eq!(AuthError::invalid_token("bad").status_code(), 400);
        assert_eq!(AuthError::user_not_found("gone").status_code(), 404);
        assert_eq!(AuthError::account_deactivated("off").status_code(), 403);
        assert_eq!(AuthError::role_not_permitted("no").status_code(), 403);
        assert_eq!(AuthError::role_unknown("what").status_code(), 403);
        assert_eq!(AuthError::permission_denied("no").status_code(), 403);
        assert_eq!(AuthError::internal("boom").status_code(), 500);
    }

    #[test]
    fn auth_error_body_carries_message_and_code() {
        let body = AuthError::permission_denied("Missing required permission 'manage_sales'").to_json();
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "PERMISSION_DENIED");
        assert!(body["message"].as_str().unwrap().contains("manage_sales"));
    }

    #[test]
    fn internal_error_uses_caller_supplied_generic_message() {
        // Call sites log the real failure and pass a generic string; the
        // response body must not grow extra detail on its way out.
        let body = AuthError::internal("Failed to load user account").to_json();
        assert_eq!(body["message"], "Failed to load user account");
        assert_eq!(body["code"], "INTERNAL_ERROR");
    }

    #[test]
    fn api_error_status_mapping() {
        assert_eq!(ApiError::bad_request("x").status_code(), 400);
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::conflict("x").status_code(), 409);
        assert_eq!(ApiError::service_unavailable("x").status_code(), 503);
    }
}
