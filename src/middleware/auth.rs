use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{decode_token, Claims};
use crate::config;
use crate::error::AuthError;

/// Authenticated user context extracted from JWT claims. This is the token's
/// view of the user; the role resolver replaces it with the persisted record
/// before any role-gated handler runs.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            role: claims.role,
        }
    }
}

/// Token verifier middleware: gates on the protected-API feature flag,
/// validates the bearer token and injects the decoded claim context.
///
/// Rejections never touch the database.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !config::config().security.protected_api_enabled {
        return Err(AuthError::feature_disabled(
            "The protected API is currently disabled",
        ));
    }

    let token = extract_bearer_token(&headers)?;
    let claims = verify_token(&token)?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| AuthError::unauthenticated("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::unauthenticated("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err(AuthError::unauthenticated("Empty bearer token")),
        None => Err(AuthError::unauthenticated(
            "Authorization header must use Bearer token format",
        )),
    }
}

/// Validate the token signature and expiry against the configured secret
fn verify_token(token: &str) -> Result<Claims, AuthError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        tracing::error!("JWT_SECRET is not configured; rejecting all tokens");
        return Err(AuthError::internal("Authentication is not configured"));
    }

    decode_token(token, secret)
        .map_err(|e| AuthError::invalid_token(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_unauthenticated() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.error_code(), "UNAUTHENTICATED");
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn non_bearer_scheme_is_unauthenticated() {
        let err = extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")).unwrap_err();
        assert_eq!(err.error_code(), "UNAUTHENTICATED");
    }

    #[test]
    fn empty_bearer_token_is_unauthenticated() {
        let err = extract_bearer_token(&headers_with("Bearer   ")).unwrap_err();
        assert_eq!(err.error_code(), "UNAUTHENTICATED");
    }

    #[test]
    fn well_formed_bearer_token_is_extracted() {
        let token = extract_bearer_token(&headers_with("Bearer abc.def.ghi")).unwrap();
        assert_eq!(token, "abc.def.ghi");
    }
}
