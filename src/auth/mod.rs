use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config;
use crate::database::models::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id the role resolver re-reads on every request
    pub sub: Uuid,
    pub name: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &User) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user.id,
            name: user.name.clone(),
            role: user.role.clone(),
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum TokenError {
    Generation(String),
    InvalidSecret,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Generation(msg) => write!(f, "token generation error: {}", msg),
            TokenError::InvalidSecret => write!(f, "JWT secret is not configured"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Sign claims with the configured secret.
pub fn issue_token(user: &User) -> Result<String, TokenError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    encode_token(&Claims::new(user), secret).map_err(|e| TokenError::Generation(e.to_string()))
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Salted SHA-256 digest, hex encoded. Salt comes from config so that dumps
/// of the users table are not directly rainbow-table friendly.
pub fn hash_password(password: &str) -> String {
    digest_password(password, &config::config().security.password_salt)
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password) == stored_hash
}

fn digest_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const SECRET: &str = "unit-test-secret";

    fn claims_expiring_in(seconds: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: Uuid::new_v4(),
            name: "asha".to_string(),
            role: "manager".to_string(),
            exp: now + seconds,
            iat: now,
        }
    }

    #[test]
    fn round_trip_preserves_claims() {
        let claims = claims_expiring_in(3600);
        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.name, "asha");
        assert_eq!(decoded.role, "manager");
    }

    #[test]
    fn expired_token_is_rejected() {
        // Default validation has 60s leeway; expire well past it
        let claims = claims_expiring_in(-3600);
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_token(&claims_expiring_in(3600), SECRET).unwrap();
        assert!(decode_token(&token, "a-different-secret").is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(decode_token("not.a.jwt", SECRET).is_err());
        assert!(decode_token("", SECRET).is_err());
    }

    #[test]
    fn password_digest_is_stable_and_salted() {
        let a = digest_password("hunter2", "salt-a");
        let b = digest_password("hunter2", "salt-a");
        let c = digest_password("hunter2", "salt-b");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
