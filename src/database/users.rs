use sqlx::PgPool;
use uuid::Uuid;

use super::models::User;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, is_active, created_at, updated_at";

/// Authoritative read used by the role resolver on every authorized request
pub async fn fetch_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

    sqlx::query_as::<_, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    let query = format!("SELECT {} FROM users ORDER BY name", USER_COLUMNS);

    sqlx::query_as::<_, User>(&query).fetch_all(pool).await
}

pub async fn insert(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: &str,
) -> Result<User, sqlx::Error> {
    let query = format!(
        "INSERT INTO users (id, name, email, password_hash, role, is_active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, true, now(), now()) RETURNING {}",
        USER_COLUMNS
    );

    sqlx::query_as::<_, User>(&query)
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(pool)
        .await
}
