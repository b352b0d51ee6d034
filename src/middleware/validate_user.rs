use axum::{extract::Request, middleware::Next, response::Response};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::models::{Role, User};
use crate::database::{manager::DatabaseManager, users};
use crate::error::AuthError;

use super::auth::AuthUser;

/// Freshly loaded user record, injected after a successful role check. Token
/// claims can go stale mid-session (a demotion, a deactivation), so every
/// role-gated request re-reads the persisted record and downstream handlers
/// see this instead of the claim.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Route-group allow-lists. Owner passes every gate.
pub mod allow {
    use crate::database::models::Role;

    pub const OWNER_ONLY: &[Role] = &[Role::Owner];
    pub const OWNER_OR_MANAGER: &[Role] = &[Role::Owner, Role::Manager];
    pub const OPERATIONS: &[Role] = &[Role::Owner, Role::Manager, Role::Staff];
    pub const OWNER_OR_AUDITOR: &[Role] = &[Role::Owner, Role::Auditor];
}

pub async fn require_owner(request: Request, next: Next) -> Result<Response, AuthError> {
    resolve_user(request, next, allow::OWNER_ONLY).await
}

pub async fn require_manager(request: Request, next: Next) -> Result<Response, AuthError> {
    resolve_user(request, next, allow::OWNER_OR_MANAGER).await
}

pub async fn require_staff(request: Request, next: Next) -> Result<Response, AuthError> {
    resolve_user(request, next, allow::OPERATIONS).await
}

pub async fn require_auditor(request: Request, next: Next) -> Result<Response, AuthError> {
    resolve_user(request, next, allow::OWNER_OR_AUDITOR).await
}

/// Role resolver middleware: re-fetches the user named by the verified claim
/// and gates on the route's allow-list. The single awaited query here is the
/// only suspension point in the guard chain; a failed read surfaces
/// immediately, no retries.
async fn resolve_user(
    mut request: Request,
    next: Next,
    allowed: &'static [Role],
) -> Result<Response, AuthError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| {
            tracing::error!("Role check reached without token verification in the chain");
            AuthError::internal("Authentication required before role checks")
        })?;

    let pool = DatabaseManager::pool().await.map_err(|e| {
        tracing::error!("Database unavailable while resolving user {}: {}", auth_user.user_id, e);
        AuthError::internal("Failed to load user account")
    })?;

    let user = users::fetch_by_id(&pool, auth_user.user_id).await.map_err(|e| {
        tracing::error!("Query error while resolving user {}: {}", auth_user.user_id, e);
        AuthError::internal("Failed to load user account")
    })?;

    let current = authorize_user(user.as_ref(), allowed)?.clone();

    tracing::debug!("Resolved user {} ({}) for roles {:?}", current.name, current.role, allowed);

    request.extensions_mut().insert(CurrentUser::from(current));

    Ok(next.run(request).await)
}

/// Pure authorization decision over the fetched record and the allow-list.
/// Checks run in a fixed order: existence, active status, role membership.
fn authorize_user<'a>(user: Option<&'a User>, allowed: &[Role]) -> Result<&'a User, AuthError> {
    let user = user.ok_or_else(|| {
        AuthError::user_not_found("No account exists for the authenticated user")
    })?;

    if !user.is_active {
        tracing::warn!("Rejected deactivated account '{}'", user.email);
        return Err(AuthError::account_deactivated("This account has been deactivated"));
    }

    let permitted = user
        .role
        .parse::<Role>()
        .map(|role| allowed.contains(&role))
        .unwrap_or(false);

    if !permitted {
        let allowed_names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
        tracing::warn!(
            "Role '{}' not permitted for route requiring one of {:?}",
            user.role,
            allowed_names
        );
        return Err(AuthError::role_not_permitted(format!(
            "Access requires one of roles [{}], but your role is '{}'",
            allowed_names.join(", "),
            user.role
        )));
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with(role: &str, is_active: bool) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "test".to_string(),
            email: "test@farm.example".to_string(),
            password_hash: String::new(),
            role: role.to_string(),
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn missing_record_is_user_not_found() {
        let err = authorize_user(None, allow::OWNER_ONLY).unwrap_err();
        assert_eq!(err.error_code(), "USER_NOT_FOUND");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn deactivated_account_is_rejected_for_every_role() {
        for role in Role::ALL {
            let user = user_with(role.as_str(), false);
            let err = authorize_user(Some(&user), allow::OPERATIONS).unwrap_err();
            assert_eq!(err.error_code(), "ACCOUNT_DEACTIVATED", "role {}", role);
            assert_eq!(err.status_code(), 403);
        }
    }

    #[test]
    fn allow_list_grid_matches_membership() {
        // All four fixed configurations against all four roles
        let configurations: [(&[Role], [bool; 4]); 4] = [
            // permitted for [owner, manager, staff, auditor]
            (allow::OWNER_ONLY, [true, false, false, false]),
            (allow::OWNER_OR_MANAGER, [true, true, false, false]),
            (allow::OPERATIONS, [true, true, true, false]),
            (allow::OWNER_OR_AUDITOR, [true, false, false, true]),
        ];

        for (allowed, expectations) in configurations {
            for (role, expected) in Role::ALL.iter().zip(expectations) {
                let user = user_with(role.as_str(), true);
                let decision = authorize_user(Some(&user), allowed);
                assert_eq!(
                    decision.is_ok(),
                    expected,
                    "role {} against allow-list {:?}",
                    role,
                    allowed
                );
            }
        }
    }

    #[test]
    fn rejection_names_allowed_roles_and_actual_role() {
        let user = user_with("staff", true);
        let err = authorize_user(Some(&user), allow::OWNER_OR_MANAGER).unwrap_err();
        assert_eq!(err.error_code(), "ROLE_NOT_PERMITTED");
        let message = err.message().to_string();
        assert!(message.contains("owner"));
        assert!(message.contains("manager"));
        assert!(message.contains("staff"));
    }

    #[test]
    fn unparseable_stored_role_is_not_permitted() {
        let user = user_with("superadmin", true);
        let err = authorize_user(Some(&user), allow::OPERATIONS).unwrap_err();
        assert_eq!(err.error_code(), "ROLE_NOT_PERMITTED");
    }

    #[test]
    fn same_inputs_give_same_decision() {
        // Authorization is a pure function of record state and allow-list
        let user = user_with("auditor", true);
        let first = authorize_user(Some(&user), allow::OWNER_OR_AUDITOR).is_ok();
        let second = authorize_user(Some(&user), allow::OWNER_OR_AUDITOR).is_ok();
        assert!(first && second);

        let first = authorize_user(Some(&user), allow::OPERATIONS).is_ok();
        let second = authorize_user(Some(&user), allow::OPERATIONS).is_ok();
        assert_eq!(first, second);
        assert!(!first);
    }
}
