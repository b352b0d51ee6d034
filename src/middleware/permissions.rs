use axum::{extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::database::models::Role;
use crate::error::AuthError;

use super::auth::AuthUser;
use super::validate_user::CurrentUser;

/// Static role → permission-set table, fixed at startup. Owner covers
/// everything a manager or auditor can do; manager covers the staff set.
pub static ROLE_PERMISSIONS: Lazy<HashMap<Role, HashSet<&'static str>>> = Lazy::new(|| {
    let staff: HashSet<&'static str> = [
        "view_dashboard",
        "manage_batches",
        "record_sales",
        "record_expenses",
    ]
    .into_iter()
    .collect();

    let auditor: HashSet<&'static str> = [
        "view_dashboard",
        "view_reports",
        "view_sales",
        "view_expenses",
        "export_data",
    ]
    .into_iter()
    .collect();

    let mut manager = staff.clone();
    manager.extend(["manage_clients", "manage_sales", "manage_expenses", "view_reports"]);

    let mut owner = manager.clone();
    owner.extend(auditor.iter().copied());
    owner.extend(["manage_users", "manage_settings"]);

    HashMap::from([
        (Role::Owner, owner),
        (Role::Manager, manager),
        (Role::Staff, staff),
        (Role::Auditor, auditor),
    ])
});

/// Decide whether `role_name` grants `permission`. Pure lookup against the
/// static table; deliberately no persistence re-read, so within a token's
/// lifetime the role may be staler than what the role resolver would see.
pub fn check_permission(role_name: &str, permission: &str) -> Result<(), AuthError> {
    let set = role_name
        .parse::<Role>()
        .ok()
        .and_then(|role| ROLE_PERMISSIONS.get(&role))
        .ok_or_else(|| {
            tracing::warn!("Permission check for unknown role '{}'", role_name);
            AuthError::role_unknown(format!("Role '{}' has no permission set", role_name))
        })?;

    if !set.contains(permission) {
        return Err(AuthError::permission_denied(format!(
            "Missing required permission '{}'",
            permission
        )));
    }

    Ok(())
}

/// Permission checker middleware. Reads the role from request context: the
/// freshly resolved user when the role resolver ran earlier in the chain,
/// otherwise the verified token claim.
pub async fn permission_middleware(
    request: Request,
    next: Next,
    permission: &'static str,
) -> Result<Response, AuthError> {
    let role = if let Some(current) = request.extensions().get::<CurrentUser>() {
        current.role.clone()
    } else if let Some(auth_user) = request.extensions().get::<AuthUser>() {
        auth_user.role.clone()
    } else {
        tracing::error!("Permission check reached without an authentication stage in the chain");
        return Err(AuthError::internal("Authentication required before permission checks"));
    };

    check_permission(&role, permission)?;

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(role: Role) -> &'static HashSet<&'static str> {
        ROLE_PERMISSIONS.get(&role).unwrap()
    }

    #[test]
    fn every_role_has_an_entry() {
        for role in Role::ALL {
            assert!(ROLE_PERMISSIONS.contains_key(&role), "missing {}", role);
        }
    }

    #[test]
    fn owner_set_covers_manager_and_auditor() {
        assert!(set(Role::Manager).is_subset(set(Role::Owner)));
        assert!(set(Role::Auditor).is_subset(set(Role::Owner)));
    }

    #[test]
    fn manager_set_covers_staff() {
        assert!(set(Role::Staff).is_subset(set(Role::Manager)));
    }

    #[test]
    fn permission_grid_matches_table_membership() {
        for role in Role::ALL {
            for permission in ["view_dashboard", "manage_sales", "manage_users", "export_data"] {
                let expected = set(role).contains(permission);
                assert_eq!(
                    check_permission(role.as_str(), permission).is_ok(),
                    expected,
                    "role {} permission {}",
                    role,
                    permission
                );
            }
        }
    }

    #[test]
    fn auditor_cannot_manage_sales() {
        let err = check_permission("auditor", "manage_sales").unwrap_err();
        assert_eq!(err.error_code(), "PERMISSION_DENIED");
        assert_eq!(err.status_code(), 403);
        assert!(err.message().contains("manage_sales"));
    }

    #[test]
    fn staff_can_record_but_not_manage_sales() {
        assert!(check_permission("staff", "record_sales").is_ok());
        assert!(check_permission("staff", "manage_sales").is_err());
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = check_permission("superadmin", "view_dashboard").unwrap_err();
        assert_eq!(err.error_code(), "ROLE_UNKNOWN");
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn repeated_checks_are_idempotent() {
        let first = check_permission("manager", "manage_clients").is_ok();
        let second = check_permission("manager", "manage_clients").is_ok();
        assert!(first && second);
    }
}
