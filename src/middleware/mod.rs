pub mod auth;
pub mod permissions;
pub mod response;
pub mod validate_user;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use permissions::{check_permission, permission_middleware};
pub use response::{ApiResponse, ApiResult};
pub use validate_user::{require_auditor, require_manager, require_owner, require_staff, CurrentUser};
