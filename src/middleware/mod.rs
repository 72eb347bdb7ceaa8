pub mod auth;
pub mod fallback;
pub mod ownership;
pub mod response;

pub use auth::{resolve_principal, AuthHeader, Principal, PrincipalKind};
pub use ownership::{authorize, check_owner, require_kind};
pub use response::{ApiResponse, ApiResult};
