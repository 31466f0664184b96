pub mod auth;
pub mod plan_limits;
pub mod tenant;

pub use auth::{authenticate, extract_bearer_token};
pub use plan_limits::enforce_plan_limits;
pub use tenant::{tenant_context, TenantDiagnostics, TenantGuardState};
