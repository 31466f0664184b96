// Tenant resolution, request context and isolation
// Everything a request passes through before tenant-owned data is touched

pub mod config;
pub mod context;
pub mod error;
pub mod extractor;
pub mod guard;
pub mod lifecycle;
pub mod limits;
pub mod permissions;
pub mod pipeline;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::TenancyConfig;
pub use context::RequestTenantContext;
pub use error::{Result, TenantError};
pub use extractor::{ExtractedIdentity, IdentityExtractor, TenantSource};
pub use guard::{Admission, AdmissionRequest, IsolationGuard, RoutePolicy, TenantRequirement};
pub use lifecycle::TenantLifecycle;
pub use limits::{LimitOutcome, LimitedRoutes, PlanLimitEnforcer};
pub use permissions::{
    has_all_permissions, has_any_permission, has_permission, permissions_for, RolePermissions,
};
pub use pipeline::{PipelineOutcome, TenantPipeline};
pub use resolver::DomainResolver;
pub use saas_database::TenantScope;
