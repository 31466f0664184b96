// Per-request tenant context
// One instance per request, written once by the pipeline, read by handlers

use saas_database::TenantScope;
use saas_models::Role;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::error::{Result, TenantError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContextValues {
    tenant_id: Option<Uuid>,
    user_id: Option<Uuid>,
    role: Option<Role>,
}

/// Identity of the tenant, user and role a request acts for.
///
/// Never shared between requests; wrap it in an `Arc` to pass it along one
/// request's handlers.
#[derive(Debug, Default)]
pub struct RequestTenantContext {
    values: OnceLock<ContextValues>,
}

impl RequestTenantContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish the context. Fails if it was already set for this request;
    /// the first value is kept.
    pub fn set_context(
        &self,
        tenant_id: Option<Uuid>,
        user_id: Option<Uuid>,
        role: Option<Role>,
    ) -> Result<()> {
        self.values
            .set(ContextValues {
                tenant_id,
                user_id,
                role,
            })
            .map_err(|_| {
                tracing::error!("Attempted to set tenant context twice in one request");
                TenantError::ContextAlreadyEstablished
            })
    }

    pub fn is_established(&self) -> bool {
        self.values.get().is_some()
    }

    /// Tenant id of the request. Reading before the context is set, or when
    /// no tenant applies, is an error.
    pub fn tenant_id(&self) -> Result<Uuid> {
        self.tenant_id_or_none()
            .ok_or(TenantError::ContextNotEstablished)
    }

    pub fn tenant_id_or_none(&self) -> Option<Uuid> {
        self.values.get().and_then(|v| v.tenant_id)
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.values.get().and_then(|v| v.user_id)
    }

    pub fn role(&self) -> Option<Role> {
        self.values.get().and_then(|v| v.role)
    }

    pub fn is_platform_super_admin(&self) -> bool {
        self.role().is_some_and(|r| r.is_platform_super_admin())
    }

    /// Row filter for this request's repository queries.
    pub fn scope(&self) -> Result<TenantScope> {
        if self.is_platform_super_admin() {
            return Ok(TenantScope::Platform);
        }
        self.tenant_id().map(TenantScope::Tenant)
    }
}
