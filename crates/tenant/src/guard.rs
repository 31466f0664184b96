//! Route admission.
//!
//! Checks run in a fixed order and the first failure is final:
//! authentication, platform admin bypass, tenant presence, role, permissions.

use saas_database::{RoleStore, TenantScope};
use saas_models::{AuthenticatedPrincipal, Permission, Role};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Result, TenantError};
use crate::permissions::RolePermissions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantRequirement {
    Required,
    Optional,
}

/// What a route demands of its callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    pub requires_authentication: bool,
    pub tenant: TenantRequirement,
    /// Any one of these roles is enough. Empty means every role.
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl RoutePolicy {
    /// Anyone, with or without a tenant
    pub fn public() -> Self {
        Self {
            requires_authentication: false,
            tenant: TenantRequirement::Optional,
            roles: Vec::new(),
            permissions: Vec::new(),
        }
    }

    /// Anonymous callers allowed, but a tenant must be known
    pub fn tenant_public() -> Self {
        Self {
            requires_authentication: false,
            tenant: TenantRequirement::Required,
            roles: Vec::new(),
            permissions: Vec::new(),
        }
    }

    /// Authenticated callers acting within a tenant
    pub fn tenant_scoped() -> Self {
        Self {
            requires_authentication: true,
            tenant: TenantRequirement::Required,
            roles: Vec::new(),
            permissions: Vec::new(),
        }
    }

    /// Authenticated callers, tenant optional
    pub fn authenticated() -> Self {
        Self {
            requires_authentication: true,
            tenant: TenantRequirement::Optional,
            roles: Vec::new(),
            permissions: Vec::new(),
        }
    }

    pub fn require(mut self, permission: Permission) -> Self {
        if !self.permissions.contains(&permission) {
            self.permissions.push(permission);
        }
        self
    }

    pub fn require_role(mut self, role: Role) -> Self {
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
        self
    }
}

pub struct AdmissionRequest<'a> {
    pub principal: Option<&'a AuthenticatedPrincipal>,
    pub tenant_id: Option<Uuid>,
    pub policy: &'a RoutePolicy,
}

/// Proof that a request may proceed, with the filter its queries must use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub tenant_id: Option<Uuid>,
    pub scope: Option<TenantScope>,
}

#[derive(Clone, Default)]
pub struct IsolationGuard {
    permissions: RolePermissions,
}

impl IsolationGuard {
    /// Guard using the built-in permission map only
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role_store(store: Arc<dyn RoleStore>) -> Self {
        Self {
            permissions: RolePermissions::new(store),
        }
    }

    pub fn permissions(&self) -> &RolePermissions {
        &self.permissions
    }

    pub async fn admit(&self, request: AdmissionRequest<'_>) -> Result<Admission> {
        let AdmissionRequest {
            principal,
            tenant_id,
            policy,
        } = request;

        if principal.is_none() && policy.requires_authentication {
            return Err(TenantError::Unauthenticated);
        }

        if principal.is_some_and(|p| p.is_platform_super_admin()) {
            return Ok(Admission {
                tenant_id,
                scope: Some(TenantScope::Platform),
            });
        }

        if policy.tenant == TenantRequirement::Required && tenant_id.is_none() {
            return Err(TenantError::TenantRequired);
        }

        if !policy.roles.is_empty() {
            let Some(principal) = principal else {
                return Err(TenantError::Unauthenticated);
            };
            if !policy.roles.contains(&principal.role) {
                tracing::debug!(
                    user_id = %principal.user_id,
                    role = %principal.role,
                    "Role not allowed on route"
                );
                return Err(TenantError::RoleNotAllowed(principal.role));
            }
        }

        if !policy.permissions.is_empty() {
            let Some(principal) = principal else {
                return Err(TenantError::Unauthenticated);
            };
            let granted = self.permissions.permissions_for(principal.role).await;
            if let Some(missing) = policy
                .permissions
                .iter()
                .copied()
                .find(|p| !granted.contains(p))
            {
                tracing::debug!(
                    user_id = %principal.user_id,
                    role = %principal.role,
                    permission = %missing,
                    "Permission denied"
                );
                return Err(TenantError::Forbidden(missing));
            }
        }

        Ok(Admission {
            tenant_id,
            scope: tenant_id.map(TenantScope::Tenant),
        })
    }
}
