pub mod resources;
pub mod roles;
pub mod subscriptions;
pub mod tenants;

use async_trait::async_trait;
use saas_models::{Permission, Plan, ResourceKind, RuntimeRole, Subscription, Tenant, TenantStatus};
use uuid::Uuid;

use crate::error::Result;
use crate::scope::TenantScope;

/// Read-only tenant lookups used during hostname resolution
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>>;

    /// `domain` must already be normalized.
    async fn find_by_domain(&self, domain: &str, statuses: &[TenantStatus])
        -> Result<Option<Tenant>>;

    async fn find_by_slug(&self, slug: &str, statuses: &[TenantStatus]) -> Result<Option<Tenant>>;
}

/// The only tenant mutation: moving between lifecycle statuses
#[async_trait]
pub trait TenantStatusWriter: Send + Sync {
    async fn set_status(&self, id: Uuid, status: TenantStatus) -> Result<Tenant>;
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Most recent subscription in `ACTIVE` or `TRIAL` status.
    async fn find_active_by_tenant(&self, tenant_id: Uuid) -> Result<Option<Subscription>>;

    async fn find_plan(&self, plan_id: Uuid) -> Result<Option<Plan>>;
}

/// Counts tenant-owned records. Implementations must apply `scope`.
#[async_trait]
pub trait ResourceCounter: Send + Sync {
    async fn count(&self, scope: &TenantScope, kind: ResourceKind) -> Result<u64>;
}

/// Runtime role definitions that take precedence over built-in grants
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_active(&self, name: &str) -> Result<Option<RuntimeRole>>;

    async fn list_active(&self) -> Result<Vec<RuntimeRole>>;

    /// Create or replace the role named `name` and mark it active.
    async fn upsert(
        &self,
        name: &str,
        permissions: &[Permission],
        description: Option<&str>,
    ) -> Result<RuntimeRole>;

    async fn deactivate(&self, name: &str) -> Result<()>;
}

pub(crate) fn status_names(statuses: &[TenantStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

pub(crate) fn permission_names(permissions: &[Permission]) -> Vec<String> {
    permissions.iter().map(|p| p.as_str().to_string()).collect()
}
