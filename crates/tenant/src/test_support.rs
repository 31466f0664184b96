use async_trait::async_trait;
use chrono::Utc;
use saas_database::{
    DatabaseError, ResourceCounter, RoleStore, SubscriptionStore, TenantDirectory, TenantScope,
};
use saas_models::{
    Permission, Plan, ResourceKind, RuntimeRole, Subscription, SubscriptionStatus, Tenant,
    TenantStatus,
};
use uuid::Uuid;

pub fn tenant(slug: &str, domain: Option<&str>, status: TenantStatus) -> Tenant {
    Tenant {
        id: Uuid::new_v4(),
        name: slug.to_string(),
        slug: slug.to_string(),
        domain: domain.map(str::to_string),
        status,
        plan_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn plan(limits: serde_json::Value) -> Plan {
    Plan {
        id: Uuid::new_v4(),
        slug: "starter".to_string(),
        name: "Starter".to_string(),
        limits,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn subscription(tenant_id: Uuid, plan_id: Uuid, status: SubscriptionStatus) -> Subscription {
    Subscription {
        id: Uuid::new_v4(),
        tenant_id,
        plan_id,
        status,
        trial_ends_at: None,
        current_period_end: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Store whose every call fails like a dropped connection
pub struct BrokenStore;

fn broken() -> DatabaseError {
    DatabaseError::Other("connection reset".to_string())
}

#[async_trait]
impl TenantDirectory for BrokenStore {
    async fn find_by_id(&self, _id: Uuid) -> saas_database::Result<Option<Tenant>> {
        Err(broken())
    }

    async fn find_by_domain(
        &self,
        _domain: &str,
        _statuses: &[TenantStatus],
    ) -> saas_database::Result<Option<Tenant>> {
        Err(broken())
    }

    async fn find_by_slug(
        &self,
        _slug: &str,
        _statuses: &[TenantStatus],
    ) -> saas_database::Result<Option<Tenant>> {
        Err(broken())
    }
}

#[async_trait]
impl SubscriptionStore for BrokenStore {
    async fn find_active_by_tenant(
        &self,
        _tenant_id: Uuid,
    ) -> saas_database::Result<Option<Subscription>> {
        Err(broken())
    }

    async fn find_plan(&self, _plan_id: Uuid) -> saas_database::Result<Option<Plan>> {
        Err(broken())
    }
}

#[async_trait]
impl ResourceCounter for BrokenStore {
    async fn count(&self, _scope: &TenantScope, _kind: ResourceKind) -> saas_database::Result<u64> {
        Err(broken())
    }
}

#[async_trait]
impl RoleStore for BrokenStore {
    async fn find_active(&self, _name: &str) -> saas_database::Result<Option<RuntimeRole>> {
        Err(broken())
    }

    async fn list_active(&self) -> saas_database::Result<Vec<RuntimeRole>> {
        Err(broken())
    }

    async fn upsert(
        &self,
        _name: &str,
        _permissions: &[Permission],
        _description: Option<&str>,
    ) -> saas_database::Result<RuntimeRole> {
        Err(broken())
    }

    async fn deactivate(&self, _name: &str) -> saas_database::Result<()> {
        Err(broken())
    }
}
