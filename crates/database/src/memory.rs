use async_trait::async_trait;
use saas_models::{Permission, Plan, ResourceKind, RuntimeRole, Subscription, Tenant, TenantStatus};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::repositories::{
    permission_names, ResourceCounter, RoleStore, SubscriptionStore, TenantDirectory,
    TenantStatusWriter,
};
use crate::scope::TenantScope;

#[derive(Default)]
struct Inner {
    tenants: HashMap<Uuid, Tenant>,
    plans: HashMap<Uuid, Plan>,
    subscriptions: Vec<Subscription>,
    counts: HashMap<(Uuid, ResourceKind), u64>,
    roles: BTreeMap<String, RuntimeRole>,
}

/// Process-local store backing every repository trait.
///
/// Used by tests and local demos. `set_unavailable(true)` makes every call
/// fail the way a lost database connection would.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_tenant(&self, mut tenant: Tenant) {
        tenant.domain = tenant.domain.map(|d| d.to_ascii_lowercase());
        self.write().tenants.insert(tenant.id, tenant);
    }

    pub fn insert_plan(&self, plan: Plan) {
        self.write().plans.insert(plan.id, plan);
    }

    pub fn insert_subscription(&self, subscription: Subscription) {
        self.write().subscriptions.push(subscription);
    }

    pub fn set_count(&self, tenant_id: Uuid, kind: ResourceKind, count: u64) {
        self.write().counts.insert((tenant_id, kind), count);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Other("store unavailable".to_string()));
        }
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TenantDirectory for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>> {
        self.check_available()?;
        Ok(self.read().tenants.get(&id).cloned())
    }

    async fn find_by_domain(
        &self,
        domain: &str,
        statuses: &[TenantStatus],
    ) -> Result<Option<Tenant>> {
        self.check_available()?;
        Ok(self
            .read()
            .tenants
            .values()
            .find(|t| t.domain.as_deref() == Some(domain) && statuses.contains(&t.status))
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str, statuses: &[TenantStatus]) -> Result<Option<Tenant>> {
        self.check_available()?;
        Ok(self
            .read()
            .tenants
            .values()
            .find(|t| t.slug == slug && statuses.contains(&t.status))
            .cloned())
    }
}

#[async_trait]
impl TenantStatusWriter for InMemoryStore {
    async fn set_status(&self, id: Uuid, status: TenantStatus) -> Result<Tenant> {
        self.check_available()?;
        let mut inner = self.write();
        let tenant = inner
            .tenants
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found("Tenant", &id.to_string()))?;
        tenant.status = status;
        tenant.updated_at = chrono::Utc::now();
        Ok(tenant.clone())
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn find_active_by_tenant(&self, tenant_id: Uuid) -> Result<Option<Subscription>> {
        self.check_available()?;
        Ok(self
            .read()
            .subscriptions
            .iter()
            .filter(|s| s.tenant_id == tenant_id && s.is_active_or_trial())
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn find_plan(&self, plan_id: Uuid) -> Result<Option<Plan>> {
        self.check_available()?;
        Ok(self.read().plans.get(&plan_id).cloned())
    }
}

#[async_trait]
impl ResourceCounter for InMemoryStore {
    async fn count(&self, scope: &TenantScope, kind: ResourceKind) -> Result<u64> {
        self.check_available()?;
        Ok(self
            .read()
            .counts
            .iter()
            .filter(|((owner, k), _)| *k == kind && scope.permits(*owner))
            .map(|(_, count)| *count)
            .sum())
    }
}

#[async_trait]
impl RoleStore for InMemoryStore {
    async fn find_active(&self, name: &str) -> Result<Option<RuntimeRole>> {
        self.check_available()?;
        Ok(self.read().roles.get(name).filter(|r| r.is_active).cloned())
    }

    async fn list_active(&self) -> Result<Vec<RuntimeRole>> {
        self.check_available()?;
        Ok(self
            .read()
            .roles
            .values()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }

    async fn upsert(
        &self,
        name: &str,
        permissions: &[Permission],
        description: Option<&str>,
    ) -> Result<RuntimeRole> {
        self.check_available()?;
        let now = chrono::Utc::now();
        let mut inner = self.write();
        let role = inner
            .roles
            .entry(name.to_string())
            .and_modify(|role| {
                role.permissions = permission_names(permissions);
                role.description = description.map(str::to_string);
                role.is_active = true;
                role.updated_at = now;
            })
            .or_insert_with(|| RuntimeRole {
                id: Uuid::new_v4(),
                name: name.to_string(),
                permissions: permission_names(permissions),
                description: description.map(str::to_string),
                is_active: true,
                created_at: now,
                updated_at: now,
            });
        Ok(role.clone())
    }

    async fn deactivate(&self, name: &str) -> Result<()> {
        self.check_available()?;
        if let Some(role) = self.write().roles.get_mut(name) {
            role.is_active = false;
            role.updated_at = chrono::Utc::now();
        }
        Ok(())
    }
}
