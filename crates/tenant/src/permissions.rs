//! Role to permission grants.
//!
//! The built-in map below is always available. `RolePermissions` checks the
//! runtime role store first and falls back to it when the store has no
//! active override or cannot be read.

use saas_database::RoleStore;
use saas_models::{Permission, Role};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

lazy_static::lazy_static! {
    static ref ROLE_PERMISSIONS: HashMap<Role, HashSet<Permission>> = {
        use Permission::*;

        let mut map = HashMap::new();
        map.insert(Role::PlatformSuperAdmin, Permission::ALL.into_iter().collect());
        map.insert(
            Role::TenantOwner,
            HashSet::from([
                ManageTenantWebsite,
                ManageTenantProducts,
                ManageTenantOrders,
                ManageTenantUsers,
                ManageTenantDomains,
                ManageTenantBilling,
                ViewTenantAnalytics,
                CrmRead,
                CrmWrite,
                ViewCatalog,
            ]),
        );
        map.insert(
            Role::TenantStaff,
            HashSet::from([
                ManageTenantProducts,
                ManageTenantOrders,
                ViewTenantAnalytics,
                CrmRead,
                CrmWrite,
                ViewCatalog,
            ]),
        );
        map.insert(Role::Customer, HashSet::from([ViewCatalog, PlaceOrders]));
        map
    };
}

/// Built-in permissions granted to `role`, sorted for stable output
pub fn permissions_for(role: Role) -> Vec<Permission> {
    let mut permissions: Vec<Permission> = ROLE_PERMISSIONS
        .get(&role)
        .map(|set| set.iter().copied().collect())
        .unwrap_or_default();
    permissions.sort();
    permissions
}

pub fn has_permission(role: Role, permission: Permission) -> bool {
    role.is_platform_super_admin()
        || ROLE_PERMISSIONS
            .get(&role)
            .is_some_and(|set| set.contains(&permission))
}

pub fn has_any_permission(role: Role, permissions: &[Permission]) -> bool {
    permissions.iter().any(|p| has_permission(role, *p))
}

pub fn has_all_permissions(role: Role, permissions: &[Permission]) -> bool {
    permissions.iter().all(|p| has_permission(role, *p))
}

/// Permission lookup honoring runtime role overrides
#[derive(Clone, Default)]
pub struct RolePermissions {
    store: Option<Arc<dyn RoleStore>>,
}

impl RolePermissions {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Built-in grants only
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Effective permissions of `role`. The platform super admin always
    /// holds every permission, whatever the store says.
    pub async fn permissions_for(&self, role: Role) -> Vec<Permission> {
        if role.is_platform_super_admin() {
            return permissions_for(role);
        }

        if let Some(store) = &self.store {
            match store.find_active(role.as_str()).await {
                Ok(Some(runtime)) => return runtime.granted_permissions(),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        role = %role,
                        error = %e,
                        "Runtime role lookup failed, using built-in permissions"
                    );
                }
            }
        }

        permissions_for(role)
    }

    pub async fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.permissions_for(role).await.contains(&permission)
    }

    pub async fn has_any_permission(&self, role: Role, permissions: &[Permission]) -> bool {
        let granted = self.permissions_for(role).await;
        permissions.iter().any(|p| granted.contains(p))
    }

    pub async fn has_all_permissions(&self, role: Role, permissions: &[Permission]) -> bool {
        let granted = self.permissions_for(role).await;
        permissions.iter().all(|p| granted.contains(p))
    }
}
