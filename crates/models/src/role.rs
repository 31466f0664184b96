use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ModelError;

/// Platform-wide roles carried in access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    PlatformSuperAdmin,
    TenantOwner,
    TenantStaff,
    Customer,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::PlatformSuperAdmin,
        Role::TenantOwner,
        Role::TenantStaff,
        Role::Customer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlatformSuperAdmin => "PLATFORM_SUPER_ADMIN",
            Self::TenantOwner => "TENANT_OWNER",
            Self::TenantStaff => "TENANT_STAFF",
            Self::Customer => "CUSTOMER",
        }
    }

    pub fn is_platform_super_admin(&self) -> bool {
        matches!(self, Self::PlatformSuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownRole(s.to_string()))
    }
}

/// Fine-grained capabilities granted to roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    // Platform
    ManageTenants,
    ManagePlatformBilling,
    ManagePlatformThemes,

    // Tenant administration
    ManageTenantWebsite,
    ManageTenantProducts,
    ManageTenantOrders,
    ManageTenantUsers,
    ManageTenantDomains,
    ManageTenantBilling,
    ViewTenantAnalytics,

    // CRM
    CrmRead,
    CrmWrite,

    // Storefront
    ViewCatalog,
    PlaceOrders,
}

impl Permission {
    pub const ALL: [Permission; 14] = [
        Permission::ManageTenants,
        Permission::ManagePlatformBilling,
        Permission::ManagePlatformThemes,
        Permission::ManageTenantWebsite,
        Permission::ManageTenantProducts,
        Permission::ManageTenantOrders,
        Permission::ManageTenantUsers,
        Permission::ManageTenantDomains,
        Permission::ManageTenantBilling,
        Permission::ViewTenantAnalytics,
        Permission::CrmRead,
        Permission::CrmWrite,
        Permission::ViewCatalog,
        Permission::PlaceOrders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManageTenants => "MANAGE_TENANTS",
            Self::ManagePlatformBilling => "MANAGE_PLATFORM_BILLING",
            Self::ManagePlatformThemes => "MANAGE_PLATFORM_THEMES",
            Self::ManageTenantWebsite => "MANAGE_TENANT_WEBSITE",
            Self::ManageTenantProducts => "MANAGE_TENANT_PRODUCTS",
            Self::ManageTenantOrders => "MANAGE_TENANT_ORDERS",
            Self::ManageTenantUsers => "MANAGE_TENANT_USERS",
            Self::ManageTenantDomains => "MANAGE_TENANT_DOMAINS",
            Self::ManageTenantBilling => "MANAGE_TENANT_BILLING",
            Self::ViewTenantAnalytics => "VIEW_TENANT_ANALYTICS",
            Self::CrmRead => "CRM_READ",
            Self::CrmWrite => "CRM_WRITE",
            Self::ViewCatalog => "VIEW_CATALOG",
            Self::PlaceOrders => "PLACE_ORDERS",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownPermission(s.to_string()))
    }
}

/// Permission set stored at runtime, overriding the built-in grants of the
/// role with the same name while active.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct RuntimeRole {
    pub id: Uuid,
    pub name: String,
    pub permissions: Vec<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RuntimeRole {
    /// Stored permission names that this build knows about, sorted.
    /// Unknown names are dropped.
    pub fn granted_permissions(&self) -> Vec<Permission> {
        let mut granted: Vec<Permission> = self
            .permissions
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();
        granted.sort();
        granted.dedup();
        granted
    }
}
