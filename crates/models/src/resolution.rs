use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tenant::Tenant;

/// How a hostname was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMethod {
    Subdomain,
    CustomDomain,
    Landlord,
    NotFound,
}

impl ResolutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subdomain => "subdomain",
            Self::CustomDomain => "custom-domain",
            Self::Landlord => "landlord",
            Self::NotFound => "not-found",
        }
    }
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of mapping one request's hostname to a tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainResolution {
    pub tenant: Option<Tenant>,
    pub method: ResolutionMethod,
    pub hostname: String,
}

impl DomainResolution {
    pub fn landlord(hostname: impl Into<String>) -> Self {
        Self {
            tenant: None,
            method: ResolutionMethod::Landlord,
            hostname: hostname.into(),
        }
    }

    pub fn not_found(hostname: impl Into<String>) -> Self {
        Self {
            tenant: None,
            method: ResolutionMethod::NotFound,
            hostname: hostname.into(),
        }
    }

    pub fn matched(tenant: Tenant, method: ResolutionMethod, hostname: impl Into<String>) -> Self {
        Self {
            tenant: Some(tenant),
            method,
            hostname: hostname.into(),
        }
    }

    /// True only when a tenant was found by subdomain or custom domain.
    pub fn resolves_tenant(&self) -> bool {
        matches!(
            self.method,
            ResolutionMethod::Subdomain | ResolutionMethod::CustomDomain
        ) && self.tenant.is_some()
    }

    pub fn is_landlord(&self) -> bool {
        self.method == ResolutionMethod::Landlord
    }

    pub fn tenant_id(&self) -> Option<Uuid> {
        self.tenant.as_ref().map(|t| t.id)
    }

    pub fn tenant_slug(&self) -> Option<&str> {
        self.tenant.as_ref().map(|t| t.slug.as_str())
    }
}
