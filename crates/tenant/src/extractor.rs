// Effective tenant selection
// Combines the token's tenant claim with the hostname resolution

use saas_models::{AuthenticatedPrincipal, DomainResolution};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the effective tenant id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantSource {
    Token,
    Domain,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedIdentity {
    pub tenant_id: Option<Uuid>,
    pub source: TenantSource,
}

#[derive(Debug, Clone, Default)]
pub struct IdentityExtractor;

impl IdentityExtractor {
    pub fn new() -> Self {
        Self
    }

    /// The token's tenant always wins over the hostname's.
    pub fn extract_tenant_id(
        &self,
        principal: Option<&AuthenticatedPrincipal>,
        resolution: &DomainResolution,
    ) -> Option<Uuid> {
        self.extract(principal, resolution).tenant_id
    }

    pub fn extract(
        &self,
        principal: Option<&AuthenticatedPrincipal>,
        resolution: &DomainResolution,
    ) -> ExtractedIdentity {
        let domain_tenant = if resolution.resolves_tenant() {
            resolution.tenant_id()
        } else {
            None
        };

        if let Some(token_tenant) = principal.and_then(|p| p.tenant_id) {
            if let Some(domain_tenant) = domain_tenant.filter(|id| *id != token_tenant) {
                tracing::debug!(
                    token_tenant = %token_tenant,
                    domain_tenant = %domain_tenant,
                    hostname = %resolution.hostname,
                    "Token tenant differs from domain tenant, using token tenant"
                );
            }
            return ExtractedIdentity {
                tenant_id: Some(token_tenant),
                source: TenantSource::Token,
            };
        }

        match domain_tenant {
            Some(id) => ExtractedIdentity {
                tenant_id: Some(id),
                source: TenantSource::Domain,
            },
            None => ExtractedIdentity {
                tenant_id: None,
                source: TenantSource::None,
            },
        }
    }
}
