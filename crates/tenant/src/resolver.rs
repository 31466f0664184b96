//! Hostname to tenant resolution.
//!
//! Resolution order, first match wins:
//! 1. landlord: a base domain, or a reserved prefix on a base domain
//! 2. custom domain: exact match on an ACTIVE or TRIAL tenant's domain
//! 3. subdomain: `<slug>.<base domain>` on an ACTIVE or TRIAL tenant
//! 4. not found
//!
//! The resolver never fails. Directory errors are logged and reported as
//! `not-found` so the request can continue without a domain tenant.

use saas_database::TenantDirectory;
use saas_models::{
    normalize_hostname, DomainResolution, ResolutionMethod, TenantStatus, SLUG_REGEX,
};
use std::sync::Arc;

use crate::config::TenancyConfig;
use crate::error::Result;

const ALL_STATUSES: [TenantStatus; 4] = [
    TenantStatus::Active,
    TenantStatus::Trial,
    TenantStatus::Suspended,
    TenantStatus::Cancelled,
];

#[derive(Clone)]
pub struct DomainResolver {
    directory: Arc<dyn TenantDirectory>,
    base_domains: Vec<String>,
    landlord_prefixes: Vec<String>,
}

impl DomainResolver {
    pub fn new(directory: Arc<dyn TenantDirectory>, config: &TenancyConfig) -> Self {
        tracing::info!(
            base_domains = ?config.base_domains,
            "Domain resolver initialized"
        );
        Self {
            directory,
            base_domains: config.base_domains.clone(),
            landlord_prefixes: config.landlord_prefixes.clone(),
        }
    }

    pub async fn resolve(&self, raw_hostname: &str) -> DomainResolution {
        let hostname = normalize_hostname(raw_hostname);
        if hostname.is_empty() {
            tracing::warn!("Request has no hostname, skipping domain resolution");
            return DomainResolution::not_found(hostname);
        }

        tracing::debug!(hostname = %hostname, "Resolving tenant");

        if self.is_landlord(&hostname) {
            tracing::debug!(hostname = %hostname, "Landlord domain");
            return DomainResolution::landlord(hostname);
        }

        match self.lookup(&hostname).await {
            Ok(Some(resolution)) => {
                tracing::info!(
                    hostname = %hostname,
                    tenant_id = ?resolution.tenant_id(),
                    method = %resolution.method,
                    "Resolved tenant from hostname"
                );
                resolution
            }
            Ok(None) => {
                tracing::warn!(hostname = %hostname, "Could not resolve tenant for hostname");
                DomainResolution::not_found(hostname)
            }
            Err(e) => {
                tracing::warn!(
                    hostname = %hostname,
                    error = %e,
                    "Tenant directory unavailable, continuing without domain tenant"
                );
                DomainResolution::not_found(hostname)
            }
        }
    }

    async fn lookup(&self, hostname: &str) -> Result<Option<DomainResolution>> {
        if let Some(tenant) = self
            .directory
            .find_by_domain(hostname, &TenantStatus::RESOLVABLE)
            .await?
        {
            return Ok(Some(DomainResolution::matched(
                tenant,
                ResolutionMethod::CustomDomain,
                hostname,
            )));
        }

        let Some(slug) = self.subdomain_slug(hostname) else {
            return Ok(None);
        };

        let tenant = self
            .directory
            .find_by_slug(slug, &TenantStatus::RESOLVABLE)
            .await?;

        Ok(tenant.map(|t| DomainResolution::matched(t, ResolutionMethod::Subdomain, hostname)))
    }

    /// Exact base domain, or a reserved prefix directly on a base domain.
    pub fn is_landlord(&self, hostname: &str) -> bool {
        self.base_domains.iter().any(|base| {
            hostname == base
                || self.landlord_prefixes.iter().any(|prefix| {
                    hostname
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest == base)
                })
        })
    }

    /// Left-most label under the first base domain it belongs to. Labels
    /// containing dots never qualify, so `evil.acme.<base>` yields nothing.
    pub fn subdomain_slug<'a>(&self, hostname: &'a str) -> Option<&'a str> {
        self.base_domains.iter().find_map(|base| {
            hostname
                .strip_suffix(base.as_str())
                .and_then(|rest| rest.strip_suffix('.'))
                .filter(|slug| !slug.is_empty() && SLUG_REGEX.is_match(slug))
        })
    }

    /// Whether no tenant, in any status, holds this slug.
    pub async fn is_slug_available(&self, slug: &str) -> Result<bool> {
        let existing = self.directory.find_by_slug(slug, &ALL_STATUSES).await?;
        Ok(existing.is_none())
    }

    /// Whether no tenant, in any status, holds this custom domain.
    pub async fn is_domain_available(&self, domain: &str) -> Result<bool> {
        let existing = self
            .directory
            .find_by_domain(&normalize_hostname(domain), &ALL_STATUSES)
            .await?;
        Ok(existing.is_none())
    }
}
