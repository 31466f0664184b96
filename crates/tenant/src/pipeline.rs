// Request identity pipeline
// resolve -> extract -> establish context -> admit, strictly in order

use saas_models::{AuthenticatedPrincipal, DomainResolution};
use std::sync::Arc;

use crate::context::RequestTenantContext;
use crate::error::Result;
use crate::extractor::{IdentityExtractor, TenantSource};
use crate::guard::{Admission, AdmissionRequest, IsolationGuard, RoutePolicy};
use crate::resolver::DomainResolver;

/// Everything downstream handlers need to know about the request's tenant
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub context: Arc<RequestTenantContext>,
    pub resolution: DomainResolution,
    pub source: TenantSource,
    pub admission: Admission,
}

#[derive(Clone)]
pub struct TenantPipeline {
    resolver: DomainResolver,
    extractor: IdentityExtractor,
    guard: IsolationGuard,
}

impl TenantPipeline {
    pub fn new(resolver: DomainResolver) -> Self {
        Self {
            resolver,
            extractor: IdentityExtractor::new(),
            guard: IsolationGuard::new(),
        }
    }

    pub fn with_guard(mut self, guard: IsolationGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn resolver(&self) -> &DomainResolver {
        &self.resolver
    }

    pub fn guard(&self) -> &IsolationGuard {
        &self.guard
    }

    pub async fn run(
        &self,
        hostname: &str,
        principal: Option<&AuthenticatedPrincipal>,
        policy: &RoutePolicy,
    ) -> Result<PipelineOutcome> {
        let resolution = self.resolver.resolve(hostname).await;
        let identity = self.extractor.extract(principal, &resolution);

        let context = Arc::new(RequestTenantContext::new());
        context.set_context(
            identity.tenant_id,
            principal.map(|p| p.user_id),
            principal.map(|p| p.role),
        )?;

        let admission = self
            .guard
            .admit(AdmissionRequest {
                principal,
                tenant_id: identity.tenant_id,
                policy,
            })
            .await?;

        Ok(PipelineOutcome {
            context,
            resolution,
            source: identity.source,
            admission,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TenancyConfig;
    use crate::error::TenantError;
    use crate::test_support::tenant;
    use saas_database::{InMemoryStore, TenantScope};
    use saas_models::{ResolutionMethod, Role, TenantStatus};
    use uuid::Uuid;

    fn pipeline(store: Arc<InMemoryStore>) -> TenantPipeline {
        let config = TenancyConfig::default().with_base_domains(["platform.example"]);
        TenantPipeline::new(DomainResolver::new(store, &config))
    }

    fn principal(role: Role, tenant_id: Option<Uuid>) -> AuthenticatedPrincipal {
        AuthenticatedPrincipal {
            user_id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            role,
            tenant_id,
        }
    }

    #[tokio::test]
    async fn test_anonymous_subdomain_request() {
        let store = Arc::new(InMemoryStore::new());
        let acme = tenant("acme", None, TenantStatus::Active);
        store.insert_tenant(acme.clone());

        let outcome = pipeline(store)
            .run("acme.platform.example", None, &RoutePolicy::tenant_public())
            .await
            .unwrap();

        assert_eq!(outcome.resolution.method, ResolutionMethod::Subdomain);
        assert_eq!(outcome.source, TenantSource::Domain);
        assert_eq!(outcome.context.tenant_id(), Ok(acme.id));
        assert_eq!(outcome.admission.scope, Some(TenantScope::Tenant(acme.id)));
    }

    #[tokio::test]
    async fn test_custom_domain_with_token_for_other_tenant() {
        let store = Arc::new(InMemoryStore::new());
        let billing = tenant("billing", Some("billing.customer-owned.com"), TenantStatus::Active);
        store.insert_tenant(billing.clone());

        let token_tenant = Uuid::new_v4();
        let p = principal(Role::TenantStaff, Some(token_tenant));

        let outcome = pipeline(store)
            .run("billing.customer-owned.com", Some(&p), &RoutePolicy::tenant_scoped())
            .await
            .unwrap();

        assert_eq!(outcome.resolution.method, ResolutionMethod::CustomDomain);
        assert_eq!(outcome.resolution.tenant_id(), Some(billing.id));
        assert_eq!(outcome.source, TenantSource::Token);
        assert_eq!(outcome.context.tenant_id(), Ok(token_tenant));
        assert_eq!(outcome.context.user_id(), Some(p.user_id));
    }

    #[tokio::test]
    async fn test_admin_on_landlord_domain() {
        let store = Arc::new(InMemoryStore::new());
        let admin = principal(Role::PlatformSuperAdmin, None);

        let outcome = pipeline(store)
            .run("admin.platform.example", Some(&admin), &RoutePolicy::tenant_scoped())
            .await
            .unwrap();

        assert!(outcome.resolution.is_landlord());
        assert_eq!(outcome.admission.scope, Some(TenantScope::Platform));
        assert!(outcome.context.is_platform_super_admin());
        assert_eq!(outcome.context.tenant_id(), Err(TenantError::ContextNotEstablished));
    }

    #[tokio::test]
    async fn test_owner_without_tenant_on_landlord_domain() {
        let store = Arc::new(InMemoryStore::new());
        let owner = principal(Role::TenantOwner, None);

        let result = pipeline(store)
            .run("platform.example", Some(&owner), &RoutePolicy::tenant_scoped())
            .await;
        assert!(matches!(result, Err(TenantError::TenantRequired)));
    }

    #[tokio::test]
    async fn test_unauthenticated_on_scoped_route() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_tenant(tenant("acme", None, TenantStatus::Active));

        let result = pipeline(store)
            .run("acme.platform.example", None, &RoutePolicy::tenant_scoped())
            .await;
        assert!(matches!(result, Err(TenantError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_concurrent_requests_get_their_own_tenant() {
        let store = Arc::new(InMemoryStore::new());
        let mut tenants = Vec::new();
        for i in 0..16 {
            let t = tenant(&format!("shop-{}", i), None, TenantStatus::Active);
            store.insert_tenant(t.clone());
            tenants.push(t);
        }
        let pipeline = pipeline(store);

        let mut handles = Vec::new();
        for t in tenants.iter().cycle().take(128).cloned() {
            let pipeline = pipeline.clone();
            handles.push(tokio::spawn(async move {
                let host = format!("{}.platform.example", t.slug);
                let outcome = pipeline
                    .run(&host, None, &RoutePolicy::tenant_public())
                    .await
                    .unwrap();
                (t.id, outcome.context.tenant_id().unwrap())
            }));
        }

        for handle in handles {
            let (expected, seen) = handle.await.unwrap();
            assert_eq!(expected, seen);
        }
    }
}
