use saas_auth::JwtService;
use saas_database::{
    Database, ResourceCounter, RoleStore, SubscriptionStore, TenantDirectory, TenantStatusWriter,
};
use saas_tenant::{
    DomainResolver, IsolationGuard, LimitedRoutes, PlanLimitEnforcer, TenancyConfig,
    TenantLifecycle, TenantPipeline,
};
use std::sync::Arc;

pub struct AppState {
    pub jwt: JwtService,
    pub pipeline: TenantPipeline,
    pub limits: PlanLimitEnforcer,
    pub limited_routes: LimitedRoutes,
    pub lifecycle: TenantLifecycle,
}

impl AppState {
    pub fn from_parts(
        jwt: JwtService,
        tenancy: &TenancyConfig,
        directory: Arc<dyn TenantDirectory>,
        status_writer: Arc<dyn TenantStatusWriter>,
        subscriptions: Arc<dyn SubscriptionStore>,
        counter: Arc<dyn ResourceCounter>,
        roles: Arc<dyn RoleStore>,
    ) -> Self {
        let pipeline = TenantPipeline::new(DomainResolver::new(directory.clone(), tenancy))
            .with_guard(IsolationGuard::with_role_store(roles));

        Self {
            jwt,
            pipeline,
            limits: PlanLimitEnforcer::new(subscriptions, counter),
            limited_routes: tenancy.limited_routes.clone(),
            lifecycle: TenantLifecycle::new(directory, status_writer),
        }
    }

    /// Postgres-backed repositories sharing one pool
    pub fn from_database(jwt: JwtService, tenancy: &TenancyConfig, database: &Database) -> Self {
        let tenants = Arc::new(database.tenant_directory());

        Self::from_parts(
            jwt,
            tenancy,
            tenants.clone(),
            tenants,
            Arc::new(database.subscription_store()),
            Arc::new(database.resource_counter()),
            Arc::new(database.role_store()),
        )
    }

    /// One store implementing every repository, e.g. `InMemoryStore`
    pub fn with_store<S>(jwt: JwtService, tenancy: &TenancyConfig, store: Arc<S>) -> Self
    where
        S: TenantDirectory
            + TenantStatusWriter
            + SubscriptionStore
            + ResourceCounter
            + RoleStore
            + 'static,
    {
        Self::from_parts(
            jwt,
            tenancy,
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
        )
    }
}
