use crate::handlers;
use crate::middleware::{self, TenantGuardState};
use crate::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post, MethodRouter},
    Router,
};
use saas_models::{Permission, Role};
use saas_tenant::RoutePolicy;
use std::sync::Arc;

/// Run the tenant guard with `policy` before `route`'s handler
fn guarded(
    route: MethodRouter<Arc<AppState>>,
    state: &Arc<AppState>,
    policy: RoutePolicy,
) -> MethodRouter<Arc<AppState>> {
    route.layer(from_fn_with_state(
        TenantGuardState::new(state.clone(), policy),
        middleware::tenant_context,
    ))
}

/// Put tenant-owned routes behind the tenant guard and plan limits.
///
/// `routes` must contain at least one route.
pub fn protect_resources(
    routes: Router<Arc<AppState>>,
    state: &Arc<AppState>,
    policy: RoutePolicy,
) -> Router<Arc<AppState>> {
    routes
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::enforce_plan_limits,
        ))
        .route_layer(from_fn_with_state(
            TenantGuardState::new(state.clone(), policy),
            middleware::tenant_context,
        ))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    create_router_with(state, Router::new())
}

/// Built-in routes plus the host application's own `resources`
pub fn create_router_with(state: Arc<AppState>, resources: Router<Arc<AppState>>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Tenancy diagnostics
        .route(
            "/api/tenancy/resolve",
            guarded(get(handlers::tenancy::resolve_info), &state, RoutePolicy::public()),
        )
        .route(
            "/api/tenancy/availability",
            get(handlers::tenancy::availability),
        )
        // Tenant-scoped
        .route(
            "/api/tenancy/context",
            guarded(
                get(handlers::tenancy::current_context),
                &state,
                RoutePolicy::tenant_scoped(),
            ),
        )
        .route(
            "/api/tenancy/usage",
            guarded(
                get(handlers::tenancy::usage),
                &state,
                RoutePolicy::tenant_scoped().require(Permission::ViewTenantAnalytics),
            ),
        )
        .route(
            "/api/tenancy/limits/:resource/check",
            guarded(
                post(handlers::tenancy::check_limit),
                &state,
                RoutePolicy::tenant_scoped(),
            ),
        )
        // Platform administration
        .route(
            "/api/platform/tenants/:tenant_id/status",
            guarded(
                patch(handlers::platform::change_tenant_status),
                &state,
                RoutePolicy::authenticated()
                    .require_role(Role::PlatformSuperAdmin)
                    .require(Permission::ManageTenants),
            ),
        )
        .merge(resources)
        .layer(from_fn_with_state(state.clone(), middleware::authenticate))
        .with_state(state)
}
