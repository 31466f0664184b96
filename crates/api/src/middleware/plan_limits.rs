use crate::error::{tenant_error, ApiResult};
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use saas_tenant::RequestTenantContext;
use std::sync::Arc;

/// Reject creation requests that would exceed the tenant's plan.
///
/// Must run after `tenant_context`. Requests without a tenant pass through.
pub async fn enforce_plan_limits(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let Some(kind) = state
        .limited_routes
        .match_route(request.method().as_str(), request.uri().path())
    else {
        return Ok(next.run(request).await);
    };

    let tenant_id = request
        .extensions()
        .get::<Arc<RequestTenantContext>>()
        .and_then(|ctx| ctx.tenant_id_or_none());

    let Some(tenant_id) = tenant_id else {
        tracing::debug!(resource = %kind, "No tenant in context, skipping plan limits");
        return Ok(next.run(request).await);
    };

    state
        .limits
        .check_limit(tenant_id, kind)
        .await
        .map_err(tenant_error)?;

    Ok(next.run(request).await)
}
