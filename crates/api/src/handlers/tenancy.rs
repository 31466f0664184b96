use crate::error::{api_error, tenant_error, ApiResult};
use crate::middleware::TenantDiagnostics;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use saas_models::{Permission, PlanLimitSnapshot, ResourceKind, Role};
use saas_tenant::{LimitOutcome, RequestTenantContext, TenantError, TenantScope};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Shows how the current request's hostname and token were interpreted
pub async fn resolve_info(
    Extension(diagnostics): Extension<TenantDiagnostics>,
) -> Json<TenantDiagnostics> {
    Json(diagnostics)
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub tenant_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub role: Option<Role>,
    pub permissions: Vec<Permission>,
    pub scope: Option<TenantScope>,
}

pub async fn current_context(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<Arc<RequestTenantContext>>,
) -> Json<ContextResponse> {
    let permissions = match ctx.role() {
        Some(role) => state.pipeline.guard().permissions().permissions_for(role).await,
        None => Vec::new(),
    };

    Json(ContextResponse {
        tenant_id: ctx.tenant_id_or_none(),
        user_id: ctx.user_id(),
        role: ctx.role(),
        permissions,
        scope: ctx.scope().ok(),
    })
}

/// Tenant the request acts for. Platform admins reach tenant routes without
/// one, but these handlers still need a concrete tenant.
fn acting_tenant(ctx: &RequestTenantContext) -> ApiResult<Uuid> {
    ctx.tenant_id_or_none()
        .ok_or_else(|| tenant_error(TenantError::TenantRequired))
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub tenant_id: Uuid,
    pub usage: Vec<PlanLimitSnapshot>,
}

pub async fn usage(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<Arc<RequestTenantContext>>,
) -> ApiResult<Json<UsageResponse>> {
    let tenant_id = acting_tenant(&ctx)?;
    let usage = state.limits.usage(tenant_id).await.map_err(tenant_error)?;

    Ok(Json(UsageResponse { tenant_id, usage }))
}

#[derive(Debug, Serialize)]
pub struct LimitCheckResponse {
    pub allowed: bool,
    pub resource: ResourceKind,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl From<LimitOutcome> for LimitCheckResponse {
    fn from(outcome: LimitOutcome) -> Self {
        let resource = outcome.resource();
        match outcome {
            LimitOutcome::WithinLimit(snapshot) => Self {
                allowed: true,
                resource,
                outcome: "within_limit",
                current: Some(snapshot.current),
                limit: snapshot.limit.max(),
            },
            LimitOutcome::Unlimited(_) => Self {
                allowed: true,
                resource,
                outcome: "unlimited",
                current: None,
                limit: None,
            },
            LimitOutcome::FailedOpen { .. } => Self {
                allowed: true,
                resource,
                outcome: "failed_open",
                current: None,
                limit: None,
            },
        }
    }
}

/// Preflight for services that create tenant resources outside this router
pub async fn check_limit(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<Arc<RequestTenantContext>>,
    Path(resource): Path<String>,
) -> ApiResult<Json<LimitCheckResponse>> {
    let kind: ResourceKind = resource.parse().map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "unknown_resource",
            &format!("Unknown resource '{}'", resource),
        )
    })?;
    let tenant_id = acting_tenant(&ctx)?;

    let outcome = state
        .limits
        .check_limit(tenant_id, kind)
        .await
        .map_err(tenant_error)?;

    Ok(Json(outcome.into()))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub slug: Option<String>,
    pub domain: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_available: Option<bool>,
}

/// Whether a slug or custom domain can still be claimed
pub async fn availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<AvailabilityResponse>> {
    if query.slug.is_none() && query.domain.is_none() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "missing_query",
            "Provide a slug or domain to check",
        ));
    }

    let resolver = state.pipeline.resolver();

    let slug_available = match query.slug.as_deref() {
        Some(slug) if !saas_models::is_valid_slug(slug) => Some(false),
        Some(slug) => Some(resolver.is_slug_available(slug).await.map_err(tenant_error)?),
        None => None,
    };

    let domain_available = match query.domain.as_deref().map(str::trim) {
        Some("") => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "invalid_domain",
                "Domain must not be empty",
            ))
        }
        Some(domain) => Some(
            resolver
                .is_domain_available(domain)
                .await
                .map_err(tenant_error)?,
        ),
        None => None,
    };

    Ok(Json(AvailabilityResponse {
        slug_available,
        domain_available,
    }))
}
