use crate::error::{tenant_error, ApiResult};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use saas_models::{AuthenticatedPrincipal, ResolutionMethod};
use saas_tenant::{PipelineOutcome, RoutePolicy, TenantSource};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// State for one route's tenant check: the app plus that route's policy
#[derive(Clone)]
pub struct TenantGuardState {
    pub app: Arc<AppState>,
    pub policy: Arc<RoutePolicy>,
}

impl TenantGuardState {
    pub fn new(app: Arc<AppState>, policy: RoutePolicy) -> Self {
        Self {
            app,
            policy: Arc::new(policy),
        }
    }
}

/// How the request's tenant was determined
#[derive(Debug, Clone, Serialize)]
pub struct TenantDiagnostics {
    pub hostname: String,
    pub resolution_method: ResolutionMethod,
    pub domain_tenant_id: Option<Uuid>,
    pub domain_tenant_slug: Option<String>,
    pub token_tenant_id: Option<Uuid>,
    pub final_tenant_id: Option<Uuid>,
    pub source: TenantSource,
    pub is_landlord: bool,
}

impl TenantDiagnostics {
    fn new(outcome: &PipelineOutcome, principal: Option<&AuthenticatedPrincipal>) -> Self {
        Self {
            hostname: outcome.resolution.hostname.clone(),
            resolution_method: outcome.resolution.method,
            domain_tenant_id: outcome.resolution.tenant_id(),
            domain_tenant_slug: outcome.resolution.tenant_slug().map(str::to_string),
            token_tenant_id: principal.and_then(|p| p.tenant_id),
            final_tenant_id: outcome.admission.tenant_id,
            source: outcome.source,
            is_landlord: outcome.resolution.is_landlord(),
        }
    }
}

/// Host header, then the URI authority, then `localhost`
fn request_hostname(request: &Request) -> String {
    request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_else(|| "localhost".to_string())
}

/// Resolve, establish and admit the request's tenant for the route's policy
pub async fn tenant_context(
    State(guard): State<TenantGuardState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let hostname = request_hostname(&request);
    let principal = request.extensions().get::<AuthenticatedPrincipal>().cloned();

    let outcome = guard
        .app
        .pipeline
        .run(&hostname, principal.as_ref(), &guard.policy)
        .await
        .map_err(|e| {
            tracing::debug!(hostname = %hostname, error = %e, "Request rejected by tenant guard");
            tenant_error(e)
        })?;

    let diagnostics = TenantDiagnostics::new(&outcome, principal.as_ref());
    let extensions = request.extensions_mut();
    extensions.insert(diagnostics);
    extensions.insert(outcome.admission);
    extensions.insert(outcome.resolution);
    extensions.insert(outcome.context);

    Ok(next.run(request).await)
}
