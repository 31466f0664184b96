use crate::error::{tenant_error, ApiResult};
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use saas_models::{Tenant, TenantStatusChange};
use std::sync::Arc;
use uuid::Uuid;

/// Move a tenant to another lifecycle status (platform admins only)
pub async fn change_tenant_status(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<Uuid>,
    Json(change): Json<TenantStatusChange>,
) -> ApiResult<Json<Tenant>> {
    let tenant = state
        .lifecycle
        .change_status(tenant_id, change)
        .await
        .map_err(tenant_error)?;

    Ok(Json(tenant))
}
