use async_trait::async_trait;
use saas_models::{Tenant, TenantStatus};
use sqlx::PgPool;
use uuid::Uuid;

use super::{status_names, TenantDirectory, TenantStatusWriter};
use crate::error::{DatabaseError, Result};

const TENANT_COLUMNS: &str =
    "id, name, slug, domain, status, plan_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgTenantDirectory {
    pool: PgPool,
}

impl PgTenantDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantDirectory for PgTenantDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants WHERE id = $1",
            TENANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn find_by_domain(
        &self,
        domain: &str,
        statuses: &[TenantStatus],
    ) -> Result<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants WHERE LOWER(domain) = $1 AND status = ANY($2)",
            TENANT_COLUMNS
        ))
        .bind(domain)
        .bind(status_names(statuses))
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn find_by_slug(&self, slug: &str, statuses: &[TenantStatus]) -> Result<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {} FROM tenants WHERE slug = $1 AND status = ANY($2)",
            TENANT_COLUMNS
        ))
        .bind(slug)
        .bind(status_names(statuses))
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }
}

#[async_trait]
impl TenantStatusWriter for PgTenantDirectory {
    async fn set_status(&self, id: Uuid, status: TenantStatus) -> Result<Tenant> {
        sqlx::query_as::<_, Tenant>(&format!(
            "UPDATE tenants SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            TENANT_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Tenant", &id.to_string()))
    }
}
