use async_trait::async_trait;
use saas_models::ResourceKind;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::ResourceCounter;
use crate::error::Result;
use crate::scope::TenantScope;

/// Counts rows in each resource's table, filtered by the caller's scope
#[derive(Clone)]
pub struct PgResourceCounter {
    pool: PgPool,
}

impl PgResourceCounter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn count_query(scope: &TenantScope, kind: ResourceKind) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ");
    builder.push(kind.table());
    builder.push(" WHERE TRUE");
    scope.push_predicate(&mut builder, "tenant_id");
    builder
}

#[async_trait]
impl ResourceCounter for PgResourceCounter {
    async fn count(&self, scope: &TenantScope, kind: ResourceKind) -> Result<u64> {
        let mut builder = count_query(scope, kind);
        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}
