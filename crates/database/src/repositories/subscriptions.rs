use async_trait::async_trait;
use saas_models::{Plan, Subscription};
use sqlx::PgPool;
use uuid::Uuid;

use super::SubscriptionStore;
use crate::error::Result;

#[derive(Clone)]
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn find_active_by_tenant(&self, tenant_id: Uuid) -> Result<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, tenant_id, plan_id, status, trial_ends_at, current_period_end,
                   created_at, updated_at
            FROM subscriptions
            WHERE tenant_id = $1 AND status IN ('ACTIVE', 'TRIAL')
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }

    async fn find_plan(&self, plan_id: Uuid) -> Result<Option<Plan>> {
        let plan = sqlx::query_as::<_, Plan>(
            r#"
            SELECT id, slug, name, limits, is_active, created_at, updated_at
            FROM plans
            WHERE id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }
}
