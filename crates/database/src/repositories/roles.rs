use async_trait::async_trait;
use saas_models::{Permission, RuntimeRole};
use sqlx::PgPool;

use super::{permission_names, RoleStore};
use crate::error::Result;

#[derive(Clone)]
pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn find_active(&self, name: &str) -> Result<Option<RuntimeRole>> {
        let role = sqlx::query_as::<_, RuntimeRole>(
            r#"
            SELECT id, name, permissions, description, is_active, created_at, updated_at
            FROM runtime_roles
            WHERE name = $1 AND is_active = TRUE
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    async fn list_active(&self) -> Result<Vec<RuntimeRole>> {
        let roles = sqlx::query_as::<_, RuntimeRole>(
            r#"
            SELECT id, name, permissions, description, is_active, created_at, updated_at
            FROM runtime_roles
            WHERE is_active = TRUE
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    async fn upsert(
        &self,
        name: &str,
        permissions: &[Permission],
        description: Option<&str>,
    ) -> Result<RuntimeRole> {
        let role = sqlx::query_as::<_, RuntimeRole>(
            r#"
            INSERT INTO runtime_roles (id, name, permissions, description, is_active)
            VALUES (gen_random_uuid(), $1, $2, $3, TRUE)
            ON CONFLICT (name) DO UPDATE
            SET permissions = EXCLUDED.permissions,
                description = EXCLUDED.description,
                is_active = TRUE,
                updated_at = NOW()
            RETURNING id, name, permissions, description, is_active, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(permission_names(permissions))
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(role)
    }

    async fn deactivate(&self, name: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE runtime_roles
            SET is_active = FALSE, updated_at = NOW()
            WHERE name = $1
            "#,
        )
        .bind(name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
