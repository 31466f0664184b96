use saas_database::{TenantDirectory, TenantStatusWriter};
use saas_models::{Tenant, TenantStatusChange};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{Result, TenantError};

/// Platform-side tenant status changes
#[derive(Clone)]
pub struct TenantLifecycle {
    directory: Arc<dyn TenantDirectory>,
    writer: Arc<dyn TenantStatusWriter>,
}

impl TenantLifecycle {
    pub fn new(directory: Arc<dyn TenantDirectory>, writer: Arc<dyn TenantStatusWriter>) -> Self {
        Self { directory, writer }
    }

    pub async fn change_status(&self, tenant_id: Uuid, change: TenantStatusChange) -> Result<Tenant> {
        change.validate()?;

        let tenant = self
            .directory
            .find_by_id(tenant_id)
            .await?
            .ok_or(TenantError::TenantNotFound(tenant_id))?;

        if tenant.status == change.status {
            return Ok(tenant);
        }

        if !tenant.status.can_transition_to(change.status) {
            return Err(TenantError::InvalidTransition {
                from: tenant.status,
                to: change.status,
            });
        }

        let updated = self.writer.set_status(tenant_id, change.status).await?;

        tracing::info!(
            tenant_id = %tenant_id,
            from = %tenant.status,
            to = %updated.status,
            reason = change.reason.as_deref().unwrap_or(""),
            "Tenant status changed"
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tenant;
    use saas_database::InMemoryStore;
    use saas_models::TenantStatus;

    fn lifecycle(store: Arc<InMemoryStore>) -> TenantLifecycle {
        TenantLifecycle::new(store.clone(), store)
    }

    fn change(status: TenantStatus) -> TenantStatusChange {
        TenantStatusChange {
            status,
            reason: None,
        }
    }

    #[tokio::test]
    async fn test_suspend_active_tenant() {
        let store = Arc::new(InMemoryStore::new());
        let t = tenant("acme", None, TenantStatus::Active);
        store.insert_tenant(t.clone());

        let updated = lifecycle(store.clone())
            .change_status(t.id, change(TenantStatus::Suspended))
            .await
            .unwrap();
        assert_eq!(updated.status, TenantStatus::Suspended);

        let stored = store.find_by_id(t.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TenantStatus::Suspended);
    }

    #[tokio::test]
    async fn test_cancelled_cannot_be_reactivated() {
        let store = Arc::new(InMemoryStore::new());
        let t = tenant("gone", None, TenantStatus::Cancelled);
        store.insert_tenant(t.clone());

        let result = lifecycle(store)
            .change_status(t.id, change(TenantStatus::Active))
            .await;
        assert_eq!(
            result,
            Err(TenantError::InvalidTransition {
                from: TenantStatus::Cancelled,
                to: TenantStatus::Active,
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_tenant() {
        let store = Arc::new(InMemoryStore::new());
        let id = Uuid::new_v4();
        let result = lifecycle(store).change_status(id, change(TenantStatus::Active)).await;
        assert_eq!(result, Err(TenantError::TenantNotFound(id)));
    }

    #[tokio::test]
    async fn test_same_status_is_noop() {
        let store = Arc::new(InMemoryStore::new());
        let t = tenant("acme", None, TenantStatus::Trial);
        store.insert_tenant(t.clone());

        let unchanged = lifecycle(store)
            .change_status(t.id, change(TenantStatus::Trial))
            .await
            .unwrap();
        assert_eq!(unchanged, t);
    }
}
