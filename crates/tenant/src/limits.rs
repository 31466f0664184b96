//! Plan limit enforcement for resource creation.
//!
//! Identity failures are strict, infrastructure failures are not: when the
//! subscription, plan or count cannot be read the check fails open so that a
//! degraded store never blocks paying tenants. Checks are read-only and do not
//! reserve capacity, so concurrent creations may overshoot a limit.

use saas_database::{DatabaseError, ResourceCounter, SubscriptionStore, TenantScope};
use saas_models::{PlanLimitSnapshot, ResourceKind, ResourceLimit};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Result, TenantError};

/// Non-rejecting result of a limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitOutcome {
    WithinLimit(PlanLimitSnapshot),
    Unlimited(ResourceKind),
    FailedOpen { resource: ResourceKind, reason: String },
}

impl LimitOutcome {
    pub fn resource(&self) -> ResourceKind {
        match self {
            Self::WithinLimit(snapshot) => snapshot.resource,
            Self::Unlimited(resource) => *resource,
            Self::FailedOpen { resource, .. } => *resource,
        }
    }
}

#[derive(Clone)]
pub struct PlanLimitEnforcer {
    subscriptions: Arc<dyn SubscriptionStore>,
    counter: Arc<dyn ResourceCounter>,
}

impl PlanLimitEnforcer {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, counter: Arc<dyn ResourceCounter>) -> Self {
        Self {
            subscriptions,
            counter,
        }
    }

    /// Check whether `tenant_id` may create one more `kind`.
    pub async fn check_limit(&self, tenant_id: Uuid, kind: ResourceKind) -> Result<LimitOutcome> {
        let subscription = match self.subscriptions.find_active_by_tenant(tenant_id).await {
            Ok(Some(subscription)) => subscription,
            Ok(None) => {
                tracing::info!(
                    tenant_id = %tenant_id,
                    resource = %kind,
                    "Rejected: no active subscription"
                );
                return Err(TenantError::SubscriptionRequired);
            }
            Err(e) => return Ok(fail_open(tenant_id, kind, e)),
        };

        let plan = match self.subscriptions.find_plan(subscription.plan_id).await {
            Ok(Some(plan)) => plan,
            Ok(None) => {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    plan_id = %subscription.plan_id,
                    "Subscription references a missing plan, allowing request"
                );
                return Ok(LimitOutcome::FailedOpen {
                    resource: kind,
                    reason: format!("plan {} not found", subscription.plan_id),
                });
            }
            Err(e) => return Ok(fail_open(tenant_id, kind, e)),
        };

        let limit = match plan.limit_for(kind) {
            Ok(limit) => limit,
            Err(e) => {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    plan_id = %plan.id,
                    error = %e,
                    "Plan has a malformed limit, allowing request"
                );
                return Ok(LimitOutcome::FailedOpen {
                    resource: kind,
                    reason: e.to_string(),
                });
            }
        };
        let ResourceLimit::Max(max) = limit else {
            return Ok(LimitOutcome::Unlimited(kind));
        };

        let current = match self.counter.count(&TenantScope::Tenant(tenant_id), kind).await {
            Ok(current) => current,
            Err(e) => return Ok(fail_open(tenant_id, kind, e)),
        };

        if limit.is_reached_by(current) {
            tracing::info!(
                tenant_id = %tenant_id,
                resource = %kind,
                current,
                limit = max,
                "Rejected: plan limit reached"
            );
            return Err(TenantError::LimitExceeded {
                resource: kind,
                current,
                limit: max,
            });
        }

        Ok(LimitOutcome::WithinLimit(PlanLimitSnapshot {
            resource: kind,
            current,
            limit,
            subscription_active: true,
        }))
    }

    /// Current usage of every resource kind against the tenant's plan.
    ///
    /// Only a missing subscription is an error. When the subscription or plan
    /// cannot be read the report is empty, and kinds whose count or cap cannot
    /// be read are left out.
    pub async fn usage(&self, tenant_id: Uuid) -> Result<Vec<PlanLimitSnapshot>> {
        let subscription = match self.subscriptions.find_active_by_tenant(tenant_id).await {
            Ok(Some(subscription)) => subscription,
            Ok(None) => return Err(TenantError::SubscriptionRequired),
            Err(e) => {
                tracing::warn!(tenant_id = %tenant_id, error = %e, "Usage unavailable");
                return Ok(Vec::new());
            }
        };

        let plan = match self.subscriptions.find_plan(subscription.plan_id).await {
            Ok(Some(plan)) => plan,
            Ok(None) => {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    plan_id = %subscription.plan_id,
                    "Usage unavailable: subscription references a missing plan"
                );
                return Ok(Vec::new());
            }
            Err(e) => {
                tracing::warn!(tenant_id = %tenant_id, error = %e, "Usage unavailable");
                return Ok(Vec::new());
            }
        };

        let scope = TenantScope::Tenant(tenant_id);
        let mut snapshots = Vec::with_capacity(ResourceKind::ALL.len());
        for kind in ResourceKind::ALL {
            let limit = match plan.limit_for(kind) {
                Ok(limit) => limit,
                Err(e) => {
                    tracing::warn!(
                        tenant_id = %tenant_id,
                        resource = %kind,
                        error = %e,
                        "Skipping usage for resource"
                    );
                    continue;
                }
            };

            match self.counter.count(&scope, kind).await {
                Ok(current) => snapshots.push(PlanLimitSnapshot {
                    resource: kind,
                    current,
                    limit,
                    subscription_active: subscription.is_active_or_trial(),
                }),
                Err(e) => {
                    tracing::warn!(
                        tenant_id = %tenant_id,
                        resource = %kind,
                        error = %e,
                        "Skipping usage for resource"
                    );
                }
            }
        }

        Ok(snapshots)
    }
}

fn fail_open(tenant_id: Uuid, kind: ResourceKind, err: DatabaseError) -> LimitOutcome {
    tracing::error!(
        tenant_id = %tenant_id,
        resource = %kind,
        error = %err,
        "Plan limit check failed, allowing request"
    );
    LimitOutcome::FailedOpen {
        resource: kind,
        reason: err.to_string(),
    }
}

/// Creation routes guarded by a plan limit, matched on method and path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitedRoutes {
    routes: Vec<(String, String, ResourceKind)>,
}

impl Default for LimitedRoutes {
    fn default() -> Self {
        let routes = ResourceKind::ALL
            .into_iter()
            .map(|kind| ("POST".to_string(), format!("/{}", kind.as_str()), kind))
            .collect();
        Self { routes }
    }
}

impl LimitedRoutes {
    pub fn empty() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn with_route(mut self, method: &str, path: &str, kind: ResourceKind) -> Self {
        self.routes
            .push((method.to_ascii_uppercase(), normalize_path(path).to_string(), kind));
        self
    }

    /// Parse `METHOD /path=resource` entries separated by commas.
    pub fn parse(raw: &str) -> std::result::Result<Self, String> {
        let mut routes = Self::empty();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (route, resource) = entry
                .split_once('=')
                .ok_or_else(|| format!("missing '=' in '{}'", entry))?;
            let (method, path) = route
                .trim()
                .split_once(' ')
                .ok_or_else(|| format!("expected 'METHOD /path' in '{}'", entry))?;
            let kind: ResourceKind = resource.parse().map_err(|e: saas_models::ModelError| e.to_string())?;
            routes = routes.with_route(method.trim(), path.trim(), kind);
        }
        Ok(routes)
    }

    pub fn match_route(&self, method: &str, path: &str) -> Option<ResourceKind> {
        let path = normalize_path(path);
        self.routes
            .iter()
            .find(|(m, p, _)| m.eq_ignore_ascii_case(method) && p == path)
            .map(|(_, _, kind)| *kind)
    }
}

fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{plan, subscription, BrokenStore};
    use saas_database::InMemoryStore;
    use saas_models::SubscriptionStatus;
    use serde_json::json;

    fn enforcer(store: Arc<InMemoryStore>) -> PlanLimitEnforcer {
        PlanLimitEnforcer::new(store.clone(), store)
    }

    fn subscribed(limits: serde_json::Value, status: SubscriptionStatus) -> (Arc<InMemoryStore>, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let tenant_id = Uuid::new_v4();
        let p = plan(limits);
        store.insert_subscription(subscription(tenant_id, p.id, status));
        store.insert_plan(p);
        (store, tenant_id)
    }

    #[tokio::test]
    async fn test_limit_reached() {
        let (store, tenant_id) = subscribed(json!({ "productsLimit": 3 }), SubscriptionStatus::Active);
        store.set_count(tenant_id, ResourceKind::Products, 3);

        let result = enforcer(store).check_limit(tenant_id, ResourceKind::Products).await;
        assert_eq!(
            result,
            Err(TenantError::LimitExceeded {
                resource: ResourceKind::Products,
                current: 3,
                limit: 3,
            })
        );
    }

    #[tokio::test]
    async fn test_below_limit() {
        let (store, tenant_id) = subscribed(json!({ "productsLimit": 3 }), SubscriptionStatus::Trial);
        store.set_count(tenant_id, ResourceKind::Products, 2);

        let outcome = enforcer(store)
            .check_limit(tenant_id, ResourceKind::Products)
            .await
            .unwrap();
        match outcome {
            LimitOutcome::WithinLimit(snapshot) => {
                assert_eq!(snapshot.current, 2);
                assert_eq!(snapshot.limit, ResourceLimit::Max(3));
                assert_eq!(snapshot.remaining(), Some(1));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_counts_are_per_tenant() {
        let (store, tenant_id) = subscribed(json!({ "ordersLimit": 5 }), SubscriptionStatus::Active);
        store.set_count(Uuid::new_v4(), ResourceKind::Orders, 100);
        store.set_count(tenant_id, ResourceKind::Orders, 1);

        let outcome = enforcer(store)
            .check_limit(tenant_id, ResourceKind::Orders)
            .await
            .unwrap();
        assert!(matches!(outcome, LimitOutcome::WithinLimit(s) if s.current == 1));
    }

    #[tokio::test]
    async fn test_no_subscription_for_every_kind() {
        let store = Arc::new(InMemoryStore::new());
        let tenant_id = Uuid::new_v4();
        let enforcer = enforcer(store);

        for kind in ResourceKind::ALL {
            let result = enforcer.check_limit(tenant_id, kind).await;
            assert_eq!(result, Err(TenantError::SubscriptionRequired), "{}", kind);
        }
    }

    #[tokio::test]
    async fn test_inactive_subscription_counts_as_none() {
        let (store, tenant_id) = subscribed(json!({}), SubscriptionStatus::PastDue);
        let result = enforcer(store).check_limit(tenant_id, ResourceKind::Users).await;
        assert_eq!(result, Err(TenantError::SubscriptionRequired));
    }

    #[tokio::test]
    async fn test_unlimited_sentinel_and_missing_key() {
        let (store, tenant_id) = subscribed(json!({ "userLimit": -1 }), SubscriptionStatus::Active);
        store.set_count(tenant_id, ResourceKind::Users, 1_000_000);
        let enforcer = enforcer(store);

        assert_eq!(
            enforcer.check_limit(tenant_id, ResourceKind::Users).await,
            Ok(LimitOutcome::Unlimited(ResourceKind::Users))
        );
        assert_eq!(
            enforcer.check_limit(tenant_id, ResourceKind::Pages).await,
            Ok(LimitOutcome::Unlimited(ResourceKind::Pages))
        );
    }

    #[tokio::test]
    async fn test_zero_limit_blocks_first_creation() {
        let (store, tenant_id) = subscribed(json!({ "domainsLimit": 0 }), SubscriptionStatus::Active);
        let result = enforcer(store).check_limit(tenant_id, ResourceKind::Domains).await;
        assert!(matches!(result, Err(TenantError::LimitExceeded { current: 0, limit: 0, .. })));
    }

    #[tokio::test]
    async fn test_missing_plan_fails_open() {
        let store = Arc::new(InMemoryStore::new());
        let tenant_id = Uuid::new_v4();
        store.insert_subscription(subscription(tenant_id, Uuid::new_v4(), SubscriptionStatus::Active));

        let outcome = enforcer(store)
            .check_limit(tenant_id, ResourceKind::Products)
            .await
            .unwrap();
        assert!(matches!(outcome, LimitOutcome::FailedOpen { .. }));
    }

    #[tokio::test]
    async fn test_store_failure_fails_open() {
        let broken = Arc::new(BrokenStore);
        let enforcer = PlanLimitEnforcer::new(broken.clone(), broken);

        let outcome = enforcer
            .check_limit(Uuid::new_v4(), ResourceKind::Users)
            .await
            .unwrap();
        assert_eq!(outcome.resource(), ResourceKind::Users);
        assert!(matches!(outcome, LimitOutcome::FailedOpen { .. }));
    }

    #[tokio::test]
    async fn test_count_failure_fails_open() {
        let (store, tenant_id) = subscribed(json!({ "productsLimit": 1 }), SubscriptionStatus::Active);
        let enforcer = PlanLimitEnforcer::new(store, Arc::new(BrokenStore));

        let outcome = enforcer
            .check_limit(tenant_id, ResourceKind::Products)
            .await
            .unwrap();
        assert!(matches!(outcome, LimitOutcome::FailedOpen { .. }));
    }

    #[tokio::test]
    async fn test_usage_snapshots() {
        let (store, tenant_id) = subscribed(
            json!({ "productsLimit": 10, "userLimit": -1 }),
            SubscriptionStatus::Active,
        );
        store.set_count(tenant_id, ResourceKind::Products, 4);

        let usage = enforcer(store).usage(tenant_id).await.unwrap();
        assert_eq!(usage.len(), ResourceKind::ALL.len());

        let products = usage
            .iter()
            .find(|s| s.resource == ResourceKind::Products)
            .unwrap();
        assert_eq!(products.current, 4);
        assert_eq!(products.limit, ResourceLimit::Max(10));

        let users = usage.iter().find(|s| s.resource == ResourceKind::Users).unwrap();
        assert!(users.limit.is_unlimited());
    }

    #[tokio::test]
    async fn test_whole_float_limit_is_enforced() {
        let (store, tenant_id) = subscribed(json!({ "productsLimit": 3.0 }), SubscriptionStatus::Active);
        store.set_count(tenant_id, ResourceKind::Products, 3);

        let result = enforcer(store).check_limit(tenant_id, ResourceKind::Products).await;
        assert_eq!(
            result,
            Err(TenantError::LimitExceeded {
                resource: ResourceKind::Products,
                current: 3,
                limit: 3,
            })
        );
    }

    #[tokio::test]
    async fn test_numeric_string_limit_is_enforced() {
        let (store, tenant_id) = subscribed(json!({ "productsLimit": "3" }), SubscriptionStatus::Active);
        store.set_count(tenant_id, ResourceKind::Products, 3);

        let result = enforcer(store).check_limit(tenant_id, ResourceKind::Products).await;
        assert!(matches!(
            result,
            Err(TenantError::LimitExceeded { current: 3, limit: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_negative_limit_other_than_sentinel_blocks() {
        let (store, tenant_id) = subscribed(json!({ "productsLimit": -5 }), SubscriptionStatus::Active);

        let result = enforcer(store).check_limit(tenant_id, ResourceKind::Products).await;
        assert!(matches!(
            result,
            Err(TenantError::LimitExceeded { current: 0, limit: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_limit_fails_open() {
        let (store, tenant_id) = subscribed(json!({ "productsLimit": "plenty" }), SubscriptionStatus::Active);
        store.set_count(tenant_id, ResourceKind::Products, 50);

        let outcome = enforcer(store)
            .check_limit(tenant_id, ResourceKind::Products)
            .await
            .unwrap();
        assert!(matches!(outcome, LimitOutcome::FailedOpen { resource: ResourceKind::Products, .. }));
    }

    #[tokio::test]
    async fn test_usage_with_broken_store_is_empty() {
        let broken = Arc::new(BrokenStore);
        let enforcer = PlanLimitEnforcer::new(broken.clone(), broken);

        let usage = enforcer.usage(Uuid::new_v4()).await;
        assert_eq!(usage, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_usage_with_missing_plan_is_empty() {
        let store = Arc::new(InMemoryStore::new());
        let tenant_id = Uuid::new_v4();
        store.insert_subscription(subscription(tenant_id, Uuid::new_v4(), SubscriptionStatus::Active));

        assert_eq!(enforcer(store).usage(tenant_id).await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_usage_skips_malformed_limits_and_failed_counts() {
        let (store, tenant_id) = subscribed(
            json!({ "productsLimit": [1, 2], "ordersLimit": 4 }),
            SubscriptionStatus::Active,
        );
        let usage = enforcer(store.clone()).usage(tenant_id).await.unwrap();
        assert_eq!(usage.len(), ResourceKind::ALL.len() - 1);
        assert!(usage.iter().all(|s| s.resource != ResourceKind::Products));

        let counting_broken = PlanLimitEnforcer::new(store, Arc::new(BrokenStore));
        assert_eq!(counting_broken.usage(tenant_id).await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_usage_without_subscription() {
        let store = Arc::new(InMemoryStore::new());
        let result = enforcer(store).usage(Uuid::new_v4()).await;
        assert_eq!(result, Err(TenantError::SubscriptionRequired));
    }

    #[test]
    fn test_default_limited_routes() {
        let routes = LimitedRoutes::default();
        assert_eq!(routes.match_route("POST", "/products"), Some(ResourceKind::Products));
        assert_eq!(routes.match_route("post", "/users/"), Some(ResourceKind::Users));
        assert_eq!(routes.match_route("POST", "/team-members"), Some(ResourceKind::TeamMembers));
        assert_eq!(routes.match_route("GET", "/products"), None);
        assert_eq!(routes.match_route("POST", "/products/123"), None);
    }

    #[test]
    fn test_parse_limited_routes() {
        let routes = LimitedRoutes::parse("POST /api/items=products, PUT /seats/=team_members").unwrap();
        assert_eq!(routes.match_route("POST", "/api/items"), Some(ResourceKind::Products));
        assert_eq!(routes.match_route("PUT", "/seats"), Some(ResourceKind::TeamMembers));
        assert_eq!(routes.match_route("POST", "/products"), None);

        assert!(LimitedRoutes::parse("POST /x").is_err());
        assert!(LimitedRoutes::parse("/x=products").is_err());
        assert!(LimitedRoutes::parse("POST /x=invoices").is_err());
    }
}
