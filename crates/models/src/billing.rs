use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ModelError;

// ============================================================================
// RESOURCES
// ============================================================================

/// Tenant-owned record types that plans put a cap on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Users,
    Products,
    Orders,
    Domains,
    TeamMembers,
    Pages,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Users,
        ResourceKind::Products,
        ResourceKind::Orders,
        ResourceKind::Domains,
        ResourceKind::TeamMembers,
        ResourceKind::Pages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Domains => "domains",
            Self::TeamMembers => "team-members",
            Self::Pages => "pages",
        }
    }

    /// Table holding the tenant's records of this kind
    pub fn table(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Domains => "tenant_domains",
            Self::TeamMembers => "team_members",
            Self::Pages => "pages",
        }
    }

    /// Key of this resource's cap inside `Plan::limits`
    pub fn limit_key(&self) -> &'static str {
        match self {
            Self::Users => "userLimit",
            Self::Products => "productsLimit",
            Self::Orders => "ordersLimit",
            Self::Domains => "domainsLimit",
            Self::TeamMembers => "teamMembersLimit",
            Self::Pages => "pagesLimit",
        }
    }

    /// Machine-readable code reported when the cap is reached
    pub fn limit_code(&self) -> &'static str {
        match self {
            Self::Users => "USER_LIMIT_EXCEEDED",
            Self::Products => "PRODUCT_LIMIT_EXCEEDED",
            Self::Orders => "ORDER_LIMIT_EXCEEDED",
            Self::Domains => "DOMAIN_LIMIT_EXCEEDED",
            Self::TeamMembers => "TEAM_MEMBER_LIMIT_EXCEEDED",
            Self::Pages => "PAGE_LIMIT_EXCEEDED",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownResource(s.to_string()))
    }
}

/// Cap on one resource kind. `Max(0)` disallows the resource entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum ResourceLimit {
    Unlimited,
    Max(u64),
}

impl ResourceLimit {
    /// `-1` is the unlimited sentinel. Any other negative cap allows nothing.
    pub fn from_int(value: i64) -> Self {
        match value {
            -1 => Self::Unlimited,
            v if v < 0 => Self::Max(0),
            v => Self::Max(v as u64),
        }
    }

    /// Read a stored cap. `null` means unlimited. Whole numbers are accepted
    /// as integers, floats or numeric strings; anything else is rejected.
    pub fn from_value(key: &str, value: &serde_json::Value) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidLimit {
            key: key.to_string(),
            value: value.to_string(),
        };

        match value {
            serde_json::Value::Null => Ok(Self::Unlimited),
            serde_json::Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Ok(Self::from_int(v))
                } else if let Some(v) = n.as_u64() {
                    Ok(Self::Max(v))
                } else {
                    n.as_f64().and_then(whole_number).map(Self::from_int).ok_or_else(invalid)
                }
            }
            serde_json::Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
                    .map(Self::from_int)
                    .ok_or_else(invalid)
            }
            _ => Err(invalid()),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    pub fn is_reached_by(&self, current: u64) -> bool {
        match self {
            Self::Unlimited => false,
            Self::Max(max) => current >= *max,
        }
    }

    pub fn max(&self) -> Option<u64> {
        match self {
            Self::Unlimited => None,
            Self::Max(max) => Some(*max),
        }
    }
}

impl std::fmt::Display for ResourceLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::Max(max) => write!(f, "{}", max),
        }
    }
}

// ============================================================================
// PLAN
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Plan {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub limits: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// Cap for `kind`. A missing key means unlimited.
    pub fn limit_for(&self, kind: ResourceKind) -> Result<ResourceLimit, ModelError> {
        match self.limits.get(kind.limit_key()) {
            Some(value) => ResourceLimit::from_value(kind.limit_key(), value),
            None => Ok(ResourceLimit::Unlimited),
        }
    }
}

fn whole_number(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

// ============================================================================
// SUBSCRIPTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Active,
    Trial,
    PastDue,
    Cancelled,
    Expired,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Trial => write!(f, "TRIAL"),
            Self::PastDue => write!(f, "PAST_DUE"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Subscription {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_active_or_trial(&self) -> bool {
        matches!(
            self.status,
            SubscriptionStatus::Active | SubscriptionStatus::Trial
        )
    }
}

// ============================================================================
// USAGE
// ============================================================================

/// Point-in-time view of one resource against its cap. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimitSnapshot {
    pub resource: ResourceKind,
    pub current: u64,
    pub limit: ResourceLimit,
    pub subscription_active: bool,
}

impl PlanLimitSnapshot {
    pub fn remaining(&self) -> Option<u64> {
        self.limit.max().map(|max| max.saturating_sub(self.current))
    }

    pub fn is_exhausted(&self) -> bool {
        self.limit.is_reached_by(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan(limits: serde_json::Value) -> Plan {
        Plan {
            id: Uuid::new_v4(),
            slug: "starter".to_string(),
            name: "Starter".to_string(),
            limits,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_unlimited_sentinels() {
        let p = plan(json!({ "userLimit": -1, "productsLimit": null, "pagesLimit": "-1" }));
        assert_eq!(p.limit_for(ResourceKind::Users), Ok(ResourceLimit::Unlimited));
        assert_eq!(p.limit_for(ResourceKind::Products), Ok(ResourceLimit::Unlimited));
        assert_eq!(p.limit_for(ResourceKind::Orders), Ok(ResourceLimit::Unlimited));
        assert_eq!(p.limit_for(ResourceKind::Pages), Ok(ResourceLimit::Unlimited));
    }

    #[test]
    fn test_whole_floats_and_numeric_strings_are_caps() {
        let p = plan(json!({ "productsLimit": 3.0, "ordersLimit": " 12 ", "userLimit": "4.0" }));
        assert_eq!(p.limit_for(ResourceKind::Products), Ok(ResourceLimit::Max(3)));
        assert_eq!(p.limit_for(ResourceKind::Orders), Ok(ResourceLimit::Max(12)));
        assert_eq!(p.limit_for(ResourceKind::Users), Ok(ResourceLimit::Max(4)));
    }

    #[test]
    fn test_other_negatives_allow_nothing() {
        let p = plan(json!({ "productsLimit": -5, "ordersLimit": "-2" }));
        assert_eq!(p.limit_for(ResourceKind::Products), Ok(ResourceLimit::Max(0)));
        assert_eq!(p.limit_for(ResourceKind::Orders), Ok(ResourceLimit::Max(0)));
    }

    #[test]
    fn test_malformed_limits_are_rejected() {
        let p = plan(json!({
            "productsLimit": 2.5,
            "ordersLimit": "lots",
            "userLimit": true,
            "pagesLimit": { "max": 3 }
        }));
        for kind in [
            ResourceKind::Products,
            ResourceKind::Orders,
            ResourceKind::Users,
            ResourceKind::Pages,
        ] {
            assert!(
                matches!(p.limit_for(kind), Err(ModelError::InvalidLimit { .. })),
                "{}",
                kind
            );
        }
    }

    #[test]
    fn test_zero_is_a_real_limit() {
        let p = plan(json!({ "pagesLimit": 0 }));
        let limit = p.limit_for(ResourceKind::Pages).unwrap();
        assert_eq!(limit, ResourceLimit::Max(0));
        assert!(limit.is_reached_by(0));
    }

    #[test]
    fn test_limit_reached_at_equality() {
        let limit = ResourceLimit::Max(3);
        assert!(!limit.is_reached_by(2));
        assert!(limit.is_reached_by(3));
        assert!(!ResourceLimit::Unlimited.is_reached_by(u64::MAX));
    }

    #[test]
    fn test_resource_kind_parsing() {
        assert_eq!("team_members".parse::<ResourceKind>(), Ok(ResourceKind::TeamMembers));
        assert_eq!("Products".parse::<ResourceKind>(), Ok(ResourceKind::Products));
        assert!("invoices".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_snapshot_remaining() {
        let snapshot = PlanLimitSnapshot {
            resource: ResourceKind::Products,
            current: 5,
            limit: ResourceLimit::Max(3),
            subscription_active: true,
        };
        assert_eq!(snapshot.remaining(), Some(0));
        assert!(snapshot.is_exhausted());
    }
}
