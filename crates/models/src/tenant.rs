use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::error::ModelError;

lazy_static::lazy_static! {
    pub static ref SLUG_REGEX: regex::Regex = regex::Regex::new(r"^[a-z0-9-]+$").unwrap();
}

/// A customer organization on the platform.
///
/// Tenants are never physically deleted; `Cancelled` is the terminal status.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub domain: Option<String>,
    pub status: TenantStatus,
    pub plan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Whether domain-based resolution may route requests to this tenant.
    pub fn is_resolvable(&self) -> bool {
        self.status.is_resolvable()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantStatus {
    Active,
    Trial,
    Suspended,
    Cancelled,
}

impl TenantStatus {
    /// Statuses a hostname is allowed to resolve to.
    pub const RESOLVABLE: [TenantStatus; 2] = [TenantStatus::Active, TenantStatus::Trial];

    pub fn is_resolvable(&self) -> bool {
        Self::RESOLVABLE.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Trial => "TRIAL",
            Self::Suspended => "SUSPENDED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Lifecycle rules for status changes. Setting the current status again
    /// is a no-op and always allowed.
    pub fn can_transition_to(&self, next: TenantStatus) -> bool {
        use TenantStatus::*;

        if *self == next {
            return true;
        }

        matches!(
            (self, next),
            (Trial, Active)
                | (Trial, Suspended)
                | (Active, Suspended)
                | (Suspended, Active)
                | (Trial, Cancelled)
                | (Active, Cancelled)
                | (Suspended, Cancelled)
        )
    }
}

impl std::fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TenantStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "TRIAL" => Ok(Self::Trial),
            "SUSPENDED" => Ok(Self::Suspended),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

/// Platform-admin request to move a tenant to another status
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TenantStatusChange {
    pub status: TenantStatus,

    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Slugs are 3-63 characters of lowercase letters, digits and hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    (3..=63).contains(&slug.len()) && SLUG_REGEX.is_match(slug)
}

/// Canonical form used for every hostname comparison: trimmed, lowercased,
/// and without a trailing root dot. Ports are kept.
pub fn normalize_hostname(raw: &str) -> String {
    let host = raw.trim().to_ascii_lowercase();
    match host.strip_suffix('.') {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolvable_statuses() {
        assert!(TenantStatus::Active.is_resolvable());
        assert!(TenantStatus::Trial.is_resolvable());
        assert!(!TenantStatus::Suspended.is_resolvable());
        assert!(!TenantStatus::Cancelled.is_resolvable());
    }

    #[test]
    fn test_cancelled_is_terminal() {
        assert!(!TenantStatus::Cancelled.can_transition_to(TenantStatus::Active));
        assert!(!TenantStatus::Cancelled.can_transition_to(TenantStatus::Trial));
        assert!(TenantStatus::Cancelled.can_transition_to(TenantStatus::Cancelled));
    }

    #[test]
    fn test_status_transitions() {
        assert!(TenantStatus::Trial.can_transition_to(TenantStatus::Active));
        assert!(TenantStatus::Suspended.can_transition_to(TenantStatus::Active));
        assert!(TenantStatus::Active.can_transition_to(TenantStatus::Cancelled));
        assert!(!TenantStatus::Active.can_transition_to(TenantStatus::Trial));
        assert!(!TenantStatus::Suspended.can_transition_to(TenantStatus::Trial));
    }

    #[test]
    fn test_status_serde_uses_upper_case() {
        let json = serde_json::to_string(&TenantStatus::Trial).unwrap();
        assert_eq!(json, "\"TRIAL\"");
        assert_eq!("suspended".parse::<TenantStatus>(), Ok(TenantStatus::Suspended));
        assert!("deleted".parse::<TenantStatus>().is_err());
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("acme"));
        assert!(is_valid_slug("acme-shop-2"));
        assert!(!is_valid_slug("ac"));
        assert!(!is_valid_slug("Acme"));
        assert!(!is_valid_slug("evil.acme"));
        assert!(!is_valid_slug(&"a".repeat(64)));
    }

    #[test]
    fn test_normalize_hostname() {
        assert_eq!(normalize_hostname("  Shop.Example.COM. "), "shop.example.com");
        assert_eq!(normalize_hostname("localhost:3000"), "localhost:3000");
        assert_eq!(normalize_hostname(""), "");
    }

    #[test]
    fn test_status_change_validation() {
        let change = TenantStatusChange {
            status: TenantStatus::Suspended,
            reason: Some("x".repeat(501)),
        };
        assert!(change.validate().is_err());
    }
}
