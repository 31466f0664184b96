use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// Row filter every tenant-owned query must carry.
///
/// `Platform` is only ever produced for platform super admins and lifts the
/// filter; every other request is pinned to exactly one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "tenant_id")]
pub enum TenantScope {
    Tenant(Uuid),
    Platform,
}

impl TenantScope {
    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            Self::Tenant(id) => Some(*id),
            Self::Platform => None,
        }
    }

    pub fn is_platform(&self) -> bool {
        matches!(self, Self::Platform)
    }

    /// Whether a record owned by `owner` is visible under this scope.
    pub fn permits(&self, owner: Uuid) -> bool {
        match self {
            Self::Tenant(id) => *id == owner,
            Self::Platform => true,
        }
    }

    /// Appends ` AND <column> = $n` for tenant scopes. The builder must
    /// already contain a `WHERE` clause.
    pub fn push_predicate(&self, builder: &mut QueryBuilder<'_, Postgres>, column: &str) {
        if let Self::Tenant(id) = self {
            builder.push(" AND ");
            builder.push(column);
            builder.push(" = ");
            builder.push_bind(*id);
        }
    }
}
