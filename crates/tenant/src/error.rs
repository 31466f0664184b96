use saas_models::{Permission, ResourceKind, Role, TenantStatus};
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, TenantError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TenantError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Tenant context is required")]
    TenantRequired,

    #[error("Missing required permission: {0}")]
    Forbidden(Permission),

    #[error("Role {0} is not allowed on this route")]
    RoleNotAllowed(Role),

    #[error("Tenant context has not been established for this request")]
    ContextNotEstablished,

    #[error("Tenant context is already established for this request")]
    ContextAlreadyEstablished,

    #[error("Active subscription required to use this feature")]
    SubscriptionRequired,

    #[error("{resource} limit ({limit}) exceeded. Upgrade your plan to add more {resource}.")]
    LimitExceeded {
        resource: ResourceKind,
        current: u64,
        limit: u64,
    },

    #[error("Tenant {0} not found")]
    TenantNotFound(Uuid),

    #[error("Cannot change tenant status from {from} to {to}")]
    InvalidTransition { from: TenantStatus, to: TenantStatus },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl TenantError {
    /// Stable machine-readable code
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::TenantRequired => "tenant_required",
            Self::Forbidden(_) => "forbidden",
            Self::RoleNotAllowed(_) => "role_not_allowed",
            Self::ContextNotEstablished => "context_not_established",
            Self::ContextAlreadyEstablished => "context_already_established",
            Self::SubscriptionRequired => "subscription_required",
            Self::LimitExceeded { .. } => "limit_exceeded",
            Self::TenantNotFound(_) => "tenant_not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Validation(_) => "validation_error",
            Self::Storage(_) => "storage_error",
        }
    }

    /// True for failures that indicate a broken request pipeline rather
    /// than a client mistake.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::ContextNotEstablished | Self::ContextAlreadyEstablished | Self::Storage(_)
        )
    }
}

impl From<saas_database::DatabaseError> for TenantError {
    fn from(err: saas_database::DatabaseError) -> Self {
        TenantError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for TenantError {
    fn from(err: validator::ValidationErrors) -> Self {
        TenantError::Validation(err.to_string())
    }
}
