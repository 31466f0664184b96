use axum::{http::StatusCode, Json};
use saas_tenant::TenantError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            code: None,
            resource: None,
            current: None,
            limit: None,
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn api_error(status: StatusCode, error: &str, message: &str) -> ApiError {
    (status, Json(ErrorResponse::new(error, message)))
}

/// HTTP rendering of tenancy failures
pub fn tenant_error(err: TenantError) -> ApiError {
    let mut body = ErrorResponse::new(err.kind(), &err.to_string());

    let status = match &err {
        TenantError::Unauthenticated => StatusCode::UNAUTHORIZED,
        TenantError::TenantRequired
        | TenantError::Forbidden(_)
        | TenantError::RoleNotAllowed(_) => StatusCode::FORBIDDEN,
        TenantError::SubscriptionRequired => {
            body.code = Some("NO_SUBSCRIPTION".to_string());
            StatusCode::PAYMENT_REQUIRED
        }
        TenantError::LimitExceeded {
            resource,
            current,
            limit,
        } => {
            body.code = Some(resource.limit_code().to_string());
            body.resource = Some(resource.as_str().to_string());
            body.current = Some(*current);
            body.limit = Some(*limit);
            StatusCode::PAYMENT_REQUIRED
        }
        TenantError::TenantNotFound(_) => StatusCode::NOT_FOUND,
        TenantError::InvalidTransition { .. } => StatusCode::CONFLICT,
        TenantError::Validation(_) => StatusCode::BAD_REQUEST,
        TenantError::ContextNotEstablished
        | TenantError::ContextAlreadyEstablished
        | TenantError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if err.is_internal() {
        tracing::error!(error = %err, "Tenancy pipeline failure");
        body.message = "Internal server error".to_string();
    }

    (status, Json(body))
}
