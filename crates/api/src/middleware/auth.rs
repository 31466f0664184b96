use crate::error::{api_error, ApiResult};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Bearer token from the Authorization header, if the request carries one
pub fn extract_bearer_token(headers: &HeaderMap) -> ApiResult<Option<String>> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_header = value.to_str().map_err(|_| {
        api_error(
            StatusCode::UNAUTHORIZED,
            "invalid_auth_header",
            "Invalid Authorization header format",
        )
    })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            api_error(
                StatusCode::UNAUTHORIZED,
                "invalid_auth_scheme",
                "Authorization header must use Bearer scheme",
            )
        })?;

    Ok(Some(token.to_string()))
}

/// Attach the verified principal to the request.
///
/// Anonymous requests pass through untouched; route policies decide whether
/// they are acceptable. A token that is present but invalid is always a 401.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    if let Some(token) = extract_bearer_token(&headers)? {
        let principal = state.jwt.authenticate(&token).map_err(|e| {
            tracing::warn!("Token validation failed: {}", e);
            api_error(StatusCode::UNAUTHORIZED, "invalid_token", &e.to_string())
        })?;

        request.extensions_mut().insert(principal);
    }

    Ok(next.run(request).await)
}
