use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, AppState};

/// Id of the authenticated caller, attached to the response so the request
/// span opened by `logging_middleware` can record it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i32);

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the caller from an API key and stores the [`crate::models::user::User`]
/// in the request extensions. The key is read from:
/// 1. `X-Api-Key` header
/// 2. `Authorization: Bearer <api_key>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(key) = extract_api_key(&headers) else {
        return Err(ApiError::Unauthorized("Missing API key".to_string()));
    };

    match state.store().verify_api_key(&key).await {
        Ok(Some(user)) => {
            let user_id = user.id;
            request.extensions_mut().insert(user);
            let mut response = next.run(request).await;
            response.extensions_mut().insert(AuthenticatedUser(user_id));
            Ok(response)
        }
        Ok(None) => {
            tracing::debug!("Rejected unknown API key");
            Err(ApiError::Unauthorized("Invalid API key".to_string()))
        }
        Err(e) => Err(ApiError::DatabaseError(e.to_string())),
    }
}

/// Extract API key from headers
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    // Check X-Api-Key header
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    // Check Authorization: Bearer header
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}
