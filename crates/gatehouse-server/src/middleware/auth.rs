use crate::{error::AppError, state::AppState};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Resolve the bearer token to the session [`Identity`](gatehouse_core::Identity)
/// and attach it as a request extension.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(req.headers()).ok_or(AppError::Unauthorized)?;
    let identity = state
        .grants
        .resolve_token(&token)
        .await
        .ok_or(AppError::Unauthorized)?;

    tracing::debug!(login = %identity.login, "Bearer token accepted");
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    let rest = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}
