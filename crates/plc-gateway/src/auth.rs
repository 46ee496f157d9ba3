use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::api::ApiError;
use crate::state::AppState;

/// Reject requests whose `Authorization: Basic <token>` is not a configured token
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.auth_enabled() {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(basic_token);

    match token {
        Some(token) if state.is_token_accepted(token) => {
            debug!(path = %request.uri().path(), "Auth is ok");
            Ok(next.run(request).await)
        }
        _ => {
            debug!(path = %request.uri().path(), "Auth failed");
            Err(ApiError::unauthorized())
        }
    }
}

/// Token part of a `Basic <token>` header value; the scheme is case-insensitive
fn basic_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("basic") && !token.is_empty()).then_some(token)
}
