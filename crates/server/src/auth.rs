//! Authentication middleware.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

/// Whether a method mutates state and therefore requires authentication.
fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Reject mutating requests whose `Authorization` header does not match the
/// configured secret exactly. Read requests pass through untouched.
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_mutating(req.method()) {
        let provided = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match provided {
            Some(value) if value == state.config.auth.secret => {}
            _ => {
                tracing::debug!(method = %req.method(), uri = %req.uri(), "rejected unauthenticated mutation");
                return Err(ApiError::Unauthorized);
            }
        }
    }

    Ok(next.run(req).await)
}
