//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use shelfmate_core::domain::AuthSession;
use shelfmate_core::ports::PortError;
use std::sync::Arc;
use tracing::error;

use crate::error::AppError;
use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// Reads the session id out of the `Cookie` header.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| {
            let c = c.trim();
            c.strip_prefix("session=")
        })
        .filter(|id| !id.is_empty())
}

/// Looks up the live session for the request, if any.
pub async fn current_session(state: &AppState, headers: &HeaderMap) -> Result<Option<AuthSession>, AppError> {
    let Some(auth_session_id) = session_id_from_headers(headers) else {
        return Ok(None);
    };

    match state.db.validate_auth_session(auth_session_id).await {
        Ok(session) => Ok(Some(session)),
        Err(PortError::Unauthorized) | Err(PortError::NotFound(_)) => Ok(None),
        Err(e) => {
            error!("Failed to validate auth session: {:?}", e);
            Err(e.into())
        }
    }
}

/// Middleware that validates the auth session cookie.
///
/// If valid, inserts the `AuthSession` into request extensions for handlers to use.
/// If invalid or missing, redirects to the login page.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = current_session(&state, req.headers())
        .await?
        .ok_or(AppError::Unauthenticated)?;

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
