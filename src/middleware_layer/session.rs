use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    services::session::{SESSION_COOKIE, require_session as resolve_session},
};

/// A middleware that requires a `session_id` cookie to be present.
///
/// The resolved `SessionId` is inserted as a request extension for the
/// handlers behind it.
///
/// # Arguments
///
/// * `cookies` - The request cookies.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response`, or `AppError::Unauthenticated` when the cookie is missing.
pub async fn require_session(
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let cookie = cookies.get(SESSION_COOKIE);
    let session_id = resolve_session(cookie.as_ref().map(|c| c.value()))?;

    tracing::debug!("🔑 Request scoped to session {}", session_id);

    request.extensions_mut().insert(session_id);

    Ok(next.run(request).await)
}
