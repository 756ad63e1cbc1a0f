use crate::{
    error::{AppError, Result},
    models::session::SessionId,
};

/// The name of the cookie that carries the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Resolves the caller's session for meal creation, minting one if needed.
///
/// A present, well-formed token is trusted as-is. Anything else yields a new
/// random identifier and `true`, telling the caller to hand the token back as
/// a cookie.
pub fn ensure_session(existing_token: Option<&str>) -> (SessionId, bool) {
    match existing_token.and_then(SessionId::parse) {
        Some(session_id) => (session_id, false),
        None => (SessionId::generate(), true),
    }
}

/// Resolves the caller's session for every route other than creation.
///
/// No lookup in storage: the token is the partition key.
pub fn require_session(existing_token: Option<&str>) -> Result<SessionId> {
    existing_token
        .and_then(SessionId::parse)
        .ok_or(AppError::Unauthenticated)
}
