use std::fmt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The anonymous partition key carried in the `session_id` cookie.
///
/// There is no server-side record behind it: whoever presents the token owns
/// every meal stored under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Mints a fresh random session identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a cookie value, rejecting anything that is not a UUID.
    pub fn parse(token: &str) -> Option<Self> {
        Uuid::parse_str(token.trim()).ok().map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
