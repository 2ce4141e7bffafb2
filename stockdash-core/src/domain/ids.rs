use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one interactive session. Portfolio state is keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Deterministic id derived from an opaque client token.
    /// Uses BLAKE3 so the raw token is never stored as a map key.
    pub fn from_token(token: &str) -> Self {
        let hash = blake3::hash(token.as_bytes());
        Self(hash.to_hex().as_str()[..16].to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
