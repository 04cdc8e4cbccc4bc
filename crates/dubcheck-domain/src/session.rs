//! Session tokens

use crate::user::UserId;

/// A bearer session bound to a user
///
/// The session holds the user's id only; the user may be gone by the time the
/// session is resolved, in which case the session is treated as invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque, unguessable bearer token
    pub token: String,

    /// Owning user
    pub user_id: UserId,

    /// Creation time (Unix seconds)
    pub created_at: u64,

    /// Expiry time (Unix seconds)
    pub expires_at: u64,
}

impl Session {
    /// Whether the session has expired at `now`
    ///
    /// A session is valid up to and including its expiry second.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }
}
