//! Session issuance and resolution
//!
//! Tokens are 32 bytes from the operating system RNG, hex encoded. The store
//! keeps every session; expiry is enforced here on each resolve.

use crate::error::CheckError;
use dubcheck_domain::time::now_secs;
use dubcheck_domain::traits::AccountStore;
use dubcheck_domain::{Session, User, UserId};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;
use tracing::debug;

const TOKEN_BYTES: usize = 32;

/// Maps bearer tokens to users
pub struct SessionStore<S> {
    store: Arc<S>,
    ttl_secs: u64,
}

impl<S> Clone for SessionStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ttl_secs: self.ttl_secs,
        }
    }
}

impl<S> SessionStore<S>
where
    S: AccountStore,
    S::Error: std::fmt::Display,
{
    /// Create a session store issuing sessions valid for `ttl_secs`
    pub fn new(store: Arc<S>, ttl_secs: u64) -> Self {
        Self { store, ttl_secs }
    }

    /// Issue and persist a new session for `user_id`
    pub fn create_session(&self, user_id: UserId) -> Result<Session, CheckError> {
        self.create_session_at(user_id, now_secs())
    }

    /// Issue a session as if the current time were `now`
    pub fn create_session_at(&self, user_id: UserId, now: u64) -> Result<Session, CheckError> {
        let session = Session {
            token: generate_token(),
            user_id,
            created_at: now,
            expires_at: now + self.ttl_secs,
        };

        self.store
            .insert_session(&session)
            .map_err(CheckError::internal)?;

        debug!("Issued session for user {}", user_id);
        Ok(session)
    }

    /// Resolve a token to its user
    ///
    /// Unknown tokens, expired sessions and sessions whose user no longer
    /// exists all yield [`CheckError::InvalidSession`].
    pub fn resolve(&self, token: &str) -> Result<User, CheckError> {
        self.resolve_at(token, now_secs())
    }

    /// Resolve a token as if the current time were `now`
    pub fn resolve_at(&self, token: &str, now: u64) -> Result<User, CheckError> {
        if token.is_empty() {
            return Err(CheckError::InvalidSession);
        }

        let session = self
            .store
            .find_session(token)
            .map_err(CheckError::internal)?
            .ok_or(CheckError::InvalidSession)?;

        if session.is_expired(now) {
            debug!("Rejected expired session for user {}", session.user_id);
            return Err(CheckError::InvalidSession);
        }

        self.store
            .find_user(session.user_id)
            .map_err(CheckError::internal)?
            .ok_or(CheckError::InvalidSession)
    }
}

/// 256 bits of OS randomness, hex encoded
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let tokens: std::collections::HashSet<String> =
            (0..100).map(|_| generate_token()).collect();
        assert_eq!(tokens.len(), 100);
    }
}
