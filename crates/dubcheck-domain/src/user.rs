//! User accounts

use crate::plan::DEFAULT_PLAN;
use std::fmt;

/// Unique identifier for a user, based on UUIDv7
///
/// UUIDv7 sorts by creation time and needs no coordination to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(u128);

impl UserId {
    /// Generate a new UUIDv7-based UserId
    ///
    /// # Examples
    ///
    /// ```
    /// use dubcheck_domain::UserId;
    ///
    /// let a = UserId::new();
    /// let b = UserId::new();
    /// assert_ne!(a, b);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a UserId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a UserId from its hyphenated UUID form
    ///
    /// # Examples
    ///
    /// ```
    /// use dubcheck_domain::UserId;
    ///
    /// let id = UserId::new();
    /// assert_eq!(UserId::from_string(&id.to_string()).unwrap(), id);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid user id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A registered account
///
/// `credits` is unsigned, so a negative balance is unrepresentable; the store
/// additionally refuses any debit that would underflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable identifier
    pub id: UserId,

    /// Unique email address
    pub email: String,

    /// Display name
    pub name: String,

    /// Plan tier name; resolved through the plan catalog
    pub plan: String,

    /// Remaining credits in the current period
    pub credits: u32,

    /// When the next weekly reset becomes due (Unix seconds)
    pub credits_reset_at: u64,

    /// Registration time (Unix seconds)
    pub created_at: u64,

    /// Whether the account is active
    pub is_active: bool,
}

impl User {
    /// Build a freshly registered user on the default plan
    pub fn register(
        email: impl Into<String>,
        name: impl Into<String>,
        starting_credits: u32,
        now: u64,
        credit_period_secs: u64,
    ) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            name: name.into(),
            plan: DEFAULT_PLAN.to_string(),
            credits: starting_credits,
            credits_reset_at: now + credit_period_secs,
            created_at: now,
            is_active: true,
        }
    }

    /// Whether the weekly reset is due at `now`
    pub fn reset_due(&self, now: u64) -> bool {
        now > self.credits_reset_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::WEEK_SECS;

    #[test]
    fn test_register_defaults() {
        let user = User::register("a@example.com", "Ada", 30, 1_000, WEEK_SECS);
        assert_eq!(user.plan, "free");
        assert_eq!(user.credits, 30);
        assert_eq!(user.credits_reset_at, 1_000 + WEEK_SECS);
        assert_eq!(user.created_at, 1_000);
        assert!(user.is_active);
    }

    #[test]
    fn test_reset_due_is_strict() {
        let user = User::register("a@example.com", "Ada", 30, 0, 100);
        assert!(!user.reset_due(99));
        assert!(!user.reset_due(100));
        assert!(user.reset_due(101));
    }

    #[test]
    fn test_user_id_rejects_garbage() {
        assert!(UserId::from_string("not-a-uuid").is_err());
    }
}
