//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Implementations live in other crates (dubcheck-store, dubcheck-search,
//! dubcheck-llm).

use crate::{FactCheckRecord, Session, Source, User, UserId};
use std::future::Future;

/// Result of a conditional credit debit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debit {
    /// The balance covered the amount and was decremented
    Applied {
        /// Balance after the debit
        remaining: u32,
    },

    /// The balance was too low; nothing changed
    Insufficient {
        /// Balance at the time of the attempt
        available: u32,
    },

    /// No user with that id exists
    UnknownUser,
}

/// Persistence for users, sessions and fact-check records
///
/// Implemented by the infrastructure layer (dubcheck-store). Methods take
/// `&self` so one store can be shared between concurrent requests;
/// implementations serialize access internally.
pub trait AccountStore {
    /// Error type for store operations
    type Error;

    /// Insert a new user
    ///
    /// Returns `false` without inserting when the email is already registered.
    fn insert_user(&self, user: &User) -> Result<bool, Self::Error>;

    /// Find a user by id
    fn find_user(&self, id: UserId) -> Result<Option<User>, Self::Error>;

    /// Find a user by email
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Self::Error>;

    /// Reset the balance if the user's reset date is still before `now`
    ///
    /// Returns whether the reset was applied. Two racing resets apply once.
    fn reset_credits(
        &self,
        id: UserId,
        credits: u32,
        next_reset_at: u64,
        now: u64,
    ) -> Result<bool, Self::Error>;

    /// Atomically decrement the balance if it covers `amount`
    fn debit_credits(&self, id: UserId, amount: u32) -> Result<Debit, Self::Error>;

    /// Change the user's plan name; returns whether the user exists
    fn update_plan(&self, id: UserId, plan: &str) -> Result<bool, Self::Error>;

    /// Insert a new session
    fn insert_session(&self, session: &Session) -> Result<(), Self::Error>;

    /// Find a session by token, expired or not
    fn find_session(&self, token: &str) -> Result<Option<Session>, Self::Error>;

    /// Insert a fact-check record
    fn insert_record(&self, record: &FactCheckRecord) -> Result<(), Self::Error>;

    /// Insert a record and debit its `credits_used` from the owner in one
    /// transaction
    ///
    /// The record is kept only when the debit is applied. On any other
    /// outcome neither the record nor the balance changes.
    fn record_and_debit(&self, record: &FactCheckRecord) -> Result<Debit, Self::Error>;

    /// A user's most recent records, newest first
    fn recent_records(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<FactCheckRecord>, Self::Error>;
}

/// Web search for supporting evidence
///
/// Implemented by the infrastructure layer (dubcheck-search)
pub trait SearchProvider {
    /// Error type for search operations
    type Error;

    /// Run a query and return organic results in rank order
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Source>, Self::Error>> + Send;
}

/// Trait for chat-style LLM operations
///
/// Implemented by the infrastructure layer (dubcheck-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Send a system persona and a user message, returning the reply text
    fn chat(
        &self,
        system: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
