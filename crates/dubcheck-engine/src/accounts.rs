//! Registration, login and profile lookup

use crate::error::CheckError;
use crate::ledger::CreditLedger;
use crate::sessions::SessionStore;
use dubcheck_domain::time::now_secs;
use dubcheck_domain::traits::AccountStore;
use dubcheck_domain::{PlanCatalog, Session, User};
use std::sync::Arc;
use tracing::info;

/// Account operations exposed to callers
pub struct Accounts<S> {
    store: Arc<S>,
    sessions: SessionStore<S>,
    ledger: CreditLedger<S>,
    credit_period_secs: u64,
}

impl<S> Clone for Accounts<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            sessions: self.sessions.clone(),
            ledger: self.ledger.clone(),
            credit_period_secs: self.credit_period_secs,
        }
    }
}

impl<S> Accounts<S>
where
    S: AccountStore,
    S::Error: std::fmt::Display,
{
    /// Create the account service
    pub fn new(
        store: Arc<S>,
        sessions: SessionStore<S>,
        ledger: CreditLedger<S>,
        credit_period_secs: u64,
    ) -> Self {
        Self {
            store,
            sessions,
            ledger,
            credit_period_secs,
        }
    }

    /// Register a user on the free plan and open a session
    ///
    /// Email and name are trimmed and must be non-empty. A second
    /// registration for the same email fails, also when two arrive at once.
    pub fn register(&self, email: &str, name: &str) -> Result<(Session, User), CheckError> {
        let email = email.trim();
        let name = name.trim();
        if email.is_empty() || name.is_empty() {
            return Err(CheckError::Validation(
                "Email and name are required".to_string(),
            ));
        }

        let free = self.ledger.catalog().free();
        let user = User::register(
            email,
            name,
            free.weekly_credits,
            now_secs(),
            self.credit_period_secs,
        );

        let inserted = self.store.insert_user(&user).map_err(CheckError::internal)?;
        if !inserted {
            return Err(CheckError::Validation(
                "User already exists".to_string(),
            ));
        }

        info!("Registered user {} on {} plan", user.id, user.plan);
        let session = self.sessions.create_session(user.id)?;
        Ok((session, user))
    }

    /// Open a new session for an existing user
    ///
    /// Every login issues a fresh token; earlier sessions stay valid.
    pub fn login(&self, email: &str) -> Result<(Session, User), CheckError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CheckError::Validation("Email is required".to_string()));
        }

        let user = self
            .store
            .find_user_by_email(email)
            .map_err(CheckError::internal)?
            .ok_or_else(|| CheckError::NotFound("User not found".to_string()))?;

        let session = self.sessions.create_session(user.id)?;
        info!("User {} logged in", user.id);
        Ok((session, user))
    }

    /// The session's user, with any due weekly reset applied
    pub fn profile(&self, token: &str) -> Result<User, CheckError> {
        let user = self.sessions.resolve(token)?;
        self.ledger.ensure_fresh_balance(user)
    }

    /// All subscription tiers
    pub fn plans(&self) -> &PlanCatalog {
        self.ledger.catalog()
    }

    /// Move the session's user to another plan
    pub fn change_plan(&self, token: &str, plan: &str) -> Result<User, CheckError> {
        let user = self.sessions.resolve(token)?;
        self.ledger.change_plan(user.id, plan)
    }
}
