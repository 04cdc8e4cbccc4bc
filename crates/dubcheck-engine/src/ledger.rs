//! Credit accounting: pricing, weekly resets, debits and plan changes

use crate::error::CheckError;
use dubcheck_domain::time::now_secs;
use dubcheck_domain::traits::{AccountStore, Debit};
use dubcheck_domain::{FactCheckRecord, PlanCatalog, User, UserId};
use std::sync::Arc;
use tracing::{info, warn};

/// Enforces credit balances against the store
pub struct CreditLedger<S> {
    store: Arc<S>,
    catalog: Arc<PlanCatalog>,
    period_secs: u64,
}

impl<S> Clone for CreditLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
            period_secs: self.period_secs,
        }
    }
}

impl<S> CreditLedger<S>
where
    S: AccountStore,
    S::Error: std::fmt::Display,
{
    /// Create a ledger with the given credit period
    pub fn new(store: Arc<S>, catalog: Arc<PlanCatalog>, period_secs: u64) -> Self {
        Self {
            store,
            catalog,
            period_secs,
        }
    }

    /// The plan catalog this ledger prices against
    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// Credits needed to fact-check `text`
    pub fn cost_of(&self, text: &str) -> u32 {
        dubcheck_domain::cost_of(text)
    }

    /// Apply the weekly reset if it is due
    ///
    /// Returns the user unchanged when no reset is due, otherwise the user as
    /// stored after the reset.
    pub fn ensure_fresh_balance(&self, user: User) -> Result<User, CheckError> {
        self.ensure_fresh_balance_at(user, now_secs())
    }

    /// [`ensure_fresh_balance`](Self::ensure_fresh_balance) with an explicit clock
    pub fn ensure_fresh_balance_at(&self, user: User, now: u64) -> Result<User, CheckError> {
        if !user.reset_due(now) {
            return Ok(user);
        }

        let plan = self.catalog.lookup(&user.plan);
        let applied = self
            .store
            .reset_credits(user.id, plan.weekly_credits, now + self.period_secs, now)
            .map_err(CheckError::internal)?;

        if applied {
            info!(
                "Reset credits for user {} to {} ({} plan)",
                user.id, plan.weekly_credits, plan.name
            );
        }

        // Reload even if another request won the reset
        self.store
            .find_user(user.id)
            .map_err(CheckError::internal)?
            .ok_or(CheckError::InvalidSession)
    }

    /// Atomically debit `amount`, returning the remaining balance
    ///
    /// Fails with [`CheckError::InsufficientCredits`] and changes nothing when
    /// the balance at the moment of the debit is below `amount`.
    pub fn charge(&self, user_id: UserId, amount: u32) -> Result<u32, CheckError> {
        let debit = self
            .store
            .debit_credits(user_id, amount)
            .map_err(CheckError::internal)?;
        Self::settle(debit, user_id, amount)
    }

    /// Store `record` and debit its `credits_used` as one unit
    ///
    /// On [`CheckError::InsufficientCredits`] the record is not kept and the
    /// balance is unchanged.
    pub fn record_and_charge(&self, record: &FactCheckRecord) -> Result<u32, CheckError> {
        let debit = self
            .store
            .record_and_debit(record)
            .map_err(CheckError::internal)?;
        Self::settle(debit, record.user_id, record.credits_used)
    }

    fn settle(debit: Debit, user_id: UserId, amount: u32) -> Result<u32, CheckError> {
        match debit {
            Debit::Applied { remaining } => Ok(remaining),
            Debit::Insufficient { available } => {
                warn!(
                    "Debit of {} refused for user {}: {} available",
                    amount, user_id, available
                );
                Err(CheckError::InsufficientCredits {
                    required: amount,
                    available,
                })
            }
            Debit::UnknownUser => Err(CheckError::InvalidSession),
        }
    }

    /// Move a user to another plan
    ///
    /// The balance is left alone; the new allotment applies from the next
    /// weekly reset.
    pub fn change_plan(&self, user_id: UserId, plan: &str) -> Result<User, CheckError> {
        let tier = self
            .catalog
            .get(plan)
            .ok_or_else(|| CheckError::Validation(format!("Unknown plan: {}", plan)))?;

        let updated = self
            .store
            .update_plan(user_id, &tier.name)
            .map_err(CheckError::internal)?;
        if !updated {
            return Err(CheckError::NotFound("User not found".to_string()));
        }

        info!("User {} moved to {} plan", user_id, tier.name);
        self.store
            .find_user(user_id)
            .map_err(CheckError::internal)?
            .ok_or_else(|| CheckError::NotFound("User not found".to_string()))
    }
}
