//! The fact-check flow: authorize, price, gather, adjudicate, record, charge

use crate::adjudicator::Adjudicator;
use crate::config::EngineConfig;
use crate::error::{AdjudicationError, CheckError, EvidenceError};
use crate::evidence::{derive_query, EvidenceGatherer};
use crate::ledger::CreditLedger;
use crate::sessions::SessionStore;
use dubcheck_domain::time::record_millis;
use dubcheck_domain::traits::{AccountStore, LlmProvider, SearchProvider};
use dubcheck_domain::{BestEffort, FactCheckRecord, PlanCatalog};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs fact-checks for authenticated users
pub struct FactCheckOrchestrator<S, P, L> {
    store: Arc<S>,
    sessions: SessionStore<S>,
    ledger: CreditLedger<S>,
    gatherer: EvidenceGatherer<P>,
    adjudicator: Adjudicator<L>,
    history_limit: usize,
}

impl<S, P, L> FactCheckOrchestrator<S, P, L>
where
    S: AccountStore,
    S::Error: std::fmt::Display,
    P: SearchProvider,
    P::Error: std::fmt::Display,
    L: LlmProvider,
    L::Error: std::fmt::Display,
{
    /// Wire the flow from its parts
    ///
    /// `search` and `llm` are `None` when the matching credential is not
    /// configured; the flow then runs with empty evidence or a neutral
    /// verdict respectively.
    pub fn new(
        store: Arc<S>,
        catalog: Arc<PlanCatalog>,
        config: &EngineConfig,
        search: Option<P>,
        llm: Option<L>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(Arc::clone(&store), config.session_ttl_secs),
            ledger: CreditLedger::new(Arc::clone(&store), catalog, config.credit_period_secs),
            gatherer: EvidenceGatherer::new(search, config.search_timeout()),
            adjudicator: Adjudicator::new(llm, config.adjudication_timeout()),
            history_limit: config.history_limit,
            store,
        }
    }

    /// Session resolution used by this flow
    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }

    /// Credit ledger used by this flow
    pub fn ledger(&self) -> &CreditLedger<S> {
        &self.ledger
    }

    /// Fact-check `text` on behalf of the session's user
    ///
    /// Session and credit failures abort before any external call. Search and
    /// AI failures degrade to empty evidence and a neutral verdict. The record
    /// is stored and charged in one transaction: a charged check always has a
    /// record, and a refused charge leaves none.
    pub async fn handle(&self, token: &str, text: &str) -> Result<FactCheckRecord, CheckError> {
        let user = self.sessions.resolve(token)?;

        if text.trim().is_empty() {
            return Err(CheckError::Validation("Text is required".to_string()));
        }

        let user = self.ledger.ensure_fresh_balance(user)?;
        let cost = self.ledger.cost_of(text);

        // Advisory; the debit below is the authoritative check
        if user.credits < cost {
            debug!(
                "User {} has {} credits, request costs {}",
                user.id, user.credits, cost
            );
            return Err(CheckError::InsufficientCredits {
                required: cost,
                available: user.credits,
            });
        }

        let sources = match self.gatherer.search(&derive_query(text)).await {
            BestEffort::Complete(sources) => sources,
            BestEffort::Fallback { value, cause } => {
                match cause {
                    EvidenceError::NotConfigured => debug!("Search not configured, no evidence"),
                    other => warn!("Evidence search degraded: {}", other),
                }
                value
            }
        };

        let verdict = match self.adjudicator.assess(text, &sources).await {
            BestEffort::Complete(verdict) => verdict,
            BestEffort::Fallback { value, cause } => {
                match cause {
                    AdjudicationError::NotConfigured => {
                        debug!("AI not configured, neutral verdict")
                    }
                    other => warn!("Adjudication degraded: {}", other),
                }
                value
            }
        };

        let record = FactCheckRecord::new(user.id, text, verdict, sources, cost, record_millis());
        // A concurrent request may have spent the balance after the advisory check
        self.ledger.record_and_charge(&record)?;

        info!(
            "Fact-check {} for user {}: score {:.2}, {} sources, {} credits",
            record.id,
            user.id,
            record.likelihood_score,
            record.sources.len(),
            cost
        );
        Ok(record)
    }

    /// The session user's most recent fact-checks, newest first
    pub fn history(&self, token: &str) -> Result<Vec<FactCheckRecord>, CheckError> {
        let user = self.sessions.resolve(token)?;
        self.store
            .recent_records(user.id, self.history_limit)
            .map_err(CheckError::internal)
    }
}
