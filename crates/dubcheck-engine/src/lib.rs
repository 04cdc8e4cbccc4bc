//! DubCheck Engine
//!
//! Credit-metered fact-checking. The engine authorizes a request through its
//! session token, prices the submitted text, gathers web evidence, asks an LLM
//! for a likelihood verdict, records the result and debits the user's balance.
//!
//! # Degraded operation
//!
//! Evidence search and adjudication never fail a request. Without a search
//! credential the evidence list is empty; without an AI credential the verdict
//! is a neutral 0.5. Provider errors and timeouts degrade the same way.
//!
//! # Concurrency
//!
//! Requests for the same user may run concurrently. The balance check before
//! the external calls is advisory; the final debit is a conditional decrement
//! in the store and cannot drive a balance negative.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accounts;
pub mod adjudicator;
pub mod config;
pub mod error;
pub mod evidence;
pub mod ledger;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod sessions;

pub use accounts::Accounts;
pub use adjudicator::{Adjudicator, UNAVAILABLE_REASONING};
pub use config::EngineConfig;
pub use error::{AdjudicationError, CheckError, EvidenceError};
pub use evidence::{derive_query, EvidenceGatherer};
pub use ledger::CreditLedger;
pub use orchestrator::FactCheckOrchestrator;
pub use parser::parse_verdict;
pub use prompt::PromptBuilder;
pub use sessions::SessionStore;
