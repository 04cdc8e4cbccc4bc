//! DubCheck Domain Layer
//!
//! Core entities and business rules for the DubCheck fact-checking service.
//! The only external dependency is `uuid`; everything else (storage, HTTP,
//! LLM access) lives in infrastructure crates behind the traits defined here.
//!
//! ## Key Concepts
//!
//! - **User**: the account that owns a credit balance and a plan tier
//! - **Session**: an opaque bearer token bound to a user for a bounded window
//! - **Plan tier**: a named bundle of entitlements, looked up in a [`PlanCatalog`]
//! - **Credit**: the unit debited per fact-check, priced by word count
//! - **Fact-check record**: the immutable result of one adjudicated submission
//!
//! ## Architecture
//!
//! - No I/O, no async runtime
//! - Serialization happens at the transport boundary, not here
//! - Trait definitions for persistence, search and LLM collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod credits;
pub mod outcome;
pub mod plan;
pub mod record;
pub mod session;
pub mod time;
pub mod traits;
pub mod user;

// Re-exports for convenience
pub use credits::{cost_of, word_count};
pub use outcome::BestEffort;
pub use plan::{PlanCatalog, PlanTier, DEFAULT_PLAN};
pub use record::{FactCheckRecord, RecordId, Source, Verdict};
pub use session::Session;
pub use user::{User, UserId};
