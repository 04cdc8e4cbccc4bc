//! Error types for the engine

use std::fmt::Display;
use thiserror::Error;

/// Errors that abort a request
///
/// Each variant maps to one caller-visible outcome; see the server crate for
/// the HTTP status mapping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// Missing or malformed input, or a duplicate registration
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Token absent, unknown, expired, or pointing at a missing user
    #[error("Invalid session")]
    InvalidSession,

    /// The balance does not cover the request
    #[error("Insufficient credits: {required} required, {available} available")]
    InsufficientCredits {
        /// Credits the request costs
        required: u32,
        /// Credits the user has
        available: u32,
    },

    /// Persistence or other infrastructure fault
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CheckError {
    /// Wrap an infrastructure error
    pub fn internal(e: impl Display) -> Self {
        CheckError::Internal(e.to_string())
    }
}

/// Why evidence gathering fell back to an empty source list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvidenceError {
    /// No search credential configured
    #[error("Search provider not configured")]
    NotConfigured,

    /// The search exceeded its time budget
    #[error("Search timed out")]
    Timeout,

    /// The provider reported a failure
    #[error("Search failed: {0}")]
    Provider(String),
}

/// Why adjudication fell back to a neutral verdict
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdjudicationError {
    /// No AI credential configured
    #[error("AI provider not configured")]
    NotConfigured,

    /// The model call exceeded its time budget
    #[error("AI call timed out")]
    Timeout,

    /// The provider reported a failure
    #[error("AI call failed: {0}")]
    Provider(String),
}
