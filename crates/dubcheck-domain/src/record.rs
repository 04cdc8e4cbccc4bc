//! Fact-check records, evidence sources and verdicts

use crate::user::UserId;
use std::fmt;

/// Unique identifier for a fact-check record, based on UUIDv7
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u128);

impl RecordId {
    /// Generate a new UUIDv7-based RecordId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a RecordId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a RecordId from its hyphenated UUID form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid record id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A piece of web evidence
///
/// Fields are plain text and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Source {
    /// Page title
    pub title: String,

    /// Page URL
    pub url: String,

    /// Excerpt returned by the search provider
    pub snippet: String,
}

impl Source {
    /// Create a source
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// Likelihood score used whenever no real assessment is available
pub const NEUTRAL_SCORE: f64 = 0.5;

/// The adjudicator's assessment of a text
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Likelihood that the text is true, in [0.0, 1.0]
    pub likelihood_score: f64,

    /// Explanation of the score
    pub reasoning: String,
}

impl Verdict {
    /// Build a verdict, clamping the score into [0.0, 1.0]
    ///
    /// Non-finite scores become [`NEUTRAL_SCORE`].
    ///
    /// # Examples
    ///
    /// ```
    /// use dubcheck_domain::Verdict;
    ///
    /// assert_eq!(Verdict::new(1.7, "sure").likelihood_score, 1.0);
    /// assert_eq!(Verdict::new(f64::NAN, "?").likelihood_score, 0.5);
    /// ```
    pub fn new(likelihood_score: f64, reasoning: impl Into<String>) -> Self {
        let likelihood_score = if likelihood_score.is_finite() {
            likelihood_score.clamp(0.0, 1.0)
        } else {
            NEUTRAL_SCORE
        };

        Self {
            likelihood_score,
            reasoning: reasoning.into(),
        }
    }

    /// A neutral verdict carrying an explanation
    pub fn neutral(reasoning: impl Into<String>) -> Self {
        Self::new(NEUTRAL_SCORE, reasoning)
    }
}

/// The stored result of one fact-check
///
/// Immutable once created; a user's records form an append-only log.
#[derive(Debug, Clone, PartialEq)]
pub struct FactCheckRecord {
    /// Record identifier
    pub id: RecordId,

    /// Owning user
    pub user_id: UserId,

    /// Submitted text
    pub text: String,

    /// Likelihood score in [0.0, 1.0]
    pub likelihood_score: f64,

    /// Adjudicator reasoning
    pub reasoning: String,

    /// Evidence used, in search-rank order
    pub sources: Vec<Source>,

    /// Credits charged for this check
    pub credits_used: u32,

    /// Creation time (Unix milliseconds)
    pub created_at: u64,
}

impl FactCheckRecord {
    /// Assemble a new record from a verdict
    pub fn new(
        user_id: UserId,
        text: impl Into<String>,
        verdict: Verdict,
        sources: Vec<Source>,
        credits_used: u32,
        created_at: u64,
    ) -> Self {
        Self {
            id: RecordId::new(),
            user_id,
            text: text.into(),
            likelihood_score: verdict.likelihood_score,
            reasoning: verdict.reasoning,
            sources,
            credits_used,
            created_at,
        }
    }
}
