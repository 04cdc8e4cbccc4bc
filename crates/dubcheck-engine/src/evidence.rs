//! Evidence gathering from web search
//!
//! Search is best-effort: every failure becomes an empty source list.

use crate::error::EvidenceError;
use dubcheck_domain::traits::SearchProvider;
use dubcheck_domain::{BestEffort, Source};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Phrase prepended to every search query
pub const QUERY_PREFIX: &str = "fact check verify: ";

/// Characters of the submitted text used in the query
pub const QUERY_TEXT_CHARS: usize = 100;

/// Maximum sources kept from one search
pub const MAX_SOURCES: usize = 5;

/// Build the search query for a submitted text
///
/// # Examples
///
/// ```
/// use dubcheck_engine::derive_query;
///
/// assert_eq!(derive_query("cats can fly"), "fact check verify: cats can fly");
/// ```
pub fn derive_query(text: &str) -> String {
    let head: String = text.chars().take(QUERY_TEXT_CHARS).collect();
    format!("{}{}", QUERY_PREFIX, head)
}

/// Fetches supporting sources for a claim
pub struct EvidenceGatherer<P> {
    provider: Option<P>,
    timeout: Duration,
}

impl<P> EvidenceGatherer<P>
where
    P: SearchProvider,
    P::Error: std::fmt::Display,
{
    /// Create a gatherer; `None` disables search entirely
    pub fn new(provider: Option<P>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Whether a search provider is configured
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Search for sources, never failing
    ///
    /// Returns at most [`MAX_SOURCES`] sources. On any failure the value is an
    /// empty list and the cause is reported alongside it.
    pub async fn search(&self, query: &str) -> BestEffort<Vec<Source>, EvidenceError> {
        let Some(provider) = &self.provider else {
            return BestEffort::fallback(Vec::new(), EvidenceError::NotConfigured);
        };

        match timeout(self.timeout, provider.search(query)).await {
            Ok(Ok(mut sources)) => {
                sources.truncate(MAX_SOURCES);
                debug!("Gathered {} sources", sources.len());
                BestEffort::Complete(sources)
            }
            Ok(Err(e)) => BestEffort::fallback(Vec::new(), EvidenceError::Provider(e.to_string())),
            Err(_) => BestEffort::fallback(Vec::new(), EvidenceError::Timeout),
        }
    }
}
