//! DubCheck Search Provider Layer
//!
//! Web search for fact-check evidence, implementing the `SearchProvider`
//! trait from `dubcheck-domain`.
//!
//! # Providers
//!
//! - `SerperClient`: Google results through the Serper API
//!
//! Errors are returned, not swallowed; turning them into an empty evidence
//! list is the caller's decision.
//!
//! # Examples
//!
//! ```no_run
//! use dubcheck_search::SerperClient;
//! use dubcheck_domain::traits::SearchProvider;
//!
//! # async fn example() -> Result<(), dubcheck_search::SearchError> {
//! let client = SerperClient::new("serper-api-key")?;
//! let sources = client.search("fact check verify: the moon is hollow").await?;
//! println!("{} sources", sources.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

use dubcheck_domain::traits::SearchProvider;
use dubcheck_domain::Source;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default Serper search endpoint
pub const DEFAULT_ENDPOINT: &str = "https://google.serper.dev/search";

/// Default request timeout (10 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Maximum number of results requested and returned
pub const DEFAULT_RESULT_COUNT: usize = 5;

/// Errors that can occur during search
#[derive(Error, Debug)]
pub enum SearchError {
    /// Network or client failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// The request did not complete within the timeout
    #[error("Search timed out")]
    Timeout,

    /// The provider answered with a non-200 status
    #[error("Search provider returned HTTP {0}")]
    Status(u16),

    /// The provider's body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else {
            SearchError::Communication(e.to_string())
        }
    }
}

/// Request body for the Serper search API
#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

/// Response from the Serper search API; only organic results are used
#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Serper API client
pub struct SerperClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
    result_count: usize,
}

impl SerperClient {
    /// Create a client for the public Serper endpoint with the default timeout
    pub fn new(api_key: impl Into<String>) -> Result<Self, SearchError> {
        Self::with_options(
            DEFAULT_ENDPOINT,
            api_key,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client with an explicit endpoint and timeout
    pub fn with_options(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client,
            result_count: DEFAULT_RESULT_COUNT,
        })
    }

    /// Set how many results to request (and keep)
    pub fn with_result_count(mut self, result_count: usize) -> Self {
        self.result_count = result_count;
        self
    }

    /// Run a search against the configured endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, times out, answers with anything
    /// other than 200, or returns a body that is not Serper JSON.
    pub async fn query(&self, query: &str) -> Result<Vec<Source>, SearchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&SerperRequest {
                q: query,
                num: self.result_count,
            })
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let sources = parse_results(&body, self.result_count)?;
        debug!("Search returned {} sources", sources.len());
        Ok(sources)
    }
}

impl SearchProvider for SerperClient {
    type Error = SearchError;

    async fn search(&self, query: &str) -> Result<Vec<Source>, Self::Error> {
        self.query(query).await
    }
}

/// Decode a Serper response body into at most `limit` sources
fn parse_results(body: &str, limit: usize) -> Result<Vec<Source>, SearchError> {
    let response: SerperResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    Ok(response
        .organic
        .into_iter()
        .take(limit)
        .map(|r| Source::new(r.title, r.link, r.snippet))
        .collect())
}
