//! DubCheck LLM Provider Layer
//!
//! Chat-style LLM providers implementing the `LlmProvider` trait from
//! `dubcheck-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//!
//! # Examples
//!
//! ```
//! use dubcheck_llm::MockProvider;
//! use dubcheck_domain::traits::LlmProvider;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.chat("You are terse.", "test prompt").await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;

use dubcheck_domain::traits::LlmProvider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Credentials rejected by the provider
    #[error("Authentication failed")]
    Unauthorized,

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls. Responses are keyed by the user prompt.
///
/// # Examples
///
/// ```
/// use dubcheck_llm::MockProvider;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// provider.add_error("prompt2");
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, Result<String, String>>>>,
    call_count: Arc<Mutex<usize>>,
    last_system: Arc<Mutex<Option<String>>>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_system: Arc::new(Mutex::new(None)),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// A provider that fails every call
    pub fn failing(message: impl Into<String>) -> Self {
        let provider = Self::new("");
        provider.set_default_error(message);
        provider
    }

    fn set_default_error(&self, message: impl Into<String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(String::new(), Err(message.into()));
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(prompt.into(), Ok(response.into()));
        }
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(prompt.into(), Err("Mock error".to_string()));
        }
    }

    /// Get the number of times chat was called
    pub fn call_count(&self) -> usize {
        self.call_count.lock().map(|c| *c).unwrap_or_default()
    }

    /// The system message of the most recent call
    pub fn last_system(&self) -> Option<String> {
        self.last_system.lock().ok().and_then(|s| s.clone())
    }

    /// The user prompt of the most recent call
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }

    fn respond(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut count) = self.call_count.lock() {
            *count += 1;
        }
        if let Ok(mut last) = self.last_system.lock() {
            *last = Some(system.to_string());
        }
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }

        let responses = self
            .responses
            .lock()
            .map_err(|_| LlmError::Other("Mock state poisoned".to_string()))?;

        // Exact prompt first, then the catch-all entry under the empty key
        match responses.get(prompt).or_else(|| responses.get("")) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(message)) => Err(LlmError::Other(message.clone())),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn chat(&self, system: &str, prompt: &str) -> Result<String, Self::Error> {
        self.respond(system, prompt)
    }
}
