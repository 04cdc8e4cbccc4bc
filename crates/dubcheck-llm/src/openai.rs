//! OpenAI Provider Implementation
//!
//! Chat completions against the OpenAI API or any server exposing the same
//! `/v1/chat/completions` contract.
//!
//! # Features
//!
//! - Async HTTP communication
//! - Configurable endpoint, model and token budget
//! - Retry logic with exponential backoff
//! - Per-request timeout
//!
//! # Examples
//!
//! ```no_run
//! use dubcheck_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new("sk-...", "gpt-4o").unwrap();
//! ```

use crate::LlmError;
use dubcheck_domain::traits::LlmProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default OpenAI API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default timeout for a single request (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default completion budget
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// OpenAI-compatible chat provider
pub struct OpenAiProvider {
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider for the public OpenAI endpoint
    ///
    /// # Parameters
    ///
    /// - `api_key`: Bearer credential
    /// - `model`: Model to use (e.g., "gpt-4o")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_options(
            DEFAULT_ENDPOINT,
            api_key,
            model,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a provider with an explicit endpoint and request timeout
    pub fn with_options(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the completion token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// The configured model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one chat exchange
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The credential is rejected
    /// - The model does not exist
    /// - Network communication fails on every attempt
    /// - Response format is invalid
    pub async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.endpoint);

        let request_body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
        };

        // Retry logic with exponential backoff
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body: ChatResponse = response.json().await.map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        })?;
                        return extract_content(body);
                    }

                    match status {
                        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                            return Err(LlmError::Unauthorized);
                        }
                        reqwest::StatusCode::NOT_FOUND => {
                            return Err(LlmError::ModelNotAvailable(self.model.clone()));
                        }
                        reqwest::StatusCode::TOO_MANY_REQUESTS => {
                            last_error = Some(LlmError::RateLimitExceeded);
                        }
                        _ => {
                            let error_text = response
                                .text()
                                .await
                                .unwrap_or_else(|_| "Unknown error".to_string());
                            last_error = Some(LlmError::Communication(format!(
                                "HTTP {}: {}",
                                status, error_text
                            )));
                        }
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("LLM request failed, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

fn extract_content(body: ChatResponse) -> Result<String, LlmError> {
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("Response contained no message".to_string()))?;

    debug!("LLM reply length: {} chars", content.len());
    Ok(content)
}

impl LlmProvider for OpenAiProvider {
    type Error = LlmError;

    async fn chat(&self, system: &str, prompt: &str) -> Result<String, Self::Error> {
        self.complete(system, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = OpenAiProvider::new("key", "gpt-4o").unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model(), "gpt-4o");
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(provider.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let provider =
            OpenAiProvider::with_options("http://llm.local/", "k", "m", Duration::from_secs(1))
                .unwrap();
        assert_eq!(provider.endpoint, "http://llm.local");
    }

    #[test]
    fn test_builders() {
        let provider = OpenAiProvider::new("key", "gpt-4o")
            .unwrap()
            .with_max_retries(0)
            .with_max_tokens(256);
        assert_eq!(provider.max_retries, 1, "At least one attempt is always made");
        assert_eq!(provider.max_tokens, 256);
    }

    #[test]
    fn test_extract_content() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "hi"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(body).unwrap(), "hi");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(extract_content(empty), Err(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_error_handling() {
        // Use invalid endpoint to trigger error
        let provider =
            OpenAiProvider::with_options("http://localhost:99999", "k", "m", Duration::from_secs(1))
                .unwrap()
                .with_max_retries(1);

        let result = provider.chat("system", "test").await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    #[tokio::test]
    async fn test_round_trip_against_local_server() {
        use axum::{http::HeaderMap, routing::post, Json, Router};
        use serde_json::{json, Value};

        async fn fake_chat(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let echo = format!(
                "{}|{}|{}|{}",
                auth,
                body["messages"][0]["role"].as_str().unwrap_or_default(),
                body["messages"][1]["content"].as_str().unwrap_or_default(),
                body["max_tokens"],
            );
            Json(json!({"choices": [{"message": {"role": "assistant", "content": echo}}]}))
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let app = Router::new().route("/v1/chat/completions", post(fake_chat));
            axum::serve(listener, app).await.unwrap();
        });

        let provider = OpenAiProvider::with_options(
            format!("http://{}", addr),
            "sk-test",
            "gpt-4o",
            Duration::from_secs(5),
        )
        .unwrap();

        let reply = provider.chat("persona", "is water wet?").await.unwrap();
        assert_eq!(reply, "Bearer sk-test|system|is water wet?|1000");
    }
}
