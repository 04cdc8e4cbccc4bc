//! AI adjudication of a claim against gathered evidence

use crate::error::AdjudicationError;
use crate::parser::parse_verdict;
use crate::prompt::{PromptBuilder, SYSTEM_PERSONA};
use dubcheck_domain::traits::LlmProvider;
use dubcheck_domain::{BestEffort, Source, Verdict};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Reasoning returned when no AI credential is configured
pub const UNAVAILABLE_REASONING: &str = "AI fact-checking unavailable - API key not configured";

/// Scores a claim with an LLM, degrading to a neutral verdict
pub struct Adjudicator<L> {
    provider: Option<L>,
    timeout: Duration,
}

impl<L> Adjudicator<L>
where
    L: LlmProvider,
    L::Error: std::fmt::Display,
{
    /// Create an adjudicator; `None` means no AI credential is configured
    pub fn new(provider: Option<L>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Whether an AI provider is configured
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Assess `text` against `sources`, never failing
    ///
    /// The verdict score is always within [0, 1]. Transport errors, model errors
    /// and timeouts all produce a neutral 0.5 verdict whose reasoning names the
    /// failure.
    pub async fn assess(
        &self,
        text: &str,
        sources: &[Source],
    ) -> BestEffort<Verdict, AdjudicationError> {
        let Some(provider) = &self.provider else {
            return BestEffort::fallback(
                Verdict::neutral(UNAVAILABLE_REASONING),
                AdjudicationError::NotConfigured,
            );
        };

        let prompt = PromptBuilder::new(text).with_sources(sources).build();
        debug!("Adjudication prompt is {} chars", prompt.len());

        match timeout(self.timeout, provider.chat(SYSTEM_PERSONA, &prompt)).await {
            Ok(Ok(reply)) => BestEffort::Complete(parse_verdict(&reply)),
            Ok(Err(e)) => {
                let cause = AdjudicationError::Provider(e.to_string());
                BestEffort::fallback(
                    Verdict::neutral(format!("Error during AI analysis: {}", e)),
                    cause,
                )
            }
            Err(_) => BestEffort::fallback(
                Verdict::neutral(format!(
                    "Error during AI analysis: no response within {}s",
                    self.timeout.as_secs()
                )),
                AdjudicationError::Timeout,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(Result<String, String>);

    impl LlmProvider for Scripted {
        type Error = String;

        async fn chat(&self, _system: &str, _prompt: &str) -> Result<String, Self::Error> {
            self.0.clone()
        }
    }

    struct Silent;

    impl LlmProvider for Silent {
        type Error = String;

        async fn chat(&self, _system: &str, _prompt: &str) -> Result<String, Self::Error> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_unconfigured_is_neutral() {
        let adjudicator: Adjudicator<Scripted> = Adjudicator::new(None, Duration::from_secs(1));
        let outcome = adjudicator.assess("claim", &[]).await;
        assert_eq!(outcome.cause(), Some(&AdjudicationError::NotConfigured));
        let verdict = outcome.into_value();
        assert_eq!(verdict.likelihood_score, 0.5);
        assert!(verdict.reasoning.contains("unavailable"));
    }

    #[tokio::test]
    async fn test_reply_is_parsed() {
        let adjudicator = Adjudicator::new(
            Some(Scripted(Ok(
                r#"{"likelihood_score": 0.9, "reasoning": "Well documented."}"#.to_string(),
            ))),
            Duration::from_secs(1),
        );
        let outcome = adjudicator.assess("claim", &[]).await;
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.value().likelihood_score, 0.9);
        assert_eq!(outcome.value().reasoning, "Well documented.");
    }

    #[tokio::test]
    async fn test_provider_error_is_neutral() {
        let adjudicator = Adjudicator::new(
            Some(Scripted(Err("rate limited".to_string()))),
            Duration::from_secs(1),
        );
        let outcome = adjudicator.assess("claim", &[]).await;
        assert!(outcome.is_fallback());
        let verdict = outcome.into_value();
        assert_eq!(verdict.likelihood_score, 0.5);
        assert_eq!(verdict.reasoning, "Error during AI analysis: rate limited");
    }

    #[tokio::test]
    async fn test_timeout_is_neutral() {
        let adjudicator = Adjudicator::new(Some(Silent), Duration::from_millis(50));
        let outcome = adjudicator.assess("claim", &[]).await;
        assert_eq!(outcome.cause(), Some(&AdjudicationError::Timeout));
        assert_eq!(outcome.value().likelihood_score, 0.5);
    }
}
