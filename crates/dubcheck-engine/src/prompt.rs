//! LLM prompt engineering for adjudication

use dubcheck_domain::Source;

/// Number of sources included in the evidence block
pub const EVIDENCE_LIMIT: usize = 3;

/// Fixed persona sent as the system message
pub const SYSTEM_PERSONA: &str = "You are a professional fact-checker. Analyze the given text \
against the provided sources and determine how likely it is to be true.

Provide:
1. A likelihood score from 0.0 to 1.0 (0.0 = definitely false, 1.0 = definitely true)
2. Clear reasoning explaining your assessment
3. References to specific sources when possible

Be objective and balanced in your analysis.";

const OUTPUT_FORMAT_REMINDER: &str = r#"Respond with a JSON object only:
{
  "likelihood_score": float between 0.0 and 1.0,
  "reasoning": "detailed explanation of your assessment"
}"#;

/// Builds the user message for the adjudicator
pub struct PromptBuilder<'a> {
    text: &'a str,
    sources: &'a [Source],
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt for `text` with no evidence
    pub fn new(text: &'a str) -> Self {
        Self { text, sources: &[] }
    }

    /// Attach evidence; only the first [`EVIDENCE_LIMIT`] are used
    pub fn with_sources(mut self, sources: &'a [Source]) -> Self {
        self.sources = sources;
        self
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!("Text to fact-check: \"{}\"\n\n", self.text));

        prompt.push_str("Available sources:\n");
        if self.sources.is_empty() {
            prompt.push_str("(no sources found)\n");
        } else {
            prompt.push_str(&self.evidence_block());
            prompt.push('\n');
        }
        prompt.push('\n');

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }

    /// Numbered evidence entries separated by blank lines
    fn evidence_block(&self) -> String {
        self.sources
            .iter()
            .take(EVIDENCE_LIMIT)
            .enumerate()
            .map(|(i, source)| {
                format!(
                    "Source {}: {}\nURL: {}\nContent: {}",
                    i + 1,
                    source.title,
                    source.url,
                    source.snippet
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
