//! Parse LLM output into a verdict

use dubcheck_domain::record::NEUTRAL_SCORE;
use dubcheck_domain::Verdict;
use serde_json::Value;
use tracing::{debug, warn};

/// Field the model is asked to put the score in
const SCORE_FIELD: &str = "likelihood_score";

/// Reasoning used when a structured reply omits it
const DEFAULT_REASONING: &str = "Analysis completed";

/// Parse a model reply into a verdict
///
/// The reply is first read as a JSON object (optionally inside a markdown code
/// block). If that fails, the raw reply becomes the reasoning and the score is
/// scraped from the first line mentioning `likelihood_score`, defaulting to
/// 0.5. Scores outside [0, 1] are clamped.
pub fn parse_verdict(reply: &str) -> Verdict {
    let (score, reasoning) = match parse_structured(reply) {
        Some(parsed) => parsed,
        None => {
            debug!("Reply is not a structured verdict, scanning lines");
            (scan_score(reply).unwrap_or(NEUTRAL_SCORE), reply.to_string())
        }
    };

    if !(0.0..=1.0).contains(&score) {
        warn!("Model returned out-of-range score {}, clamping", score);
    }

    Verdict::new(score, reasoning)
}

/// Strict path: a JSON object with a numeric (or numeric string) score
fn parse_structured(reply: &str) -> Option<(f64, String)> {
    let json: Value = serde_json::from_str(&extract_json(reply)).ok()?;
    let obj = json.as_object()?;

    let score = match obj.get(SCORE_FIELD) {
        None | Some(Value::Null) => NEUTRAL_SCORE,
        Some(Value::Number(n)) => n.as_f64()?,
        Some(Value::String(s)) => s.trim().parse().ok()?,
        Some(_) => return None,
    };

    let reasoning = match obj.get("reasoning") {
        None | Some(Value::Null) => DEFAULT_REASONING.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    Some((score, reasoning))
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> String {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        // Skip first line (```json or ```) and last line (```)
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() >= 2 {
            let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
                lines.len() - 1
            } else {
                lines.len()
            };
            return lines[1..end].join("\n");
        }
    }

    trimmed.to_string()
}

/// Fallback path: the number after the first colon on a line naming the score
fn scan_score(reply: &str) -> Option<f64> {
    reply
        .lines()
        .filter(|line| line.to_lowercase().contains(SCORE_FIELD))
        .find_map(|line| {
            let value = line.split(':').nth(1)?;
            value
                .trim()
                .trim_matches(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
                .parse::<f64>()
                .ok()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let verdict =
            parse_verdict(r#"{"likelihood_score": 0.82, "reasoning": "Multiple sources agree."}"#);
        assert_eq!(verdict.likelihood_score, 0.82);
        assert_eq!(verdict.reasoning, "Multiple sources agree.");
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let reply =
            "```json\n{\n  \"likelihood_score\": 0.1,\n  \"reasoning\": \"Debunked.\"\n}\n```";
        let verdict = parse_verdict(reply);
        assert_eq!(verdict.likelihood_score, 0.1);
        assert_eq!(verdict.reasoning, "Debunked.");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let verdict = parse_verdict("{}");
        assert_eq!(verdict.likelihood_score, 0.5);
        assert_eq!(verdict.reasoning, "Analysis completed");
    }

    #[test]
    fn test_numeric_string_score() {
        let verdict = parse_verdict(r#"{"likelihood_score": " 0.3 ", "reasoning": "Doubtful."}"#);
        assert_eq!(verdict.likelihood_score, 0.3);
    }

    #[test]
    fn test_out_of_range_clamped() {
        assert_eq!(parse_verdict(r#"{"likelihood_score": 7}"#).likelihood_score, 1.0);
        assert_eq!(parse_verdict(r#"{"likelihood_score": -2}"#).likelihood_score, 0.0);
        assert_eq!(parse_verdict("likelihood_score: 85").likelihood_score, 1.0);
    }

    #[test]
    fn test_fallback_scans_lines() {
        let reply = "Here is my assessment.\n\"likelihood_score\": 0.35,\n\
                     \"reasoning\": \"Mixed evidence\"\nThanks";
        let verdict = parse_verdict(reply);
        assert_eq!(verdict.likelihood_score, 0.35);
        assert_eq!(verdict.reasoning, reply);
    }

    #[test]
    fn test_fallback_first_numeric_line_wins() {
        let reply = "Likelihood_Score: unknown\nlikelihood_score: 0.6\nlikelihood_score: 0.9";
        assert_eq!(parse_verdict(reply).likelihood_score, 0.6);
    }

    #[test]
    fn test_fallback_without_score() {
        let reply = "I cannot determine this.";
        let verdict = parse_verdict(reply);
        assert_eq!(verdict.likelihood_score, 0.5);
        assert_eq!(verdict.reasoning, reply);
    }

    #[test]
    fn test_non_numeric_structured_score_falls_back() {
        let reply = r#"{"likelihood_score": "high", "reasoning": "x"}"#;
        let verdict = parse_verdict(reply);
        assert_eq!(verdict.likelihood_score, 0.5);
        assert_eq!(verdict.reasoning, reply);
    }

    #[test]
    fn test_json_array_is_not_structured() {
        let verdict = parse_verdict("[0.9]");
        assert_eq!(verdict.likelihood_score, 0.5);
        assert_eq!(verdict.reasoning, "[0.9]");
    }
}
