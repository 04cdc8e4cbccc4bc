//! JSON wire types and conversions from domain types
//!
//! Domain types stay free of serde; everything the API returns is shaped here.

use dubcheck_domain::{FactCheckRecord, PlanCatalog, PlanTier, Session, Source, User};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    /// User identifier
    pub id: String,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Plan name
    pub plan: String,
    /// Current credit balance
    pub credits: u32,
    /// Next weekly reset (Unix seconds)
    pub credits_reset_date: u64,
    /// Registration time (Unix seconds)
    pub created_at: u64,
    /// Whether the account is active
    pub is_active: bool,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            plan: user.plan.clone(),
            credits: user.credits,
            credits_reset_date: user.credits_reset_at,
            created_at: user.created_at,
            is_active: user.is_active,
        }
    }
}

/// Response to register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Bearer token for later requests
    pub session_id: String,
    /// The session's user
    pub user: UserDto,
}

impl SessionResponse {
    /// Pair a new session with its user
    pub fn new(session: &Session, user: &User) -> Self {
        Self {
            session_id: session.token.clone(),
            user: user.into(),
        }
    }
}

/// One piece of evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDto {
    /// Result title
    pub title: String,
    /// Result URL
    pub url: String,
    /// Result snippet
    pub snippet: String,
}

impl From<&Source> for SourceDto {
    fn from(source: &Source) -> Self {
        Self {
            title: source.title.clone(),
            url: source.url.clone(),
            snippet: source.snippet.clone(),
        }
    }
}

/// A stored fact-check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactCheckDto {
    /// Record identifier
    pub id: String,
    /// Submitted text
    pub text: String,
    /// Likelihood the text is true, 0.0 to 1.0
    pub likelihood_score: f64,
    /// Assessment reasoning
    pub reasoning: String,
    /// Evidence in search-rank order
    pub sources: Vec<SourceDto>,
    /// Credits charged
    pub credits_used: u32,
    /// Creation time (Unix milliseconds)
    pub created_at: u64,
}

impl From<&FactCheckRecord> for FactCheckDto {
    fn from(record: &FactCheckRecord) -> Self {
        Self {
            id: record.id.to_string(),
            text: record.text.clone(),
            likelihood_score: record.likelihood_score,
            reasoning: record.reasoning.clone(),
            sources: record.sources.iter().map(SourceDto::from).collect(),
            credits_used: record.credits_used,
            created_at: record.created_at,
        }
    }
}

/// A subscription tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDto {
    /// Tier name
    pub plan_name: String,
    /// Credits granted each week
    pub weekly_credits: u32,
    /// Priority processing flag
    pub priority_processing: bool,
    /// Video analysis flag
    pub video_analysis: bool,
    /// Family member limit
    pub max_family_members: u32,
}

impl From<&PlanTier> for PlanDto {
    fn from(tier: &PlanTier) -> Self {
        Self {
            plan_name: tier.name.clone(),
            weekly_credits: tier.weekly_credits,
            priority_processing: tier.priority_processing,
            video_analysis: tier.video_analysis,
            max_family_members: tier.max_family_members,
        }
    }
}

/// The plan catalog keyed by tier name
pub fn plans_by_name(catalog: &PlanCatalog) -> BTreeMap<String, PlanDto> {
    catalog
        .tiers()
        .iter()
        .map(|tier| (tier.name.clone(), PlanDto::from(tier)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dubcheck_domain::{UserId, Verdict};

    #[test]
    fn test_user_dto_fields() {
        let user = User::register("a@example.com", "A", 30, 100, 604_800);
        let json = serde_json::to_value(UserDto::from(&user)).unwrap();

        assert_eq!(json["email"], "a@example.com");
        assert_eq!(json["plan"], "free");
        assert_eq!(json["credits"], 30);
        assert_eq!(json["credits_reset_date"], 604_900);
        assert_eq!(json["is_active"], true);
        assert_eq!(json["id"], user.id.to_string());
    }

    #[test]
    fn test_fact_check_dto_fields() {
        let record = FactCheckRecord::new(
            UserId::new(),
            "claim",
            Verdict::new(0.25, "unlikely"),
            vec![Source::new("T", "https://t.example", "S")],
            2,
            500,
        );
        let json = serde_json::to_value(FactCheckDto::from(&record)).unwrap();

        assert_eq!(json["likelihood_score"], 0.25);
        assert_eq!(json["credits_used"], 2);
        assert_eq!(json["sources"][0]["url"], "https://t.example");
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_plans_keyed_by_name() {
        let plans = plans_by_name(&PlanCatalog::standard());
        assert_eq!(plans.len(), 5);
        assert_eq!(plans["family_premium"].max_family_members, 5);
        assert_eq!(plans["pro"].weekly_credits, 100);
    }
}
