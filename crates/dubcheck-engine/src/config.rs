//! Configuration for the fact-check engine

use dubcheck_domain::time::WEEK_SECS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables shared by the engine components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lifetime of a new session (seconds)
    pub session_ttl_secs: u64,

    /// Length of a credit period; resets push the next reset this far out
    pub credit_period_secs: u64,

    /// Maximum records returned by a history listing
    pub history_limit: usize,

    /// Upper bound on an evidence search (seconds)
    pub search_timeout_secs: u64,

    /// Upper bound on an adjudication call, retries included (seconds)
    pub adjudication_timeout_secs: u64,
}

impl EngineConfig {
    /// Session lifetime as a Duration
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Search timeout as a Duration
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    /// Adjudication timeout as a Duration
    pub fn adjudication_timeout(&self) -> Duration {
        Duration::from_secs(self.adjudication_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.session_ttl_secs == 0 {
            return Err("session_ttl_secs must be greater than 0".to_string());
        }
        if self.credit_period_secs == 0 {
            return Err("credit_period_secs must be greater than 0".to_string());
        }
        if self.history_limit == 0 {
            return Err("history_limit must be greater than 0".to_string());
        }
        if self.search_timeout_secs == 0 {
            return Err("search_timeout_secs must be greater than 0".to_string());
        }
        if self.adjudication_timeout_secs == 0 {
            return Err("adjudication_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: WEEK_SECS,
            credit_period_secs: WEEK_SECS,
            history_limit: 20,
            search_timeout_secs: 10,
            adjudication_timeout_secs: 30,
        }
    }
}
