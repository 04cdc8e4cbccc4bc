//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files: bind address, database location, search
//! and AI provider credentials, and engine tunables. Provider keys may also
//! come from `SERPER_API_KEY` and `OPENAI_API_KEY`.

use dubcheck_engine::EngineConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the search provider key
pub const SERPER_KEY_VAR: &str = "SERPER_API_KEY";

/// Environment variable holding the AI provider key
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub bind_address: String,

    /// Bind port (default: 8001)
    pub bind_port: u16,

    /// SQLite database file, or ":memory:"
    pub database_path: String,

    /// Web search provider
    pub search: SearchConfig,

    /// AI provider
    pub llm: LlmConfig,

    /// Engine tunables
    pub engine: EngineConfig,
}

/// Search provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// API key; empty disables search
    pub api_key: String,

    /// Search endpoint URL
    pub endpoint: String,

    /// Per-search timeout in seconds
    pub timeout_secs: u64,

    /// Results requested per search
    pub result_count: usize,
}

/// AI provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key; empty disables adjudication
    pub api_key: String,

    /// Base URL of the chat completions API
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Completion token budget
    pub max_tokens: u32,

    /// Overall adjudication timeout in seconds, retries included
    pub timeout_secs: u64,

    /// Attempts per adjudication
    pub max_retries: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            bind_port: 8001,
            database_path: "dubcheck.db".to_string(),
            search: SearchConfig::default(),
            llm: LlmConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: dubcheck_search::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: dubcheck_search::DEFAULT_TIMEOUT_SECS,
            result_count: dubcheck_search::DEFAULT_RESULT_COUNT,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        use dubcheck_llm::openai;

        Self {
            api_key: String::new(),
            endpoint: openai::DEFAULT_ENDPOINT.to_string(),
            model: openai::DEFAULT_MODEL.to_string(),
            max_tokens: openai::DEFAULT_MAX_TOKENS,
            timeout_secs: openai::DEFAULT_TIMEOUT_SECS,
            max_retries: openai::DEFAULT_MAX_RETRIES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file, then apply environment keys
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string, then apply environment keys
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        let config = config.with_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Fill empty provider keys from the environment
    ///
    /// `lookup` resolves a variable name; keys set in the file win.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.search.api_key.is_empty() {
            if let Some(key) = lookup(SERPER_KEY_VAR) {
                self.search.api_key = key.trim().to_string();
            }
        }
        if self.llm.api_key.is_empty() {
            if let Some(key) = lookup(OPENAI_KEY_VAR) {
                self.llm.api_key = key.trim().to_string();
            }
        }
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_port == 0 {
            return Err(ConfigError::Invalid("bind_port must be non-zero".to_string()));
        }
        if self.database_path.is_empty() {
            return Err(ConfigError::Invalid("database_path must be set".to_string()));
        }
        if self.search.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "search.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.search.result_count == 0 {
            return Err(ConfigError::Invalid(
                "search.result_count must be greater than 0".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }
        self.engine_config().validate().map_err(ConfigError::Invalid)
    }

    /// Create a default configuration for testing
    ///
    /// In-memory database, no provider keys, no environment lookup.
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8001,
            database_path: ":memory:".to_string(),
            ..ServerConfig::default()
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Engine settings with the provider timeouts applied
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            search_timeout_secs: self.search.timeout_secs,
            adjudication_timeout_secs: self.llm.timeout_secs,
            ..self.engine.clone()
        }
    }

    /// Search key, if search is configured
    pub fn search_key(&self) -> Option<&str> {
        non_empty(&self.search.api_key)
    }

    /// AI key, if adjudication is configured
    pub fn llm_key(&self) -> Option<&str> {
        non_empty(&self.llm.api_key)
    }
}

fn non_empty(key: &str) -> Option<&str> {
    let key = key.trim();
    (!key.is_empty()).then_some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_port, 8001);
        assert_eq!(config.database_path, "dubcheck.db");
        assert_eq!(config.search.result_count, 5);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.engine.history_limit, 20);
        assert!(config.search_key().is_none());
        assert!(config.llm_key().is_none());
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:8001");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "127.0.0.1"
            bind_port = 9000
            database_path = "/var/lib/dubcheck/data.db"

            [search]
            api_key = "serper-key"
            timeout_secs = 5

            [llm]
            api_key = "sk-file"
            model = "gpt-4o-mini"
            max_retries = 3

            [engine]
            history_limit = 50
        "#;

        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.search_key(), Some("serper-key"));
        assert_eq!(config.search.endpoint, "https://google.serper.dev/search");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_retries, 3);
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.engine.history_limit, 50);

        let engine = config.engine_config();
        assert_eq!(engine.search_timeout_secs, 5);
        assert_eq!(engine.adjudication_timeout_secs, 30);
        assert_eq!(engine.history_limit, 50);
    }

    #[test]
    fn test_env_fills_empty_keys_only() {
        let config = ServerConfig {
            llm: LlmConfig {
                api_key: "sk-file".to_string(),
                ..LlmConfig::default()
            },
            ..ServerConfig::default()
        };

        let config = config.with_env_overrides(|name| match name {
            SERPER_KEY_VAR => Some("serper-env".to_string()),
            OPENAI_KEY_VAR => Some("sk-env".to_string()),
            _ => None,
        });

        assert_eq!(config.search_key(), Some("serper-env"));
        assert_eq!(config.llm_key(), Some("sk-file"));
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let config = ServerConfig::default().with_env_overrides(|_| Some("   ".to_string()));
        assert!(config.search_key().is_none());
        assert!(config.llm_key().is_none());
    }

    #[test]
    fn test_validation() {
        let mut config = ServerConfig::default_test_config();
        assert!(config.validate().is_ok());

        config.bind_port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ServerConfig::default_test_config();
        config.llm.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ServerConfig::default_test_config();
        config.engine.history_limit = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ServerConfig::from_toml("bind_port = \"not a number\""),
            Err(ConfigError::TomlParse(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml("bind_port = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }
}
