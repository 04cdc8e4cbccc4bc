//! DubCheck Server
//!
//! HTTP surface of the DubCheck fact-checking API. Wires the SQLite store,
//! the Serper search client and the OpenAI adjudicator into the engine and
//! serves it with axum.

#![warn(missing_docs)]

pub mod config;
pub mod conversions;
pub mod handlers;

use config::ServerConfig;
use dubcheck_domain::PlanCatalog;
use dubcheck_engine::{Accounts, CreditLedger, FactCheckOrchestrator, SessionStore};
use dubcheck_llm::{LlmError, OpenAiProvider};
use dubcheck_search::{SearchError, SerperClient};
use dubcheck_store::{SqliteStore, StoreError};
use handlers::{create_router, AppState};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Search client could not be built
    #[error("Search client error: {0}")]
    Search(#[from] SearchError),

    /// AI client could not be built
    #[error("AI client error: {0}")]
    Llm(#[from] LlmError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the shared state from configuration
///
/// Providers whose key is empty are left out; the engine then runs in its
/// degraded mode for that provider.
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    config.validate()?;
    let engine = config.engine_config();

    let store = Arc::new(SqliteStore::new(&config.database_path)?);
    let catalog = Arc::new(PlanCatalog::standard());

    let search = match config.search_key() {
        Some(key) => Some(
            SerperClient::with_options(
                config.search.endpoint.as_str(),
                key,
                Duration::from_secs(config.search.timeout_secs),
            )?
            .with_result_count(config.search.result_count),
        ),
        None => None,
    };

    let llm = match config.llm_key() {
        Some(key) => Some(
            OpenAiProvider::with_options(
                config.llm.endpoint.as_str(),
                key,
                config.llm.model.as_str(),
                Duration::from_secs(config.llm.timeout_secs),
            )?
            .with_max_tokens(config.llm.max_tokens)
            .with_max_retries(config.llm.max_retries),
        ),
        None => None,
    };

    info!(
        "Search provider: {}",
        if search.is_some() { "configured" } else { "not configured" }
    );
    info!(
        "AI provider: {}",
        if llm.is_some() { "configured" } else { "not configured" }
    );

    let sessions = SessionStore::new(Arc::clone(&store), engine.session_ttl_secs);
    let ledger = CreditLedger::new(
        Arc::clone(&store),
        Arc::clone(&catalog),
        engine.credit_period_secs,
    );
    let accounts = Accounts::new(
        Arc::clone(&store),
        sessions,
        ledger,
        engine.credit_period_secs,
    );
    let orchestrator = FactCheckOrchestrator::new(store, catalog, &engine, search, llm);

    Ok(AppState {
        accounts: Arc::new(accounts),
        orchestrator: Arc::new(orchestrator),
    })
}

/// Build the axum application from configuration
pub fn build_app(config: &ServerConfig) -> Result<axum::Router, ServerError> {
    Ok(create_router(build_state(config)?))
}

/// Start the HTTP server
///
/// Opens the database, builds the providers and serves until the process
/// is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting DubCheck API");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);

    let app = build_app(&config)?;

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("DubCheck API listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
