//! HTTP request handlers for the DubCheck API.
//!
//! Routes live under `/api`. Authenticated routes take the session token as
//! `Authorization: Bearer <token>`.

use crate::conversions::{plans_by_name, FactCheckDto, PlanDto, SessionResponse, UserDto};
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use dubcheck_engine::{Accounts, CheckError, FactCheckOrchestrator};
use dubcheck_llm::OpenAiProvider;
use dubcheck_search::SerperClient;
use dubcheck_store::SqliteStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

/// The fact-check flow wired to the production providers
pub type Orchestrator = FactCheckOrchestrator<SqliteStore, SerperClient, OpenAiProvider>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Registration, login and profile
    pub accounts: Arc<Accounts<SqliteStore>>,
    /// Fact-check flow and history
    pub orchestrator: Arc<Orchestrator>,
}

/// Registration request
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: String,
}

/// Login request
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    /// Email address
    #[serde(default)]
    pub email: String,
}

/// Fact-check request
#[derive(Debug, Default, Deserialize)]
pub struct FactCheckRequest {
    /// Text to check
    #[serde(default)]
    pub text: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Service name
    pub service: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub struct AppError(CheckError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            CheckError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            CheckError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            CheckError::InvalidSession => (StatusCode::UNAUTHORIZED, "Invalid session".to_string()),
            CheckError::InsufficientCredits { .. } => (
                StatusCode::PAYMENT_REQUIRED,
                "Insufficient credits".to_string(),
            ),
            CheckError::Internal(detail) => {
                error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<CheckError> for AppError {
    fn from(e: CheckError) -> Self {
        AppError(e)
    }
}

/// Extract the bearer token; a missing or malformed header is an invalid session
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError(CheckError::InvalidSession))
}

/// GET /api/health
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        service: "DubCheck API".to_string(),
    })
}

/// POST /api/register - Create an account and open a session
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let (session, user) = state.accounts.register(&request.email, &request.name)?;
    Ok(Json(SessionResponse::new(&session, &user)))
}

/// POST /api/login - Open a new session for an existing account
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let (session, user) = state.accounts.login(&request.email)?;
    Ok(Json(SessionResponse::new(&session, &user)))
}

/// POST /api/fact-check - Check a text and debit credits
async fn fact_check(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<FactCheckRequest>,
) -> Result<Json<FactCheckDto>, AppError> {
    let token = bearer_token(&headers)?;
    let record = state.orchestrator.handle(token, &request.text).await?;
    Ok(Json(FactCheckDto::from(&record)))
}

/// GET /api/user/profile
async fn profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserDto>, AppError> {
    let token = bearer_token(&headers)?;
    let user = state.accounts.profile(token)?;
    Ok(Json(UserDto::from(&user)))
}

/// GET /api/user/fact-checks - Most recent checks, newest first
async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<FactCheckDto>>, AppError> {
    let token = bearer_token(&headers)?;
    let records = state.orchestrator.history(token)?;
    Ok(Json(records.iter().map(FactCheckDto::from).collect()))
}

/// GET /api/plans
async fn plans(State(state): State<AppState>) -> Json<BTreeMap<String, PlanDto>> {
    Json(plans_by_name(state.accounts.plans()))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/api/health", get(health_check))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/fact-check", post(fact_check))
        .route("/api/user/profile", get(profile))
        .route("/api/user/fact-checks", get(history))
        .route("/api/plans", get(plans))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_state;
    use crate::config::ServerConfig;
    use axum::body::Body;
    use axum::http::{HeaderValue, Request};
    use tower::ServiceExt; // for oneshot

    fn create_test_state() -> AppState {
        build_state(&ServerConfig::default_test_config()).unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc123");
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (CheckError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (CheckError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (CheckError::InvalidSession, StatusCode::UNAUTHORIZED),
            (
                CheckError::InsufficientCredits {
                    required: 5,
                    available: 1,
                },
                StatusCode::PAYMENT_REQUIRED,
            ),
            (CheckError::Internal("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(AppError(error).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = AppError(CheckError::Internal("database is locked".into())).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Internal server error");
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/api/register")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"email": "a@example.com", "name": "A"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
