//! Integration tests for the Serper client against a local stand-in server

use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use dubcheck_domain::traits::SearchProvider;
use dubcheck_search::{SearchError, SerperClient};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral port and return its base URL
async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn fake_serper(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
        return (StatusCode::FORBIDDEN, Json(json!({"message": "bad key"})));
    }

    let query = body["q"].as_str().unwrap_or_default().to_string();
    let num = body["num"].as_u64().unwrap_or(0);
    let organic: Vec<Value> = (0..7)
        .map(|i| {
            json!({
                "title": format!("Result {i} for {query}"),
                "link": format!("https://example.com/{i}"),
                "snippet": format!("requested {num}"),
            })
        })
        .collect();

    (StatusCode::OK, Json(json!({ "organic": organic })))
}

#[tokio::test]
async fn test_search_success() {
    let base = spawn(Router::new().route("/search", post(fake_serper))).await;
    let client = SerperClient::with_options(
        format!("{base}/search"),
        "test-key",
        Duration::from_secs(5),
    )
    .unwrap();

    let sources = client.search("is the sky blue").await.unwrap();

    assert_eq!(sources.len(), 5, "Results beyond five are dropped");
    assert_eq!(sources[0].title, "Result 0 for is the sky blue");
    assert_eq!(sources[0].url, "https://example.com/0");
    assert_eq!(sources[0].snippet, "requested 5");
}

#[tokio::test]
async fn test_search_non_200() {
    let base = spawn(Router::new().route("/search", post(fake_serper))).await;
    let client = SerperClient::with_options(
        format!("{base}/search"),
        "wrong-key",
        Duration::from_secs(5),
    )
    .unwrap();

    let result = client.search("anything").await;
    assert!(matches!(result, Err(SearchError::Status(403))));
}

#[tokio::test]
async fn test_search_timeout() {
    async fn slow() -> Json<Value> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Json(json!({ "organic": [] }))
    }

    let base = spawn(Router::new().route("/search", post(slow))).await;
    let client = SerperClient::with_options(
        format!("{base}/search"),
        "test-key",
        Duration::from_millis(200),
    )
    .unwrap();

    let result = client.search("anything").await;
    assert!(matches!(result, Err(SearchError::Timeout)));
}
