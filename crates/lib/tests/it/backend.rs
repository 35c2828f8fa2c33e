//! The Apps Script client against a local upstream.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use squad::{
    backend::{AppsScriptClient, DataSource, Operation},
    config::BackendConfig,
};

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Stand-in for the deployed web app, dispatching on `action`.
async fn exec(State(seen): State<Seen>, Query(query): Query<HashMap<String, String>>) -> Response {
    seen.lock().unwrap().push(query.clone());

    match query.get("action").map(String::as_str) {
        Some("users") => Json(json!([{"rep": "Asha", "email": "asha@cronberry.com"}])).into_response(),
        Some("user") => Json(json!([{"rep": query.get("rep")}])).into_response(),
        Some("rules") => Json(json!({"error": "Sheet not found", "details": "Rules"})).into_response(),
        Some("leaderboard") => "<html>not json</html>".into_response(),
        Some("cycles") => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        Some("activity") => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!([])).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "unknown action").into_response(),
    }
}

async fn start_upstream() -> (SocketAddr, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/macros/s/test/exec", get(exec))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen)
}

fn client_for(addr: SocketAddr, timeout: Duration) -> AppsScriptClient {
    let config = BackendConfig::parse(&format!("http://{addr}/macros/s/test/exec"), timeout).unwrap();
    AppsScriptClient::new(&config).unwrap()
}

#[tokio::test]
async fn sends_action_and_rep() {
    let (addr, seen) = start_upstream().await;
    let client = client_for(addr, Duration::from_secs(5));

    let users = client.fetch(&Operation::Users).await.unwrap();
    assert_eq!(users[0]["rep"], "Asha");

    let detail = client
        .fetch(&Operation::UserDetail {
            rep: "Ravi Kumar".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(detail[0]["rep"], "Ravi Kumar");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].get("action").map(String::as_str), Some("users"));
    assert!(!seen[0].contains_key("rep"));
    assert_eq!(seen[1].get("action").map(String::as_str), Some("user"));
    assert_eq!(seen[1].get("rep").map(String::as_str), Some("Ravi Kumar"));
}

#[tokio::test]
async fn error_field_is_an_upstream_error() {
    let (addr, _seen) = start_upstream().await;
    let client = client_for(addr, Duration::from_secs(5));

    let err = client.fetch(&Operation::Rules).await.unwrap_err();
    assert!(!err.is_transient());
    assert_eq!(err.details(), "Rules");
    assert!(err.to_string().contains("Sheet not found"));
}

#[tokio::test]
async fn server_errors_are_transient() {
    let (addr, _seen) = start_upstream().await;
    let client = client_for(addr, Duration::from_secs(5));

    let err = client.fetch(&Operation::Cycles).await.unwrap_err();
    assert!(err.is_transient());
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let (addr, _seen) = start_upstream().await;
    let client = client_for(addr, Duration::from_secs(5));

    let err = client.fetch(&Operation::Leaderboard).await.unwrap_err();
    assert!(!err.is_transient());
    assert!(err.to_string().starts_with("Invalid response for leaderboard"));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let (addr, _seen) = start_upstream().await;
    let client = client_for(addr, Duration::from_millis(200));

    let err = client
        .fetch(&Operation::Activity {
            rep: "Asha".to_string(),
        })
        .await
        .unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn unreachable_upstream_is_transient() {
    // Bind and drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr, Duration::from_secs(2));
    let err = client.fetch(&Operation::Users).await.unwrap_err();
    assert!(err.is_transient());
}
