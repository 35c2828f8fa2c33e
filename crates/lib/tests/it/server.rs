//! JSON API, session endpoints and pages.

use reqwest::StatusCode;
use serde_json::{Value, json};

use squad::{backend::Operation, constants::SESSION_COOKIE};

use crate::helpers::{FakeSource, TestServer, location, session_cookie, test_config};

async fn json_body(response: reqwest::Response) -> Value {
    response.json().await.expect("json body")
}

// ==========================
// API PROXY
// ==========================

#[tokio::test]
async fn api_requires_a_session() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;

    for path in ["/api/users", "/api/leaderboard", "/api/nonexistent"] {
        let response = server.get(path, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(json_body(response).await, json!({"error": "Unauthorized"}));
    }
    assert_eq!(server.source.total_calls(), 0);
}

#[tokio::test]
async fn api_rejects_disallowed_domains() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.raw_token(Some("someone@other.com"));

    let response = server.get("/api/users", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await, json!({"error": "Forbidden"}));
    assert_eq!(server.source.total_calls(), 0);
}

#[tokio::test]
async fn api_returns_backend_json() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.token("asha@cronberry.com");

    let response = server.get("/api/users", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, crate::helpers::users_sheet());

    let response = server.get("/api/user?rep=Asha", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await[0]["level"], "Gold");
}

#[tokio::test]
async fn api_reads_share_the_cache() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.token("asha@cronberry.com");

    for _ in 0..3 {
        let response = server.get("/api/users", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(server.source.calls_for(&Operation::Users), 1);
}

#[tokio::test]
async fn api_refresh_bypasses_the_cache() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.token("asha@cronberry.com");

    server.get("/api/leaderboard", Some(&token)).await;
    server.get("/api/leaderboard", Some(&token)).await;
    assert_eq!(server.source.calls_for(&Operation::Leaderboard), 1);

    let rankings = json!([{"rep_name": "Meera", "level": "Gold", "points_total": 900}]);
    server.source.respond(Operation::Leaderboard, rankings);
    let response = server.get("/api/leaderboard?refresh=1", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await[0]["rep_name"], "Meera");
    assert_eq!(server.source.calls_for(&Operation::Leaderboard), 2);

    // The refreshed value is cached for plain reads.
    let response = server.get("/api/leaderboard?refresh=0", Some(&token)).await;
    assert_eq!(json_body(response).await[0]["rep_name"], "Meera");
    assert_eq!(server.source.calls_for(&Operation::Leaderboard), 2);
}

#[tokio::test]
async fn api_unknown_operation_is_not_found() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.token("asha@cronberry.com");

    let response = server.get("/api/payroll", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({"error": "Endpoint not found"}));
}

#[tokio::test]
async fn api_missing_rep_is_a_bad_request() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.token("asha@cronberry.com");

    for path in ["/api/user", "/api/summary?rep=", "/api/activity?rep=%20"] {
        let response = server.get(path, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("rep"), "{path}");
    }
    assert_eq!(server.source.total_calls(), 0);
}

#[tokio::test]
async fn api_other_methods_are_not_allowed() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.token("asha@cronberry.com");

    let response = server
        .client
        .post(server.url("/api/users"))
        .header("Cookie", session_cookie(&token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json_body(response).await, json!({"error": "Method not allowed"}));

    let response = server.client.delete(server.url("/api/users")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn api_upstream_failure_is_internal_error() {
    let source = FakeSource::with_sales_data();
    source.fail_next(&[500, 500, 500]);
    let server = TestServer::start(source).await;
    let token = server.token("asha@cronberry.com");

    let response = server.get("/api/users", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Internal Server Error");
    assert!(body["details"].as_str().unwrap().contains("500"));

    // Retries are exhausted, so the next read fetches again and succeeds.
    let response = server.get("/api/users", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ==========================
// SESSION ENDPOINTS
// ==========================

#[tokio::test]
async fn session_endpoint_reports_the_user() {
    let server = TestServer::start(FakeSource::new()).await;
    let token = server.token("asha@cronberry.com");

    let body = json_body(server.get("/api/auth/session", Some(&token)).await).await;
    assert_eq!(body["user"]["email"], "asha@cronberry.com");
    assert_eq!(body["user"]["name"], "Test User");
    assert!(body["expires"].as_str().unwrap().starts_with("2025-11-07"));
}

#[tokio::test]
async fn session_endpoint_is_empty_without_permitted_session() {
    let server = TestServer::start(FakeSource::new()).await;
    let foreign = server.raw_token(Some("someone@other.com"));

    for token in [None, Some("garbage"), Some(foreign.as_str())] {
        let response = server.get("/api/auth/session", token).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({}));
    }
}

#[tokio::test]
async fn signout_clears_the_cookie() {
    let server = TestServer::start(FakeSource::new()).await;
    let token = server.token("asha@cronberry.com");

    let response = server
        .client
        .post(server.url("/api/auth/signout"))
        .header("Cookie", session_cookie(&token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let cleared = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&format!("{SESSION_COOKIE}=;")) && value.contains("Max-Age=0"));
    assert!(cleared);
}

#[tokio::test]
async fn signout_removal_carries_the_cookie_attributes() {
    let mut config = test_config();
    config.session = config.session.clone().with_secure_cookies(true);
    let server = TestServer::start_with(config, FakeSource::new()).await;
    let token = server.token("asha@cronberry.com");

    let response = server.get("/api/auth/signout", Some(&token)).await;
    let removal = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{SESSION_COOKIE}=;")))
        .expect("session cookie removal")
        .to_string();

    for attribute in ["Path=/", "HttpOnly", "SameSite=Lax", "Secure", "Max-Age=0"] {
        assert!(removal.contains(attribute), "{attribute} missing from {removal}");
    }
}

#[tokio::test]
async fn session_cookie_follows_the_session_config() {
    let plain = TestServer::start(FakeSource::new()).await;
    let cookie = plain.state.session_cookie("token-1").to_string();
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=token-1")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains(&format!("Max-Age={}", 30 * 24 * 60 * 60)));
    assert!(!cookie.contains("Secure"));

    let mut config = test_config();
    config.session = config.session.clone().with_secure_cookies(true);
    let secure = TestServer::start_with(config, FakeSource::new()).await;
    assert!(secure.state.session_cookie("token-1").to_string().contains("Secure"));
}

// ==========================
// PAGES
// ==========================

#[tokio::test]
async fn home_redirects_signed_in_users() {
    let server = TestServer::start(FakeSource::new()).await;

    let response = server.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("@cronberry.com"));

    let token = server.token("asha@cronberry.com");
    let response = server.get("/", Some(&token)).await;
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn auth_error_page_explains_the_code() {
    let server = TestServer::start(FakeSource::new()).await;

    let text = server
        .get("/auth/error?error=AccessDenied", None)
        .await
        .text()
        .await
        .unwrap();
    assert!(text.contains("Access Denied"));
    assert!(text.contains("@cronberry.com"));

    let text = server
        .get("/auth/error?error=Configuration", None)
        .await
        .text()
        .await
        .unwrap();
    assert!(text.contains("Configuration Error"));

    let response = server.get("/auth/error", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn dashboard_renders_the_rep() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.token("asha@cronberry.com");

    let response = server.get("/dashboard", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = response.text().await.unwrap();
    assert!(text.contains("Welcome back, Asha!"));
    assert!(text.contains("₹5,00,000"));
    assert!(text.contains("Fastest closer"));
    // Only the reward from the current week is marked.
    assert_eq!(text.matches(">New</span>").count(), 1);
    assert!(text.contains("2025Q4"));
}

#[tokio::test]
async fn pages_share_cached_profile_data() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.token("asha@cronberry.com");

    for path in ["/dashboard", "/achieved-logs", "/refund-logs", "/dashboard"] {
        let response = server.get(path, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }
    assert_eq!(server.source.calls_for(&Operation::Users), 1);
    assert_eq!(
        server.source.calls_for(&Operation::UserDetail {
            rep: "Asha".to_string()
        }),
        1
    );
}

#[tokio::test]
async fn leaderboard_filters_by_name() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.token("asha@cronberry.com");

    let text = server
        .get("/leaderboard", Some(&token))
        .await
        .text()
        .await
        .unwrap();
    let asha = text.find("Asha").unwrap();
    let ravi = text.find("Ravi").unwrap();
    assert!(asha < ravi, "sorted by points");

    let text = server
        .get("/leaderboard?q=rav", Some(&token))
        .await
        .text()
        .await
        .unwrap();
    assert!(text.contains(r#"title="Ravi""#));
    assert!(!text.contains(r#"title="Asha""#));
}

#[tokio::test]
async fn leaderboard_refresh_refetches_rankings() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.token("asha@cronberry.com");

    let text = server
        .get("/leaderboard", Some(&token))
        .await
        .text()
        .await
        .unwrap();
    assert!(text.contains(r#"href="/leaderboard?refresh=1""#));
    assert!(!text.contains("Meera"));

    let rankings = json!([{"rep_name": "Meera", "level": "Gold", "points_total": 900}]);
    server.source.respond(Operation::Leaderboard, rankings);
    let text = server
        .get("/leaderboard", Some(&token))
        .await
        .text()
        .await
        .unwrap();
    assert!(!text.contains("Meera"), "plain reads stay cached");

    let response = server.get("/leaderboard?refresh=1", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains(r#"title="Meera""#));
    assert_eq!(server.source.calls_for(&Operation::Leaderboard), 2);
}

#[tokio::test]
async fn rules_page_renders_backend_rules() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.token("asha@cronberry.com");

    let response = server.get("/rules", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Gold"));
}

#[tokio::test]
async fn unregistered_user_is_signed_out() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.token("nobody@cronberry.com");

    let response = server.get("/dashboard", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
    assert!(
        response
            .headers()
            .get_all("set-cookie")
            .iter()
            .any(|value| value.to_str().unwrap().contains("Max-Age=0"))
    );
}

#[tokio::test]
async fn upstream_failure_renders_retry_page() {
    let source = FakeSource::with_sales_data();
    source.fail_next(&[502, 502, 502]);
    let server = TestServer::start(source).await;
    let token = server.token("asha@cronberry.com");

    let response = server.get("/achieved-logs", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let text = response.text().await.unwrap();
    assert!(text.contains(r#"href="/achieved-logs""#));

    let response = server.get("/achieved-logs", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let server = TestServer::start(FakeSource::new()).await;

    let response = server.get("/no-such-page", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.text().await.unwrap().contains("/no-such-page"));
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::start(FakeSource::with_sales_data()).await;
    let token = server.token("asha@cronberry.com");
    server.get("/api/users", Some(&token)).await;

    let body = json_body(server.get("/health", None).await).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cached_entries"], 1);
    assert_eq!(body["upstream_fetches"], 1);
}
