//! Loading a representative's profile through the cache.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;

use squad::{
    FixedClock,
    auth::Session,
    backend::{BackendCache, Operation, backend_cache},
    store::{ProfileLoader, Store},
};

use crate::helpers::{FakeSource, NOW_MILLIS, fast_cache};

fn session(email: &str) -> Session {
    Session {
        subject: "subject-1".to_string(),
        email: email.to_string(),
        name: None,
        issued_at: Utc.timestamp_opt(0, 0).unwrap(),
        expires_at: Utc.timestamp_opt(4_000_000_000, 0).unwrap(),
    }
}

fn setup(source: FakeSource) -> (Arc<FakeSource>, BackendCache, ProfileLoader) {
    let source = Arc::new(source);
    let cache = backend_cache(
        source.clone(),
        &fast_cache(),
        Arc::new(FixedClock::new(NOW_MILLIS)),
    );
    let loader = ProfileLoader::new(cache.clone());
    (source, cache, loader)
}

#[tokio::test]
async fn loads_users_then_detail() {
    let (source, _cache, loader) = setup(FakeSource::with_sales_data());
    let mut store = Store::new();

    loader.load(&mut store, &session("Asha@Cronberry.com ")).await.unwrap();

    let state = store.state();
    assert_eq!(state.users.len(), 3);
    assert_eq!(state.rep_name.as_deref(), Some("Asha"));
    let detail = state.user.as_ref().unwrap();
    assert_eq!(detail.level, "Gold");
    assert_eq!(detail.target, 500_000.0);
    assert_eq!(source.total_calls(), 2);
}

#[tokio::test]
async fn email_match_ignores_case_and_whitespace() {
    let source = FakeSource::with_sales_data();
    source.respond(
        Operation::UserDetail {
            rep: "Ravi".to_string(),
        },
        json!({"rep": " Ravi ", "level": "Silver"}),
    );
    let (_source, _cache, loader) = setup(source);
    let mut store = Store::new();

    loader.load(&mut store, &session("ravi@cronberry.com")).await.unwrap();
    assert_eq!(store.state().rep_name.as_deref(), Some("Ravi"));
}

#[tokio::test]
async fn unknown_email_resets_the_store() {
    let (source, _cache, loader) = setup(FakeSource::with_sales_data());
    let mut store = Store::new();
    loader.load(&mut store, &session("asha@cronberry.com")).await.unwrap();

    let err = loader
        .load(&mut store, &session("nobody@cronberry.com"))
        .await
        .unwrap_err();
    assert!(err.is_not_registered());
    assert_eq!(store.state(), &Default::default());
    // Users came from the cache the second time.
    assert_eq!(source.calls_for(&Operation::Users), 1);
}

#[tokio::test]
async fn blank_rep_is_not_registered() {
    let (source, _cache, loader) = setup(FakeSource::with_sales_data());
    let mut store = Store::new();

    let err = loader
        .load(&mut store, &session("blank@cronberry.com"))
        .await
        .unwrap_err();
    assert!(err.is_not_registered());
    assert_eq!(source.total_calls(), 1);
}

#[tokio::test]
async fn empty_detail_leaves_user_unset() {
    let source = FakeSource::with_sales_data();
    source.respond(
        Operation::UserDetail {
            rep: "Asha".to_string(),
        },
        json!([]),
    );
    let (_source, _cache, loader) = setup(source);
    let mut store = Store::new();

    loader.load(&mut store, &session("asha@cronberry.com")).await.unwrap();
    assert!(store.state().user.is_none());
    assert!(store.state().rep_name.is_none());
    assert_eq!(store.state().users.len(), 3);
}

#[tokio::test]
async fn malformed_users_is_a_decode_error() {
    let source = FakeSource::new();
    source.respond(Operation::Users, json!({"rows": []}));
    let (_source, _cache, loader) = setup(source);
    let mut store = Store::new();

    let err = loader
        .load(&mut store, &session("asha@cronberry.com"))
        .await
        .unwrap_err();
    assert!(!err.is_not_registered());
    assert!(err.is_upstream_error());
    assert!(!err.is_transient());
    assert!(err.to_string().contains("users"));
}

#[tokio::test]
async fn upstream_failure_is_reported() {
    let source = FakeSource::with_sales_data();
    source.fail_next(&[503, 503, 503]);
    let (_source, _cache, loader) = setup(source);
    let mut store = Store::new();

    let err = loader
        .load(&mut store, &session("asha@cronberry.com"))
        .await
        .unwrap_err();
    assert!(err.is_upstream_error());
    assert!(err.is_transient());
}
