//! The shared backend cache in front of a data source.

use std::{sync::Arc, time::Duration};

use serde_json::json;

use squad::{
    FixedClock,
    backend::{Operation, backend_cache},
    config::CacheConfig,
};

use crate::helpers::{FakeSource, NOW_MILLIS, fast_cache};

fn setup(config: &CacheConfig) -> (Arc<FakeSource>, Arc<FixedClock>, squad::backend::BackendCache) {
    let source = Arc::new(FakeSource::with_sales_data());
    let clock = Arc::new(FixedClock::new(NOW_MILLIS));
    let cache = backend_cache(source.clone(), config, clock.clone());
    (source, clock, cache)
}

#[tokio::test]
async fn concurrent_users_reads_issue_one_fetch() {
    let (source, _clock, cache) = setup(&fast_cache());
    source.set_delay(Duration::from_millis(50));

    let (a, b) = tokio::join!(cache.get(&Operation::Users), cache.get(&Operation::Users));

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(source.calls_for(&Operation::Users), 1);
}

#[tokio::test]
async fn many_tasks_share_one_fetch() {
    let (source, _clock, cache) = setup(&fast_cache());
    source.set_delay(Duration::from_millis(50));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get(&Operation::Users).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert_eq!(source.total_calls(), 1);
    assert_eq!(cache.fetch_count(), 1);
}

#[tokio::test]
async fn reads_within_window_are_served_from_cache() {
    let (source, clock, cache) = setup(&fast_cache());

    cache.get(&Operation::Users).await.unwrap();
    clock.advance(Duration::from_secs(60));
    cache.get(&Operation::Users).await.unwrap();

    assert_eq!(source.total_calls(), 1);
}

#[tokio::test]
async fn stale_entry_is_refetched_once() {
    let config = CacheConfig {
        serve_stale: false,
        ..fast_cache()
    };
    let (source, clock, cache) = setup(&config);

    cache.get(&Operation::Users).await.unwrap();
    clock.advance(Duration::from_secs(16 * 60));
    source.respond(Operation::Users, json!([{"rep": "Zoe", "email": "zoe@cronberry.com"}]));

    let value = cache.get(&Operation::Users).await.unwrap();
    assert_eq!(value[0]["rep"], "Zoe");
    assert_eq!(source.total_calls(), 2);
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let (source, _clock, cache) = setup(&fast_cache());
    source.fail_next(&[503, 502]);

    let value = cache.get(&Operation::Users).await.unwrap();
    assert!(value.is_array());
    assert_eq!(source.total_calls(), 3);
}

#[tokio::test]
async fn exhausted_retries_surface_the_last_error() {
    let (source, _clock, cache) = setup(&fast_cache());
    source.fail_next(&[500, 500, 503]);

    let err = cache.get(&Operation::Users).await.unwrap_err();
    assert_eq!(err.key, "Users");
    assert_eq!(err.attempts, 3);
    assert!(err.is_transient());
    assert!(err.source_error().to_string().contains("503"));
    assert!(cache.peek(&Operation::Users).is_none());
}

#[tokio::test]
async fn rep_operations_are_cached_per_rep() {
    let (source, _clock, cache) = setup(&fast_cache());
    source.respond(
        Operation::Summary {
            rep: "Ravi".to_string(),
        },
        json!({"points": 1}),
    );
    source.respond(
        Operation::Summary {
            rep: "Asha".to_string(),
        },
        json!({"points": 2}),
    );

    let ravi = Operation::Summary {
        rep: "Ravi".to_string(),
    };
    let asha = Operation::Summary {
        rep: "Asha".to_string(),
    };
    assert_eq!(cache.get(&ravi).await.unwrap()["points"], 1);
    assert_eq!(cache.get(&asha).await.unwrap()["points"], 2);
    assert_eq!(cache.get(&ravi).await.unwrap()["points"], 1);
    assert_eq!(source.total_calls(), 2);
    assert_eq!(cache.len(), 2);
}
