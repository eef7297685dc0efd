//! Graceful degradation E2E tests.
//!
//! When the key-value store is unreachable, the gateway must either degrade
//! to compute-without-cache (fail-open, the default) or surface the outage
//! (strict mode). It must never report the outage as a cold cache.

use pretty_assertions::assert_eq;

use e2e_tests::TestHarness;
use embed_client::ClientError;

#[tokio::test]
async fn test_store_down_fail_open_still_serves() {
    // 1. Gateway over a refusing store, fail-open policy
    let harness = TestHarness::with_store_down(true).await;
    let client = harness.client();

    // 2. Requests still succeed, always freshly computed
    let first = client.vectorize_text("resilient").await.unwrap();
    assert_eq!(first.source, "computed");

    // 3. No cache behind it: a repeat request computes again, never "cache"
    let second = client.vectorize_text("resilient").await.unwrap();
    assert_eq!(second.source, "computed");
    assert_eq!(second.vector, first.vector);
}

#[tokio::test]
async fn test_store_down_strict_surfaces_503() {
    let harness = TestHarness::with_store_down(false).await;
    let client = harness.client();

    let err = client.vectorize_text("strict").await.unwrap_err();
    match err {
        ClientError::Api { status, .. } => assert_eq!(status, 503),
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_health_reports_store_outage() {
    // The service stays up; the probe exposes the degraded cache
    let harness = TestHarness::with_store_down(true).await;
    let client = harness.client();

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.cache, "unavailable");
}

#[tokio::test]
async fn test_health_ok_with_live_store() {
    let harness = TestHarness::new().await;
    let client = harness.client();

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.cache, "ok");
}
