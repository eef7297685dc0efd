//! End-to-end tests for the image vectorization path.

use pretty_assertions::assert_eq;

use e2e_tests::{test_png, TestHarness};
use embed_client::ClientError;

#[tokio::test]
async fn test_image_miss_then_hit() {
    let harness = TestHarness::new().await;
    let client = harness.client();
    let png = test_png(64, 48, [200, 30, 90]);

    let first = client.vectorize_image(&png).await.unwrap();
    assert_eq!(first.source, "computed");
    assert_eq!(first.model.as_deref(), Some("mock-image"));

    let second = client.vectorize_image(&png).await.unwrap();
    assert_eq!(second.source, "cache");
    assert_eq!(second.vector, first.vector);
}

#[tokio::test]
async fn test_same_pixels_different_files_are_distinct_keys() {
    // Identical pixel content encoded at different sizes produces different
    // encoded bytes, so the fingerprints differ and both entries are cached.
    let harness = TestHarness::new().await;
    let client = harness.client();

    let small = test_png(8, 8, [1, 2, 3]);
    let large = test_png(16, 16, [1, 2, 3]);

    client.vectorize_image(&small).await.unwrap();
    client.vectorize_image(&large).await.unwrap();

    assert_eq!(harness.store.len(), 2);
}

#[tokio::test]
async fn test_text_and_image_namespaces_disjoint() {
    let harness = TestHarness::new().await;
    let client = harness.client();

    client.vectorize_text("hello").await.unwrap();
    let png = test_png(32, 32, [0, 0, 0]);
    client.vectorize_image(&png).await.unwrap();

    // Two independent entries, one per namespace
    assert_eq!(harness.store.len(), 2);
}

#[tokio::test]
async fn test_multipart_upload_shares_cache_with_base64() {
    // The key fingerprints the encoded bytes, so the transport (base64 body
    // or multipart upload) does not matter: both hit the same entry.
    let harness = TestHarness::new().await;
    let client = harness.client();
    let png = test_png(24, 24, [77, 77, 77]);

    let uploaded = client
        .vectorize_image_upload(&png, "test.png")
        .await
        .unwrap();
    assert_eq!(uploaded.source, "computed");

    let via_base64 = client.vectorize_image(&png).await.unwrap();
    assert_eq!(via_base64.source, "cache");
    assert_eq!(via_base64.vector, uploaded.vector);
    assert_eq!(harness.store.len(), 1);
}

#[tokio::test]
async fn test_undecodable_image_is_rejected() {
    let harness = TestHarness::new().await;
    let client = harness.client();

    let err = client
        .vectorize_image(b"definitely not an image")
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, .. } => assert_eq!(status, 400),
        other => panic!("Expected Api error, got {:?}", other),
    }

    assert!(harness.store.is_empty());
}
