//! Integration tests for the blob-store gateway adapter.

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use recap_core::BlobStore;
use recap_domain::RecapError;
use recap_infra::HttpBlobStore;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store(server: &MockServer, token: Option<&str>) -> HttpBlobStore {
    let endpoint = format!("{}/recordings", server.uri());
    HttpBlobStore::new(&support::storage_config(&endpoint, token)).unwrap()
}

#[tokio::test]
async fn exists_maps_status_codes() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/recordings/u1/m1/recording.mp3"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/recordings/u1/m2/recording.mp3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/recordings/u1/m3/recording.mp3"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = store(&server, None);
    assert!(store.exists("u1/m1/recording.mp3").await.unwrap());
    assert!(!store.exists("u1/m2/recording.mp3").await.unwrap());
    assert!(matches!(
        store.exists("u1/m3/recording.mp3").await.unwrap_err(),
        RecapError::Storage(_)
    ));
}

#[tokio::test]
async fn upload_puts_bytes_with_auth_and_content_type() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/recordings/u1/m1/recording.mp3"))
        .and(header("Authorization", "Bearer blob-secret"))
        .and(header("Content-Type", "audio/mpeg"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("recording.mp3");
    std::fs::write(&local, b"mp3 bytes").unwrap();

    let store = store(&server, Some("blob-secret"));
    let url = store.upload(&local, "u1/m1/recording.mp3", "audio/mpeg").await.unwrap();

    assert_eq!(url, format!("{}/recordings/u1/m1/recording.mp3", server.uri()));
}

#[tokio::test]
async fn failed_upload_is_a_storage_error() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/recordings/u1/m1/metadata.json"))
        .respond_with(ResponseTemplate::new(507))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("metadata.json");
    std::fs::write(&local, b"{}").unwrap();

    let store = store(&server, None);
    let error = store.upload(&local, "u1/m1/metadata.json", "application/json").await.unwrap_err();
    assert!(matches!(error, RecapError::Storage(_)));
}

#[test]
fn rejects_invalid_endpoint() {
    let config = support::storage_config("not a url", None);
    assert!(matches!(HttpBlobStore::new(&config), Err(RecapError::Config(_))));
}
