//! Integration tests for the file-backed OAuth credential provider.

#![allow(dead_code)]

use chrono::{Duration, Utc};
use recap_core::CredentialProvider;
use recap_domain::{OauthConfig, RecapError};
use recap_infra::OauthCredentialProvider;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(token_endpoint: &str, token_dir: &std::path::Path) -> OauthConfig {
    OauthConfig {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        token_endpoint: token_endpoint.to_string(),
        token_dir: token_dir.to_string_lossy().into_owned(),
    }
}

fn write_token(dir: &std::path::Path, user: &str, document: serde_json::Value) {
    std::fs::write(dir.join(format!("{user}.json")), document.to_string()).unwrap();
}

#[tokio::test]
async fn fresh_token_is_returned_without_a_refresh_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

    let dir = tempfile::tempdir().unwrap();
    write_token(
        dir.path(),
        "alice",
        json!({
            "access_token": "fresh-token",
            "refresh_token": "refresh",
            "expires_at": (Utc::now() + Duration::hours(2)).to_rfc3339()
        }),
    );

    let provider =
        OauthCredentialProvider::new(&config(&format!("{}/token", server.uri()), dir.path()))
            .unwrap();
    let credential = provider.refresh("alice").await.unwrap();

    assert_eq!(credential.access_token, "fresh-token");
    assert_eq!(credential.refresh_token.as_deref(), Some("refresh"));
}

#[tokio::test]
async fn expired_token_is_refreshed_and_rewritten() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=old-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-token",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_token(
        dir.path(),
        "alice",
        json!({
            "access_token": "stale-token",
            "refresh_token": "old-refresh",
            "expires_at": (Utc::now() - Duration::hours(1)).to_rfc3339()
        }),
    );

    let provider =
        OauthCredentialProvider::new(&config(&format!("{}/token", server.uri()), dir.path()))
            .unwrap();
    let credential = provider.refresh("alice").await.unwrap();

    assert_eq!(credential.access_token, "new-token");
    assert!(credential.expires_at.unwrap() > Utc::now());

    // The on-disk document now carries the refreshed token, with no
    // temporary file left over from the atomic rewrite.
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("alice.json")).unwrap())
            .unwrap();
    assert_eq!(stored["access_token"], "new-token");
    assert_eq!(stored["refresh_token"], "old-refresh");

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["alice.json".to_string()]);
}

#[tokio::test]
async fn missing_document_is_an_auth_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider =
        OauthCredentialProvider::new(&config("http://127.0.0.1:9/token", dir.path())).unwrap();

    let error = provider.refresh("nobody").await.unwrap_err();
    assert!(matches!(error, RecapError::Auth(_)));
}

#[tokio::test]
async fn lists_users_from_token_documents() {
    let dir = tempfile::tempdir().unwrap();
    write_token(dir.path(), "bob", json!({"access_token": "t"}));
    write_token(dir.path(), "alice", json!({"access_token": "t"}));
    std::fs::write(dir.path().join("README.txt"), "not a token").unwrap();

    let provider =
        OauthCredentialProvider::new(&config("http://127.0.0.1:9/token", dir.path())).unwrap();
    let users = provider.list_users().await.unwrap();

    assert_eq!(users, vec!["alice".to_string(), "bob".to_string()]);
}
