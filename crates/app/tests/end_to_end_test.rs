//! End-to-end tests for the login, fetch, refresh and logout cycle
//!
//! These tests wire the real reqwest client, the JSON credential file and
//! the TSV sink against a mock provider, and drive the binary's run loop.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use forcepull_application::{CredentialStore, RunFailure, RunOutcome};
use forcepull_domain::{Credential, CredentialField, FetchConfig, OAuthConfig};
use forcepull_infrastructure::{FileCredentialStore, OutputSettings, Settings, TokioFileSystem};
use mockito::{Matcher, Mock, ServerGuard};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::{TempDir, tempdir};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const QUERY_PATH: &str = "/services/data/v26.0/query/";
const TOKEN_PATH: &str = "/services/oauth2/token";

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn settings(server: &ServerGuard, dir: &TempDir, callback_port: u16) -> Settings {
    let base = server.url();
    Settings {
        user: "alice".to_string(),
        credential_path: Some(dir.path().join("credentials.json")),
        callback_timeout_secs: 10,
        http_timeout_secs: 5,
        oauth: OAuthConfig::new(
            "client-1",
            "secret-1",
            format!("http://127.0.0.1:{callback_port}/callback"),
        )
        .with_endpoints(
            format!("{base}/services/oauth2/authorize"),
            format!("{base}{TOKEN_PATH}"),
        ),
        fetch: FetchConfig::default(),
        output: OutputSettings {
            tsv_path: Some(dir.path().join("accounts.tsv")),
        },
    }
}

fn store(settings: &Settings) -> FileCredentialStore<TokioFileSystem> {
    FileCredentialStore::new(
        TokioFileSystem::new(),
        settings.credential_path().unwrap(),
        settings.user.clone(),
    )
}

async fn seed(settings: &Settings, instance_url: &str, access: &str, refresh: &str) {
    let store = store(settings);
    store
        .set(CredentialField::InstanceUrl, instance_url)
        .await
        .unwrap();
    store.set(CredentialField::AccessToken, access).await.unwrap();
    store.set(CredentialField::RefreshToken, refresh).await.unwrap();
}

fn tsv(settings: &Settings) -> String {
    std::fs::read_to_string(settings.output.tsv_path.as_ref().unwrap()).unwrap()
}

fn accounts_body() -> String {
    json!({
        "totalSize": 2,
        "done": true,
        "records": [
            {"attributes": {"type": "Account"}, "Name": "Acme", "Phone": "555-0100", "Industry": "Energy"},
            {"attributes": {"type": "Account"}, "Name": "Globex", "Phone": null, "Industry": "Media"}
        ]
    })
    .to_string()
}

async fn mock_query(server: &mut ServerGuard, token: &str, status: usize, body: &str) -> Mock {
    server
        .mock("GET", QUERY_PATH)
        .match_query(Matcher::UrlEncoded(
            "q".into(),
            "SELECT Name, Phone, Industry FROM Account".into(),
        ))
        .match_header("authorization", format!("Bearer {token}").as_str())
        .with_status(status)
        .with_body(body)
        .create_async()
        .await
}

/// Plays the browser: waits for the listener, then follows the redirect.
async fn follow_redirect(port: u16, query: &str) -> String {
    for _ in 0..250 {
        if let Ok(mut stream) = TcpStream::connect(("127.0.0.1", port)).await {
            stream
                .write_all(
                    format!("GET /callback?{query} HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n").as_bytes(),
                )
                .await
                .unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).await.unwrap();
            return response;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("callback listener never came up on port {port}");
}

#[tokio::test]
async fn test_login_callback_then_fetch() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempdir().unwrap();
    let port = free_port();
    let settings = settings(&server, &dir, port);

    let token = server
        .mock("POST", TOKEN_PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            Matcher::UrlEncoded("code".into(), "code-1".into()),
            Matcher::UrlEncoded("client_id".into(), "client-1".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "instance_url": server.url(),
                "access_token": "acc-1",
                "refresh_token": "ref-1",
                "token_type": "Bearer"
            })
            .to_string(),
        )
        .create_async()
        .await;
    let query = mock_query(&mut server, "acc-1", 200, &accounts_body()).await;

    let (outcome, page) = tokio::join!(
        forcepull::run(&settings),
        follow_redirect(port, "code=code-1")
    );

    token.assert_async().await;
    query.assert_async().await;
    assert!(page.starts_with("HTTP/1.1 200"));
    assert!(page.contains("Finished with oAuth"));
    assert!(matches!(
        outcome.unwrap(),
        RunOutcome::Succeeded {
            rows_written: 2,
            pages: 1
        }
    ));
    assert_eq!(
        tsv(&settings),
        "Name\tPhone\tIndustry\nAcme\t555-0100\tEnergy\nGlobex\t\tMedia\n"
    );
    assert_eq!(
        store(&settings).load().await.unwrap(),
        Some(Credential::new(
            server.url(),
            "acc-1",
            Some("ref-1".to_string())
        ))
    );
}

#[tokio::test]
async fn test_provider_error_on_redirect_fails_login() {
    let server = mockito::Server::new_async().await;
    let dir = tempdir().unwrap();
    let port = free_port();
    let settings = settings(&server, &dir, port);

    let (outcome, page) = tokio::join!(
        forcepull::run(&settings),
        follow_redirect(port, "error=access_denied&error_description=user+denied")
    );

    assert!(page.starts_with("HTTP/1.1 502"));
    assert!(matches!(
        outcome,
        Err(forcepull::AppError::LoginFailed(message)) if message == "user denied"
    ));
    assert_eq!(store(&settings).load().await.unwrap(), None);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempdir().unwrap();
    let settings = settings(&server, &dir, free_port());
    seed(&settings, &server.url(), "stale", "ref-1").await;

    let rejected = mock_query(
        &mut server,
        "stale",
        401,
        r#"[{"errorCode":"INVALID_SESSION_ID"}]"#,
    )
    .await;
    let refresh = server
        .mock("POST", TOKEN_PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "ref-1".into()),
        ]))
        .with_status(200)
        .with_body(json!({"instance_url": server.url(), "access_token": "fresh"}).to_string())
        .create_async()
        .await;
    let accepted = mock_query(&mut server, "fresh", 200, &accounts_body()).await;

    let outcome = forcepull::run(&settings).await.unwrap();

    rejected.assert_async().await;
    refresh.assert_async().await;
    accepted.assert_async().await;
    assert!(outcome.is_success());

    let stored = store(&settings).load().await.unwrap().unwrap();
    assert_eq!(stored.access_token, "fresh");
    assert_eq!(stored.refresh_token.as_deref(), Some("ref-1"));
}

#[tokio::test]
async fn test_server_error_is_fatal_and_keeps_credential() {
    let mut server = mockito::Server::new_async().await;
    let dir = tempdir().unwrap();
    let settings = settings(&server, &dir, free_port());
    seed(&settings, &server.url(), "acc-1", "ref-1").await;

    let failing = mock_query(&mut server, "acc-1", 500, "boom").await;

    let outcome = forcepull::run(&settings).await.unwrap();

    failing.assert_async().await;
    match outcome {
        RunOutcome::Failed(failure @ RunFailure::Status { .. }) => {
            assert_eq!(failure.to_string(), "Error 500: boom");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!settings.output.tsv_path.as_ref().unwrap().exists());
    assert_eq!(
        store(&settings).get(CredentialField::AccessToken).await.unwrap(),
        Some("acc-1".to_string())
    );
}

#[tokio::test]
async fn test_logout_clears_only_the_configured_user() {
    let server = mockito::Server::new_async().await;
    let dir = tempdir().unwrap();
    let settings = settings(&server, &dir, free_port());
    seed(&settings, &server.url(), "acc-1", "ref-1").await;

    let bob = FileCredentialStore::new(
        TokioFileSystem::new(),
        settings.credential_path().unwrap(),
        "bob",
    );
    bob.set(CredentialField::AccessToken, "bob-token")
        .await
        .unwrap();

    forcepull::logout(&settings).await.unwrap();

    assert_eq!(store(&settings).load().await.unwrap(), None);
    assert_eq!(
        bob.get(CredentialField::AccessToken).await.unwrap(),
        Some("bob-token".to_string())
    );
}
