//! Session lifecycle and gateway behavior against a stub backend.
//!
//! These tests drive the real `ApiClient` and `Session` with a throwaway
//! session directory and a local mock server, covering the contract the
//! rest of the app leans on: tokens come from persisted storage, a 401
//! clears that storage before the caller sees the error, and rejected
//! credential exchanges leave the session untouched.

use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xrptax::api::{ApiClient, ApiError};
use xrptax::auth::{Session, SessionData, SessionStore};
use xrptax::models::UserProfile;

fn auth_body() -> serde_json::Value {
    serde_json::json!({
        "user": {"_id": "1", "name": "A", "email": "a@x.com", "country": "US"},
        "token": "abc"
    })
}

fn seeded_record() -> SessionData {
    SessionData {
        token: "abc".to_string(),
        user: UserProfile {
            id: "1".to_string(),
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            country: None,
        },
    }
}

fn fixture(dir: &TempDir, server_uri: &str) -> (SessionStore, ApiClient) {
    let store = SessionStore::new(dir.path().to_path_buf());
    let client = ApiClient::new(server_uri, store.clone()).expect("client should build");
    (store, client)
}

#[tokio::test]
async fn login_persists_record_and_authenticates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(serde_json::json!({
            "email": "a@x.com",
            "password": "hunter22!"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let (store, client) = fixture(&dir, &server.uri());
    let mut session = Session::new(store.clone());
    session.restore().expect("restore");
    assert!(!session.is_authenticated());

    session
        .login(&client, "a@x.com", "hunter22!")
        .await
        .expect("login should succeed");

    assert!(session.is_authenticated());
    let record = store.load().expect("load").expect("record should be persisted");
    assert_eq!(record.token, "abc");
    assert_eq!(record.user.name, "A");
}

#[tokio::test]
async fn rejected_login_carries_backend_message_and_leaves_session_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"message": "Invalid email or password"})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let (store, client) = fixture(&dir, &server.uri());
    let mut session = Session::new(store.clone());
    session.restore().expect("restore");

    let err = session
        .login(&client, "a@x.com", "wrong")
        .await
        .expect_err("login should fail");
    assert_eq!(err.to_string(), "Invalid email or password");
    assert!(!session.is_authenticated());
    assert!(store.load().expect("load").is_none());
}

#[tokio::test]
async fn rejected_login_without_payload_uses_fixed_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let (_store, client) = fixture(&dir, &server.uri());

    let err = client
        .login("a@x.com", "wrong")
        .await
        .expect_err("login should fail");
    assert!(matches!(err, ApiError::Credential(ref m) if m == "Failed to login"));
}

#[tokio::test]
async fn rejected_register_uses_its_own_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_string(""))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let (store, client) = fixture(&dir, &server.uri());

    let err = client
        .register("A", "a@x.com", "password1", "US")
        .await
        .expect_err("register should fail");
    assert!(matches!(err, ApiError::Credential(ref m) if m == "Failed to register"));
    assert!(store.load().expect("load").is_none());
}

#[tokio::test]
async fn register_sends_country_and_persists_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(serde_json::json!({
            "name": "A",
            "email": "a@x.com",
            "password": "password1",
            "country": "US"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let (store, client) = fixture(&dir, &server.uri());
    let mut session = Session::new(store.clone());
    session.restore().expect("restore");

    session
        .register(&client, "A", "a@x.com", "password1", "US")
        .await
        .expect("register should succeed");

    assert!(session.is_authenticated());
    assert!(store.load().expect("load").is_some());
}

#[tokio::test]
async fn unauthorized_response_clears_record_before_caller_sees_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wallets"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let (store, client) = fixture(&dir, &server.uri());
    store.save(&seeded_record()).expect("seed record");

    let err = client.wallets().await.expect_err("call should fail");
    assert!(matches!(err, ApiError::SessionExpired));
    // By the time the error is observable, the record is already gone.
    assert!(store.load().expect("load").is_none());
}

#[tokio::test]
async fn unauthorized_when_already_anonymous_is_a_noop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wallets"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let (store, client) = fixture(&dir, &server.uri());

    let err = client.wallets().await.expect_err("call should fail");
    assert!(matches!(err, ApiError::SessionExpired));
    assert!(store.load().expect("load").is_none());
}

#[tokio::test]
async fn stale_record_does_not_survive_rejected_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"message": "Invalid email or password"})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let (store, client) = fixture(&dir, &server.uri());
    store.save(&seeded_record()).expect("seed stale record");

    let err = client
        .login("a@x.com", "wrong")
        .await
        .expect_err("login should fail");
    assert!(matches!(err, ApiError::Credential(_)));
    assert!(store.load().expect("load").is_none());
}

#[tokio::test]
async fn bearer_token_is_read_from_persisted_storage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "walletCount": 1,
            "transactionCount": 2,
            "balanceUSD": 10.0,
            "recentTransactions": [],
            "taxSummary": {
                "totalIncome": 0.0,
                "totalCapitalGains": 0.0,
                "totalShortTermGains": 0.0,
                "totalLongTermGains": 0.0
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let (store, client) = fixture(&dir, &server.uri());
    // Written by a "previous process": never touched in-memory state.
    store.save(&seeded_record()).expect("seed record");

    let dashboard = client.dashboard().await.expect("dashboard should succeed");
    assert_eq!(dashboard.wallet_count, 1);
}

#[tokio::test]
async fn non_401_errors_do_not_touch_the_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wallets"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"message": "boom"})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let (store, client) = fixture(&dir, &server.uri());
    store.save(&seeded_record()).expect("seed record");

    let err = client.wallets().await.expect_err("call should fail");
    assert!(matches!(err, ApiError::Server(ref m) if m == "boom"));
    assert!(store.load().expect("load").is_some(), "record must survive a 500");
}

#[tokio::test]
async fn logout_after_login_clears_everything() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let (store, client) = fixture(&dir, &server.uri());
    let mut session = Session::new(store.clone());
    session.restore().expect("restore");
    session
        .login(&client, "a@x.com", "hunter22!")
        .await
        .expect("login");

    session.logout().expect("logout");
    assert!(!session.is_authenticated());
    assert!(store.load().expect("load").is_none());

    // Logging out again is fine - same end state.
    session.logout().expect("second logout");
    assert!(!session.is_authenticated());
}
