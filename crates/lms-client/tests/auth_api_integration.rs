//! Integration tests for the HTTP auth interactor
//!
//! These tests use wiremock to stand in for the platform and check the full
//! token + profile exchange and the mapping of failures to `AuthError`.

use app_core::auth::{AuthError, AuthInteractor, LoginFailure, OAuthCredential};
use app_core::messages;
use app_core::config::Config;
use lms_client::interactor::{ACCESS_TOKEN_PATH, USER_INFO_PATH};
use lms_client::HttpAuthInteractor;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token_path() -> String {
    format!("/{}", ACCESS_TOKEN_PATH)
}

fn user_path() -> String {
    format!("/{}", USER_INFO_PATH)
}

fn interactor_for(server: &MockServer) -> HttpAuthInteractor {
    let config = Config::new(&server.uri(), "test-client", false).unwrap();
    HttpAuthInteractor::new(&config).unwrap()
}

fn user_body() -> serde_json::Value {
    json!({
        "id": 42,
        "username": "learner",
        "email": "learner@example.com",
        "name": "Ada Learner"
    })
}

// =============================================================================
// Successful Login Tests
// =============================================================================

#[tokio::test]
async fn test_password_login_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(token_path()))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("client_id=test-client"))
        .and(body_string_contains("username=learner%40example.com"))
        .and(header("User-Agent", concat!("org.campus.mobile/", env!("CARGO_PKG_VERSION"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-token",
            "token_type": "JWT",
            "expires_in": 3600,
            "refresh_token": "refresh"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(user_path()))
        .and(header("Authorization", "JWT jwt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .expect(1)
        .mount(&server)
        .await;

    let interactor = interactor_for(&server);
    let user = interactor
        .login("learner@example.com", "correct horse")
        .await
        .unwrap();

    assert_eq!(user.id, 42);
    assert_eq!(user.username, "learner");
    assert_eq!(user.name.as_deref(), Some("Ada Learner"));

    let token = interactor.token_store().current().unwrap();
    assert_eq!(token.credential.access_token, "jwt-token");
    assert!(token.expires_at().is_some());
}

#[tokio::test]
async fn test_credential_login_uses_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(user_path()))
        .and(header("Authorization", "Bearer web-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .expect(1)
        .mount(&server)
        .await;

    let interactor = interactor_for(&server);
    let user = interactor
        .login_with_credential(&OAuthCredential::bearer("web-token"))
        .await
        .unwrap();

    assert_eq!(user.id, 42);
    assert!(interactor.token_store().is_authenticated());
}

// =============================================================================
// Error Mapping Tests
// =============================================================================

#[tokio::test]
async fn test_invalid_grant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(user_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .expect(0)
        .mount(&server)
        .await;

    let interactor = interactor_for(&server);
    let err = interactor.login("learner@example.com", "wrong pass").await.unwrap_err();

    assert_eq!(err, AuthError::InvalidGrant);
    assert!(!interactor.token_store().is_authenticated());
}

#[tokio::test]
async fn test_invalid_grant_with_description() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid credentials given."
        })))
        .mount(&server)
        .await;

    let interactor = interactor_for(&server);
    let err = interactor.login("learner@example.com", "wrong pass").await.unwrap_err();

    assert_eq!(err, AuthError::InvalidGrant);
    assert_eq!(LoginFailure::from(&err).message(), messages::INVALID_CREDENTIALS);
}

#[tokio::test]
async fn test_out_of_range_lifetime_never_expires() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-token",
            "token_type": "JWT",
            "expires_in": i64::MAX
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(user_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .mount(&server)
        .await;

    let interactor = interactor_for(&server);
    interactor.login("learner@example.com", "correct horse").await.unwrap();

    let token = interactor.token_store().current().unwrap();
    assert_eq!(token.expires_at(), None);
    assert!(!token.is_expired());
}

#[tokio::test]
async fn test_validation_payload_with_description() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_request",
            "error_description": "This account has been disabled."
        })))
        .mount(&server)
        .await;

    let interactor = interactor_for(&server);
    let err = interactor.login("learner@example.com", "password1").await.unwrap_err();

    match err {
        AuthError::Validation(payload) => {
            assert_eq!(payload.error_description(), Some("This account has been disabled."));
            assert_eq!(payload.data().get("error"), Some(&json!("invalid_request")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_without_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let interactor = interactor_for(&server);
    let err = interactor.login("learner@example.com", "password1").await.unwrap_err();

    assert_eq!(
        err,
        AuthError::Api {
            status: 503,
            message: "HTTP 503".to_string()
        }
    );
}

#[tokio::test]
async fn test_profile_failure_clears_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(user_path()))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let interactor = interactor_for(&server);
    let err = interactor
        .login_with_credential(&OAuthCredential::bearer("web-token"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Api { status: 500, .. }));
    assert!(!interactor.token_store().is_authenticated());
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let interactor = interactor_for(&server);
    let err = interactor.login("learner@example.com", "password1").await.unwrap_err();

    assert!(matches!(err, AuthError::Unknown(_)));
}

#[tokio::test]
async fn test_timeout_is_connectivity_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "late"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = Config::new(&server.uri(), "test-client", false)
        .unwrap()
        .with_request_timeout(Duration::from_millis(50));
    let interactor = HttpAuthInteractor::new(&config).unwrap();

    let err = interactor.login("learner@example.com", "password1").await.unwrap_err();
    assert!(matches!(err, AuthError::Connectivity(_)));
}
