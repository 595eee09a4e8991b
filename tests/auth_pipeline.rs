//! End-to-end tests for the authenticated-request pipeline:
//! bearer injection, single-flight refresh, waiter broadcast, and the
//! forced-logout failure path.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use futures::future::join_all;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use ems_cli::api::error::ApiError;
use ems_cli::api::{client::EmsClient, employees, locations};
use ems_cli::auth::tokens::unix_now;
use ems_cli::auth::{AuthService, Session, SessionStore};
use ems_cli::models::{User, UserRole};

fn test_user() -> User {
    User {
        id: "u-1".into(),
        username: "ada".into(),
        email: "ada@example.com".into(),
        role: UserRole::HrManager,
        employee_id: None,
        created_at: "2024-01-01T00:00:00".into(),
        last_login: None,
    }
}

fn user_json() -> serde_json::Value {
    json!({
        "id": "u-1",
        "username": "ada",
        "email": "ada@example.com",
        "role": "HR_MANAGER",
        "employeeId": null,
        "createdAt": "2024-01-01T00:00:00",
        "lastLogin": null
    })
}

fn auth_response(token: &str) -> serde_json::Value {
    json!({
        "token": token,
        "refreshToken": "rt-2",
        "user": user_json(),
        "expiresIn": 3600
    })
}

fn location_json() -> serde_json::Value {
    json!({
        "id": "l-1",
        "name": "HQ",
        "address": null,
        "city": "Oslo",
        "state": "",
        "country": "NO",
        "postalCode": null
    })
}

fn seeded_store(token: &str) -> Arc<SessionStore> {
    let store = SessionStore::in_memory();
    store.set(Session {
        token: token.into(),
        refresh_token: "rt-1".into(),
        user: test_user(),
        expires_at: Some(unix_now() + 3600),
    });
    Arc::new(store)
}

fn harness(base_url: &str, store: Arc<SessionStore>) -> (Arc<AuthService>, EmsClient) {
    let auth = Arc::new(AuthService::new(base_url.to_string(), store));
    let client = EmsClient::new(auth.clone());
    (auth, client)
}

/// Signature-less JWT whose payload carries the given expiry.
fn fake_jwt(exp: u64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u-1","exp":{exp}}}"#));
    format!("{header}.{payload}.sig")
}

struct NoAuthorizationHeader;

impl Match for NoAuthorizationHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

struct DigestedPassword;

impl Match for DigestedPassword {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<serde_json::Value>(&request.body) else {
            return false;
        };
        let Some(password) = body["password"].as_str() else {
            return false;
        };
        // Username travels plaintext; the password must be a hex digest
        body["username"] == "ada"
            && password.len() == 64
            && password.chars().all(|c| c.is_ascii_hexdigit())
    }
}

#[tokio::test]
async fn concurrent_401s_trigger_exactly_one_refresh() {
    let server = MockServer::start().await;

    // Renewed token succeeds, anything else is rejected
    Mock::given(method("GET"))
        .and(path("/locations/l-1"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(location_json()))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/locations/l-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401, "error": "Unauthorized", "message": "JWT expired"
        })))
        .with_priority(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "rt-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("fresh-token")))
        .expect(1)
        .mount(&server)
        .await;

    let store = seeded_store("stale-token");
    let (_auth, client) = harness(&server.uri(), store.clone());

    let results = join_all((0..5).map(|_| locations::get(&client, "l-1"))).await;
    for result in results {
        assert_eq!(result.expect("request should resolve").name, "HQ");
    }
    assert_eq!(store.access_token().as_deref(), Some("fresh-token"));
}

#[tokio::test]
async fn refresh_failure_rejects_all_waiters_and_logs_out_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/l-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401, "error": "Unauthorized", "message": "JWT expired"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401, "error": "Unauthorized", "message": "Refresh token revoked"
        })))
        .expect(1)
        .mount(&server)
        .await;
    // Forced logout notifies the server exactly once
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = seeded_store("stale-token");
    let (_auth, client) = harness(&server.uri(), store.clone());

    let results = join_all((0..4).map(|_| locations::get(&client, "l-1"))).await;
    for result in results {
        assert!(matches!(result, Err(ApiError::SessionExpired)));
    }
    assert!(store.session().is_none(), "session must be cleared");
}

#[tokio::test]
async fn exempt_endpoints_skip_bearer_and_refresh() {
    let server = MockServer::start().await;

    // A 401 from login is a credential failure, not a refresh trigger
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(NoAuthorizationHeader)
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401, "error": "Unauthorized", "message": "Bad credentials"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("x")))
        .expect(0)
        .mount(&server)
        .await;

    let store = seeded_store("some-token");
    let (_auth, client) = harness(&server.uri(), store.clone());

    let result = client
        .post("/auth/login", &json!({ "username": "ada", "password": "deadbeef" }))
        .await;
    match result {
        Err(ApiError::Credential(msg)) => assert_eq!(msg, "Bad credentials"),
        other => panic!("expected credential error, got {other:?}"),
    }
    // The stored session survives a credential failure untouched
    assert_eq!(store.access_token().as_deref(), Some("some-token"));
}

#[tokio::test]
async fn request_is_not_retried_twice() {
    let server = MockServer::start().await;

    // Even the renewed token keeps getting rejected
    Mock::given(method("GET"))
        .and(path("/projects/p-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401, "error": "Unauthorized", "message": "JWT expired"
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("fresh-token")))
        .expect(1)
        .mount(&server)
        .await;

    let store = seeded_store("stale-token");
    let (_auth, client) = harness(&server.uri(), store);

    let result = ems_cli::api::projects::get(&client, "p-1").await;
    assert!(matches!(result, Err(ApiError::SessionExpired)));
}

#[tokio::test]
async fn login_reflects_immediately_in_auth_state() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(DigestedPassword)
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("t-1")))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(SessionStore::in_memory());
    let (auth, _client) = harness(&server.uri(), store.clone());

    assert!(!auth.is_authenticated());
    let session = auth.login("ada", "pw").await.unwrap();
    assert_eq!(session.user.username, "ada");

    assert!(auth.is_authenticated());
    assert_eq!(auth.current_user().unwrap().username, "ada");
    assert!(auth.has_role(UserRole::HrManager));
    assert!(auth.has_any_role(&[UserRole::SystemAdmin, UserRole::HrManager]));
    assert!(*auth.subscribe_authenticated().borrow());
    assert_eq!(store.refresh_token().as_deref(), Some("rt-2"));
}

#[tokio::test]
async fn startup_check_refreshes_an_expiring_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "rt-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("fresh-token")))
        .expect(1)
        .mount(&server)
        .await;

    // Expires in 3 minutes, inside the 5-minute lead
    let store = seeded_store(&fake_jwt(unix_now() + 180));
    let (auth, _client) = harness(&server.uri(), store.clone());

    auth.initialize().await;
    assert_eq!(store.access_token().as_deref(), Some("fresh-token"));
}

#[tokio::test]
async fn startup_check_leaves_a_healthy_token_alone() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("x")))
        .expect(0)
        .mount(&server)
        .await;

    let token = fake_jwt(unix_now() + 7200);
    let store = seeded_store(&token);
    let (auth, _client) = harness(&server.uri(), store.clone());

    auth.initialize().await;
    assert_eq!(store.access_token().as_deref(), Some(token.as_str()));
}

#[tokio::test]
async fn refresh_without_stored_token_fails_locally() {
    let server = MockServer::start().await;

    // Zero network calls of any kind
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response("x")))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(SessionStore::in_memory());
    let (auth, _client) = harness(&server.uri(), store);

    let result = auth.refresh_token().await;
    assert!(matches!(result, Err(ApiError::NoRefreshToken)));
}

#[tokio::test]
async fn employee_search_builds_sparse_query_strings() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/employees/search"))
        .and(wiremock::matchers::query_param("departmentId", "d-1"))
        .and(header("authorization", "Bearer good-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "e-1",
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "grace@example.com",
            "designation": "Engineer",
            "salary": 1000.0,
            "joiningDate": "2023-06-01"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let store = seeded_store("good-token");
    let (_auth, client) = harness(&server.uri(), store);

    let hits = employees::search(&client, None, Some("d-1"), None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].full_name(), "Grace Hopper");
}

#[tokio::test]
async fn validation_errors_carry_field_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/employees/create"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": 400,
            "error": "Validation Failed",
            "message": "First name: is required",
            "fieldErrors": [
                {"field": "firstName", "rejectedValue": null, "message": "is required"}
            ]
        })))
        .mount(&server)
        .await;

    let store = seeded_store("good-token");
    let (_auth, client) = harness(&server.uri(), store);

    let result = employees::create(&client, &json!({ "lastName": "Hopper" })).await;
    match result {
        Err(ApiError::Validation {
            message,
            field_errors,
        }) => {
            assert_eq!(message, "First name: is required");
            assert_eq!(field_errors[0].field, "firstName");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}
