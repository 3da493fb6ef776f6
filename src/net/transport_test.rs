use super::*;
use crate::net::error::ErrorKind;
use crate::net::types::Role;
use crate::state::navigation::Route;
use crate::state::store::{MemorySessionStore, SessionStore};
use std::collections::BTreeSet;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALICE_BASIC: &str = "Basic YWxpY2U6cHcx";

struct Harness {
    server: MockServer,
    transport: Transport,
    store: Arc<MemorySessionStore>,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let store = Arc::new(MemorySessionStore::new());
    let session = Arc::new(SessionContext::restore(store.clone()));
    let navigator = Arc::new(Navigator::default());
    let transport = Transport::new(&server.uri(), Timeouts::default(), session, navigator).unwrap();
    Harness { server, transport, store }
}

async fn mount_identity(server: &MockServer, admin_status: u16) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("Authorization", ALICE_BASIC))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hi alice"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/all-users"))
        .respond_with(ResponseTemplate::new(admin_status).set_body_json(serde_json::json!([])))
        .mount(server)
        .await;
}

async fn login_alice(h: &Harness, admin_status: u16) {
    mount_identity(&h.server, admin_status).await;
    h.transport.session().login(&h.transport, "alice", "pw1").await.unwrap();
    h.transport.navigator().navigate(Route::Journals);
}

// =========================================================================
// login through the real probe
// =========================================================================

#[tokio::test]
async fn login_non_admin_when_probe_forbidden() {
    let h = harness().await;
    mount_identity(&h.server, 403).await;

    let user = h.transport.session().login(&h.transport, "alice", "pw1").await.unwrap();
    assert_eq!(user.roles, BTreeSet::from([Role::User]));
    assert!(h.transport.session().is_authenticated());
}

#[tokio::test]
async fn login_admin_when_probe_succeeds() {
    let h = harness().await;
    mount_identity(&h.server, 200).await;

    let user = h.transport.session().login(&h.transport, "alice", "pw1").await.unwrap();
    assert_eq!(user.roles, BTreeSet::from([Role::Admin, Role::User]));
}

#[tokio::test]
async fn login_with_bad_credentials_persists_nothing() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let err = h.transport.session().login(&h.transport, "alice", "nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(!h.transport.session().is_authenticated());
    assert!(h.store.is_empty());

    let probed_admin = h
        .server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .any(|r| r.url.path() == "/admin/all-users");
    assert!(!probed_admin);
}

// =========================================================================
// outbound stage
// =========================================================================

#[tokio::test]
async fn authenticated_request_carries_basic_header() {
    let h = harness().await;
    login_alice(&h, 403).await;
    Mock::given(method("GET"))
        .and(path("/journal"))
        .and(header("Authorization", ALICE_BASIC))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&h.server)
        .await;

    let reply = h.transport.send_empty(Method::GET, "/journal").await.unwrap();
    assert_eq!(reply.body, "[]");
}

#[tokio::test]
async fn anonymous_request_has_no_authorization_header() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/public/create-user"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&h.server)
        .await;

    h.transport
        .send(Method::POST, "/public/create-user", Some(&serde_json::json!({ "userName": "bob" })))
        .await
        .unwrap();

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

// =========================================================================
// inbound stage
// =========================================================================

#[tokio::test]
async fn rejection_clears_session_and_redirects_to_login() {
    let h = harness().await;
    login_alice(&h, 403).await;
    Mock::given(method("GET"))
        .and(path("/journal"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let err = h.transport.send_empty(Method::GET, "/journal").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!h.transport.session().is_authenticated());
    assert!(h.store.load().is_none());
    assert_eq!(h.transport.navigator().current(), Route::Login);
}

#[tokio::test]
async fn concurrent_rejections_log_out_exactly_once() {
    let h = harness().await;
    login_alice(&h, 403).await;
    Mock::given(method("GET"))
        .and(path("/journal"))
        .respond_with(ResponseTemplate::new(401))
        .expect(3)
        .mount(&h.server)
        .await;
    let generation = h.transport.session().generation();

    let (a, b, c) = tokio::join!(
        h.transport.send_empty(Method::GET, "/journal"),
        h.transport.send_empty(Method::GET, "/journal"),
        h.transport.send_empty(Method::GET, "/journal"),
    );

    for result in [a, b, c] {
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }
    assert_eq!(h.transport.session().generation(), generation + 1);
    assert!(h.store.load().is_none());
    assert_eq!(h.transport.navigator().current(), Route::Login);
}

#[tokio::test]
async fn server_error_passes_through_and_keeps_session() {
    let h = harness().await;
    login_alice(&h, 403).await;
    Mock::given(method("PUT"))
        .and(path("/journal/id/e1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&h.server)
        .await;

    let err = h
        .transport
        .send(Method::PUT, "/journal/id/e1", Some(&serde_json::json!({ "title": "t", "content": "c" })))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Server);
    assert!(matches!(err, ApiError::Status { status: 500, ref body } if body == "db down"));
    assert!(h.transport.session().is_authenticated());
    assert_eq!(h.transport.navigator().current(), Route::Journals);
}

#[tokio::test]
async fn forbidden_passes_through_and_keeps_session() {
    let h = harness().await;
    login_alice(&h, 403).await;

    let err = h.transport.send_empty(Method::GET, "/admin/all-users").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAuthorized);
    assert!(h.transport.session().is_authenticated());
}

#[tokio::test]
async fn unreachable_backend_leaves_session_alone() {
    let store = Arc::new(MemorySessionStore::new());
    let seeded = crate::state::session::Session {
        credential: Credential::encode("alice", "pw1"),
        user: crate::net::types::SessionUser::resolved("alice", false),
    };
    store.save(&seeded).unwrap();
    let session = Arc::new(SessionContext::restore(store.clone()));
    let navigator = Arc::new(Navigator::new(Route::Journals));
    // Nothing listens on port 1.
    let transport = Transport::new("http://127.0.0.1:1", Timeouts::default(), session, navigator).unwrap();

    let err = transport.send_empty(Method::GET, "/journal").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(transport.session().is_authenticated());
    assert_eq!(store.load(), Some(seeded));
    assert_eq!(transport.navigator().current(), Route::Journals);
}

#[tokio::test]
async fn anonymous_rejection_redirects_without_error_loop() {
    let h = harness().await;
    h.transport.navigator().navigate(Route::Register);
    Mock::given(method("POST"))
        .and(path("/public/create-user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let err = h.transport.send(Method::POST, "/public/create-user", Some(&serde_json::json!({}))).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(h.transport.navigator().current(), Route::Login);
    assert!(!h.transport.navigator().redirect_to_login());
}
