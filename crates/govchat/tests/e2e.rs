// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the gateway router with scripted adapters.
//!
//! Covers the full chat-turn scenarios: sequence stamping across turns,
//! the missing-governance-token rejection, scope-failure and reply-failure
//! short-circuits, and the sign-in/redirect/sign-out flow.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use govchat_completion::CannedResponder;
use govchat_core::ReplyGenerator;
use govchat_gateway::{router, AppState, AuthSettings, Notifier};
use govchat_session::{SessionStore, SESSION_COOKIE};
use govchat_test_utils::{
    fake_token, GovernanceFailure, MockGovernance, MockIdentity, MockReplyGenerator,
};

struct TestApp {
    app: Router,
    state: AppState,
    governance: MockGovernance,
    identity: MockIdentity,
}

fn build_app(replies: Arc<dyn ReplyGenerator>) -> TestApp {
    let governance = MockGovernance::new();
    let identity = MockIdentity::for_subject("user-1");

    let state = AppState {
        sessions: SessionStore::new(Duration::from_secs(3600)),
        identity: Arc::new(identity.clone()),
        governance: Arc::new(governance.clone()),
        replies,
        notifier: Notifier::new(),
        auth: AuthSettings {
            scopes: vec!["User.Read".to_string(), "openid".to_string()],
            purview_scopes: vec!["https://gov.example/.default".to_string()],
            redirect_uri: "http://localhost:3000/auth/redirect".to_string(),
            post_logout_redirect_uri: "/".to_string(),
            cookie_secure: false,
        },
    };

    TestApp {
        app: router(state.clone()),
        state,
        governance,
        identity,
    }
}

/// Creates an authenticated session with a governance token and returns the
/// cookie id.
async fn signed_in_session(state: &AppState) -> String {
    let (id, handle) = state.sessions.create();
    let outcome = state
        .identity
        .exchange_code("good-code", &[], "http://localhost/r")
        .await
        .expect("mock exchange succeeds");
    let mut session = handle.lock().await;
    session.user_name = Some(outcome.account.user_name().to_string());
    session.account = Some(outcome.account);
    session.primary_token = Some(outcome.token);
    session.purview_token = Some(fake_token("user-1"));
    id
}

fn cookie_header(session_id: &str) -> String {
    format!("{SESSION_COOKIE}={session_id}")
}

async fn send_message(
    app: &Router,
    session_id: &str,
    message: &str,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/chat/send")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie_header(session_id))
        .body(Body::from(
            serde_json::json!({ "message": message }).to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

#[tokio::test]
async fn first_hello_turn_stamps_sequence_and_draws_greeting() {
    let t = build_app(Arc::new(CannedResponder::new()));
    let session_id = signed_in_session(&t.state).await;

    let (status, body) = send_message(&t.app, &session_id, "hello").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let reply = body["botResponse"].as_str().expect("reply present");
    assert!(
        CannedResponder::bucket_for("hello").contains(&reply),
        "reply should come from the greeting bucket, got: {reply}"
    );

    let submissions = t.governance.submissions().await;
    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[0].sequence_no, 1);
    assert_eq!(submissions[0].payload, "hello");
    assert_eq!(submissions[1].sequence_no, 2);
    assert_eq!(submissions[1].payload, reply);
    assert_eq!(submissions[0].conversation_id, submissions[1].conversation_id);
}

#[tokio::test]
async fn second_turn_reuses_conversation_and_continues_sequence() {
    let t = build_app(Arc::new(MockReplyGenerator::new()));
    let session_id = signed_in_session(&t.state).await;

    let (status, _) = send_message(&t.app, &session_id, "hello").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_message(&t.app, &session_id, "how are you").await;
    assert_eq!(status, StatusCode::OK);

    let submissions = t.governance.submissions().await;
    assert_eq!(submissions.len(), 4);
    let sequences: Vec<u64> = submissions.iter().map(|s| s.sequence_no).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4]);
    // One conversation across both turns.
    assert!(submissions
        .iter()
        .all(|s| s.conversation_id == submissions[0].conversation_id));
}

#[tokio::test]
async fn missing_purview_token_rejects_before_any_outbound_call() {
    let replies = MockReplyGenerator::new();
    let t = build_app(Arc::new(replies.clone()));
    let session_id = signed_in_session(&t.state).await;
    t.state
        .sessions
        .get(&session_id)
        .unwrap()
        .lock()
        .await
        .purview_token = None;

    let (status, body) = send_message(&t.app, &session_id, "hello").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Purview token not available");

    // No governance or completion calls were made.
    assert!(t.governance.scope_calls().await.is_empty());
    assert_eq!(t.governance.submission_count().await, 0);
    assert_eq!(replies.call_count().await, 0);
}

#[tokio::test]
async fn scope_failure_produces_no_submission_and_no_reply() {
    let replies = MockReplyGenerator::new();
    let t = build_app(Arc::new(replies.clone()));
    let session_id = signed_in_session(&t.state).await;
    t.governance
        .fail_next_scope_query(GovernanceFailure::Unavailable)
        .await;

    let (status, body) = send_message(&t.app, &session_id, "hello").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(t.governance.submission_count().await, 0);
    assert_eq!(replies.call_count().await, 0);
}

#[tokio::test]
async fn reply_failure_skips_download_submission() {
    let replies = MockReplyGenerator::new();
    let t = build_app(Arc::new(replies.clone()));
    let session_id = signed_in_session(&t.state).await;
    replies.fail_next().await;

    let (status, body) = send_message(&t.app, &session_id, "hello").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    // Only the upload landed.
    let submissions = t.governance.submissions().await;
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].sequence_no, 1);
}

#[tokio::test]
async fn unauthenticated_send_is_rejected() {
    let t = build_app(Arc::new(MockReplyGenerator::new()));

    let request = Request::builder()
        .method("POST")
        .uri("/chat/send")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"message": "hello"}"#))
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(t.governance.submission_count().await, 0);
}

#[tokio::test]
async fn unauthenticated_chat_page_redirects_to_signin() {
    let t = build_app(Arc::new(MockReplyGenerator::new()));

    let request = Request::builder()
        .method("GET")
        .uri("/chat")
        .body(Body::empty())
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/auth/signin"
    );
}

#[tokio::test]
async fn signin_redirects_to_authorization_url() {
    let t = build_app(Arc::new(MockReplyGenerator::new()));

    let request = Request::builder()
        .method("GET")
        .uri("/auth/signin")
        .body(Body::empty())
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://login.example/authorize"));
    assert!(location.contains("User.Read"));
}

#[tokio::test]
async fn redirect_flow_creates_session_and_enables_chat() {
    let t = build_app(Arc::new(MockReplyGenerator::new()));

    // The provider posts the authorization code back as a form.
    let request = Request::builder()
        .method("POST")
        .uri("/auth/redirect")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("code=good-code"))
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/chat");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie set")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with(&format!("{SESSION_COOKIE}=")));
    assert!(set_cookie.contains("HttpOnly"));
    let session_id = set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, v)| v.to_string())
        .unwrap();

    // The governance token was acquired silently during sign-in, so a chat
    // turn works immediately.
    let (status, body) = send_message(&t.app, &session_id, "hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(t.governance.submission_count().await, 2);
}

#[tokio::test]
async fn provider_error_on_redirect_is_surfaced() {
    let t = build_app(Arc::new(MockReplyGenerator::new()));

    let request = Request::builder()
        .method("POST")
        .uri("/auth/redirect")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "error=access_denied&error_description=user+declined",
        ))
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn signout_invalidates_the_session() {
    let t = build_app(Arc::new(MockReplyGenerator::new()));
    let session_id = signed_in_session(&t.state).await;

    let request = Request::builder()
        .method("GET")
        .uri("/auth/signout")
        .header(header::COOKIE, cookie_header(&session_id))
        .body(Body::empty())
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://login.example/logout"));

    // The old cookie no longer resolves a session.
    let (status, _) = send_message(&t.app, &session_id, "hello").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn purview_token_info_reports_decoded_claims() {
    let t = build_app(Arc::new(MockReplyGenerator::new()));
    let session_id = signed_in_session(&t.state).await;

    let request = Request::builder()
        .method("GET")
        .uri("/purview/token")
        .header(header::COOKIE, cookie_header(&session_id))
        .body(Body::empty())
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["tokenAvailable"], true);
    assert_eq!(body["decodedToken"]["oid"], "user-1");
}

#[tokio::test]
async fn purview_query_returns_scope_identifier() {
    let t = build_app(Arc::new(MockReplyGenerator::new()));
    let session_id = signed_in_session(&t.state).await;
    t.governance.push_scope("scope-e2e").await;

    let request = Request::builder()
        .method("POST")
        .uri("/purview/query")
        .header(header::COOKIE, cookie_header(&session_id))
        .body(Body::empty())
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["scopeIdentifier"], "scope-e2e");
    assert_eq!(t.governance.scope_calls().await, vec!["user-1"]);
}

#[tokio::test]
async fn refresh_route_updates_the_session_token() {
    let t = build_app(Arc::new(MockReplyGenerator::new()));
    let session_id = signed_in_session(&t.state).await;
    t.identity.push_silent_token(fake_token("user-1")).await;

    let request = Request::builder()
        .method("GET")
        .uri("/auth/purviewToken")
        .header(header::COOKIE, cookie_header(&session_id))
        .body(Body::empty())
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["accessToken"].is_string());
    assert!(body["expiresOn"].is_string());
    // signed_in_session seeds the token directly; only the refresh route
    // performed a silent acquisition.
    assert_eq!(t.identity.silent_calls().await, 1);
}
