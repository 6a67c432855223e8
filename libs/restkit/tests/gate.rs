//! Gate surface: login route, bearer sessions, docs serving, health check.

mod common;

use std::sync::Arc;

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use common::{body_json, get, json_request, BooksResource, TestAdaptor};
use restkit::error::{HttpError, OpError};
use restkit::{
    Actor, AuthRef, BearerGuard, Gate, GateConfig, JsonReply, LoginHandler, LoginOptions,
    MountDefaults, OperationKind, ResourceDef, TokenVerifier,
};

/// Token store shared between the login handler and the verifier.
struct TestSessions {
    sessions: Mutex<HashMap<String, Actor>>,
}

impl TestSessions {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: Mutex::new(HashMap::new()),
        })
    }
}

#[async_trait]
impl LoginHandler for TestSessions {
    async fn login(&self, body: serde_json::Value) -> Result<JsonReply, OpError> {
        if body["username"] == "admin" && body["password"] == "admin" {
            self.sessions
                .lock()
                .unwrap()
                .insert("tok-1".to_string(), Actor::new("admin"));
            Ok(JsonReply::ok(json!({ "token": "tok-1" })))
        } else {
            Err(HttpError::unauthorized("Bad credentials").into())
        }
    }
}

#[async_trait]
impl TokenVerifier for TestSessions {
    async fn verify(&self, token: &str) -> anyhow::Result<Actor> {
        self.sessions
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown token"))
    }
}

fn guarded_gate(sessions: Arc<TestSessions>) -> Gate {
    let mut config = GateConfig::default();
    config.docs.enabled = false;
    Gate::new(config)
        .guard("bearerAuth", Arc::new(BearerGuard::new(sessions.clone())))
        .login(LoginOptions::default(), sessions)
        .unwrap()
        .mount(
            &MountDefaults::default().with_auth(AuthRef::named("bearerAuth")),
            vec![ResourceDef::new(BooksResource::new(vec![
                OperationKind::Create,
                OperationKind::Get,
            ]))],
        )
        .unwrap()
}

#[tokio::test]
async fn login_then_use_the_session_token() {
    let sessions = TestSessions::new();
    let router = guarded_gate(sessions).into_router();

    // Guarded route without a token is rejected.
    let resp = router.clone().oneshot(get("/books/1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Login issues a token.
    let resp = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            json!({ "username": "admin", "password": "admin" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let token = body_json(resp).await["token"].as_str().unwrap().to_string();

    // The token opens the guarded route and the actor reaches the resource.
    let resp = router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/books")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {token}"))
                .body(axum::body::Body::from(
                    serde_json::to_string(&json!({ "title": "T" })).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn bad_credentials_collapse_to_login_failed() {
    let router = guarded_gate(TestSessions::new()).into_router();
    let resp = router
        .oneshot(json_request(
            "POST",
            "/login",
            json!({ "username": "admin", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await, json!({ "message": "Login failed" }));
}

#[tokio::test]
async fn login_body_is_validated_against_the_field_schema() {
    let router = guarded_gate(TestSessions::new()).into_router();

    // Unknown field.
    let resp = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            json!({ "username": "admin", "password": "admin", "otp": "123" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Missing field.
    let resp = router
        .oneshot(json_request("POST", "/login", json!({ "username": "admin" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stale_token_is_rejected() {
    let router = guarded_gate(TestSessions::new()).into_router();
    let resp = router
        .oneshot(
            axum::http::Request::builder()
                .uri("/books/1")
                .header("authorization", "Bearer not-a-session")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(resp).await,
        json!({ "message": "Session check failed" })
    );
}

#[tokio::test]
async fn docs_document_covers_every_mounted_route() {
    let mut config = GateConfig::default();
    config.docs.title = "Books API".to_string();
    let gate = Gate::new(config)
        .mount(
            &MountDefaults::default(),
            vec![ResourceDef::new(BooksResource::new(vec![
                OperationKind::Create,
                OperationKind::Get,
                OperationKind::List,
            ]))
            .with_list_adaptor(Arc::new(TestAdaptor))],
        )
        .unwrap();
    let router = gate.into_router();

    let resp = router
        .clone()
        .oneshot(get("/documentations/openapi.json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-store");
    let doc = body_json(resp).await;
    assert_eq!(doc["info"]["title"], "Books API");
    assert!(doc["paths"]["/books"]["post"].is_object());
    assert!(doc["paths"]["/books"]["get"].is_object());
    assert!(doc["paths"]["/books/{id}"]["get"].is_object());
    // The list query parameters come from the adaptor.
    let params = doc["paths"]["/books"]["get"]["parameters"].as_array().unwrap();
    let names: Vec<&str> = params.iter().filter_map(|p| p["name"].as_str()).collect();
    assert!(names.contains(&"limit"));
    assert!(names.contains(&"offset"));

    let resp = router.oneshot(get("/documentations")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_check_is_open() {
    let mut config = GateConfig::default();
    config.docs.enabled = false;
    let router = Gate::new(config).into_router();
    let resp = router.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
