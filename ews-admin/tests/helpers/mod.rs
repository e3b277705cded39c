//! Shared test fixtures for ews-admin integration tests
//!
//! - a fresh database in a temp directory per test
//! - request/response helpers for driving the router with `oneshot`
//! - an in-process stand-in for the Hubtel send endpoint

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use ews_admin::{build_router, AppState};
use ews_common::config::GatewayConfig;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
    _dir: TempDir,
}

impl TestApp {
    /// App pointed at an unroutable gateway; fine for tests that never send
    pub async fn new() -> Self {
        Self::with_gateway(GatewayConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            timeout_secs: Some(2),
            ..Default::default()
        })
        .await
    }

    pub async fn with_gateway(gateway: GatewayConfig) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let db = ews_common::db::init_database(&dir.path().join("ews.db"))
            .await
            .expect("init database");
        let state = AppState::new(db.clone(), gateway).expect("app state");

        Self {
            router: build_router(state),
            db,
            _dir: dir,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request("DELETE", uri, None).await
    }

    pub async fn create_group(&self, name: &str) -> String {
        let (status, body) = self.post("/api/groups", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::CREATED, "create group: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_dialect(&self, name: &str) -> String {
        let (status, body) = self.post("/api/dialects", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::CREATED, "create dialect: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_member(
        &self,
        name: &str,
        phone: &str,
        active: bool,
        group_ids: &[&str],
        dialect_ids: &[&str],
    ) -> String {
        let (status, body) = self
            .post(
                "/api/members",
                json!({
                    "name": name,
                    "phone": phone,
                    "is_active": active,
                    "group_ids": group_ids,
                    "dialect_ids": dialect_ids,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create member: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn store_credentials(&self) {
        let (status, _) = self
            .put(
                "/api/settings",
                json!({
                    "sender_id": "EWS",
                    "client_id": "test-client",
                    "client_secret": "test-secret",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}

/// Recorded calls and canned reply for the fake gateway
#[derive(Clone)]
pub struct MockGateway {
    pub calls: Arc<Mutex<Vec<HashMap<String, String>>>>,
    reply: Arc<(StatusCode, Value)>,
    pub base_url: String,
}

impl MockGateway {
    pub async fn start(status: StatusCode, body: Value) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock gateway");
        let addr = listener.local_addr().unwrap();

        let mock = Self {
            calls,
            reply: Arc::new((status, body)),
            base_url: format!("http://{}", addr),
        };

        let app = Router::new()
            .route("/v1/messages/send", get(mock_send))
            .with_state(mock.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        mock
    }

    pub async fn accepting() -> Self {
        Self::start(
            StatusCode::OK,
            json!({ "MessageId": "msg-0001", "Status": 0, "Rate": 0.03 }),
        )
        .await
    }

    pub fn config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: Some(self.base_url.clone()),
            timeout_secs: Some(5),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<HashMap<String, String>> {
        self.calls.lock().unwrap().clone()
    }
}

async fn mock_send(
    State(mock): State<MockGateway>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    mock.calls.lock().unwrap().push(params);
    let (status, body) = mock.reply.as_ref();
    (*status, Json(body.clone()))
}
