#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;
use vaultyard_api::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    AppState,
};

/// Application harness backed by a private in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // one connection keeps every query on the same in-memory database
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = vaultyard_api::app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and decodes the JSON response body.
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Asserts the status and returns the envelope's `data`.
    pub async fn ok(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        expected: StatusCode,
    ) -> Value {
        let (status, value) = self.call(method, uri, body).await;
        assert_eq!(status, expected, "unexpected status for {uri}: {value}");
        assert_eq!(value["success"], json!(true));
        value["data"].clone()
    }

    /// Asserts an error status and returns the error message.
    pub async fn err(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        expected: StatusCode,
    ) -> String {
        let (status, value) = self.call(method, uri, body).await;
        assert_eq!(status, expected, "unexpected status for {uri}: {value}");
        value["message"]
            .as_str()
            .expect("error body carries a message")
            .to_string()
    }

    pub async fn create_warehouse(&self, body: Value) -> Value {
        self.ok(Method::POST, "/api/v1/warehouses", Some(body), StatusCode::CREATED)
            .await
    }

    /// A 20 x 20 floor with a `cols` x `rows` field grid at the origin.
    pub async fn floor(&self, name: &str, cols: i32, rows: i32) -> Value {
        self.create_warehouse(json!({
            "name": name,
            "cols": cols,
            "rows": rows,
            "width": 20.0,
            "length": 20.0
        }))
        .await
    }

    pub async fn layout(&self, warehouse_id: i64) -> Value {
        self.ok(
            Method::GET,
            &format!("/api/v1/warehouses/{warehouse_id}"),
            None,
            StatusCode::OK,
        )
        .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Id of the field called `name` in a list of serialized fields.
pub fn field_id(fields: &Value, name: &str) -> i64 {
    fields
        .as_array()
        .expect("fields array")
        .iter()
        .find(|f| f["name"] == name)
        .and_then(|f| f["id"].as_i64())
        .unwrap_or_else(|| panic!("no field named {name}"))
}

/// Sorted names of a list of serialized fields.
pub fn field_names(fields: &Value) -> Vec<String> {
    let mut names: Vec<String> = fields
        .as_array()
        .expect("fields array")
        .iter()
        .filter_map(|f| f["name"].as_str().map(str::to_string))
        .collect();
    names.sort();
    names
}
