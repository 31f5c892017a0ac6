//! Vaultyard API library
//!
//! Warehouse layout backend: a lettered grid of vault fields, free-standing
//! racks with shelves and pallets, and couchbox field pairs.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod commands;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod layout;
pub mod metrics;
pub mod middleware_helpers;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer};
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: Arc<events::EventSender>,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), event_sender.clone(), &config);
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }

    pub fn warehouse_service(&self) -> Arc<services::WarehouseService> {
        self.services.warehouses.clone()
    }

    pub fn layout_service(&self) -> Arc<services::LayoutService> {
        self.services.layout.clone()
    }

    pub fn storage_service(&self) -> Arc<services::StorageService> {
        self.services.storage.clone()
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[test]
    fn validation_errors_are_listed() {
        let response = ApiResponse::<()>::validation_errors(vec!["missing".into()]);
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Validation failed"));
        assert_eq!(response.errors, Some(vec!["missing".to_string()]));
        assert!(response.meta.is_some_and(|m| m.request_id.is_none()));
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    let warehouses = Router::new()
        .route(
            "/warehouses",
            get(handlers::warehouses::list_warehouses).post(handlers::warehouses::create_warehouse),
        )
        .route(
            "/warehouses/:id",
            get(handlers::warehouses::get_warehouse).delete(handlers::warehouses::delete_warehouse),
        )
        .route(
            "/warehouses/:id/field-capacity",
            patch(handlers::warehouses::update_field_capacity),
        )
        .route(
            "/warehouses/:id/field-grid-position",
            patch(handlers::warehouses::set_field_grid_position),
        )
        .route(
            "/warehouses/:id/grid/resize",
            post(handlers::warehouses::resize_grid),
        );

    let racks = Router::new()
        .route(
            "/warehouses/:id/racks",
            get(handlers::racks::list_racks).post(handlers::racks::add_rack),
        )
        .route(
            "/warehouses/:id/racks/:rack_id/position",
            patch(handlers::racks::move_rack),
        )
        .route("/racks/:id", axum::routing::delete(handlers::racks::delete_rack))
        .route("/racks/:id/shelves", post(handlers::racks::add_shelf));

    let fields = Router::new()
        .route("/fields/:id", get(handlers::fields::get_field))
        .route("/fields/:id/type", patch(handlers::fields::set_field_type))
        .route("/fields/:id/full", patch(handlers::fields::set_field_full))
        .route(
            "/fields/:id/full/toggle",
            post(handlers::fields::toggle_field_full),
        );

    let storage = Router::new()
        .route(
            "/shelves/:id/pallets",
            get(handlers::storage::list_pallets).post(handlers::storage::add_pallet),
        )
        .route(
            "/pallets/:id",
            patch(handlers::storage::update_pallet).delete(handlers::storage::delete_pallet),
        )
        .route(
            "/vaults",
            get(handlers::storage::list_vaults).post(handlers::storage::add_vault),
        )
        .route("/vaults/staged", get(handlers::storage::list_staged_vaults))
        .route(
            "/vaults/:id",
            get(handlers::storage::get_vault)
                .patch(handlers::storage::update_vault)
                .delete(handlers::storage::delete_vault),
        )
        .route("/vaults/:id/stage", post(handlers::storage::stage_vault))
        .route("/vaults/:id/move", post(handlers::storage::move_vault));

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(warehouses)
        .merge(racks)
        .merge(fields)
        .merge(storage)
}

/// Full HTTP application: metrics, the v1 API, Swagger UI and the shared middleware stack.
///
/// CORS is left to the caller since its policy depends on deployment.
pub fn app_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::<AppState>::new()
        .route("/", get(|| async { "vaultyard-api up" }))
        .route("/metrics", get(metrics_endpoint))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .layer(crate::tracing::configure_http_tracing())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

async fn metrics_endpoint() -> (StatusCode, String) {
    match metrics::metrics_handler().await {
        Ok(body) => (StatusCode::OK, body),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            String::from("metrics error"),
        ),
    }
}

async fn api_status(State(state): State<AppState>) -> ApiResult<Value> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "vaultyard-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.config.environment,
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let db_status = match db::check_connection(&state.db).await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

// Request logging middleware
async fn request_logging_middleware(
    request: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    ::tracing::debug!(method = %method, uri = %uri, "Incoming request");

    let response = next.run(request).await;

    ::tracing::info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
