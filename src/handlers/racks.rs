use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::{
    commands::racks::{AddRackCommand, AddShelfCommand, MoveRackCommand},
    dto::RackView,
    entities::{rack, shelf},
    errors::ServiceError,
    ApiResponse, ApiResult, AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/warehouses/{id}/racks",
    params(("id" = i32, Path, description = "Warehouse ID")),
    responses(
        (status = 200, description = "Racks with shelves and pallets", body = ApiResponse<Vec<RackView>>),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "racks"
)]
pub async fn list_racks(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<RackView>> {
    let racks = state.services.layout.list_racks(id).await?;
    Ok(Json(ApiResponse::success(racks)))
}

#[utoipa::path(
    post,
    path = "/api/v1/warehouses/{id}/racks",
    params(("id" = i32, Path, description = "Warehouse ID")),
    request_body = AddRackCommand,
    responses(
        (status = 201, description = "Rack placed", body = ApiResponse<RackView>),
        (status = 400, description = "Missing or invalid dimensions, capacity or position", body = crate::errors::ErrorResponse),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "racks"
)]
pub async fn add_rack(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<AddRackCommand>,
) -> Result<(StatusCode, Json<ApiResponse<RackView>>), ServiceError> {
    payload.warehouse_id = id;
    let rack = state.services.layout.add_rack(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(rack))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/warehouses/{id}/racks/{rack_id}/position",
    params(
        ("id" = i32, Path, description = "Warehouse ID"),
        ("rack_id" = i32, Path, description = "Rack ID")
    ),
    request_body = MoveRackCommand,
    responses(
        (status = 200, description = "Rack moved", body = ApiResponse<rack::Model>),
        (status = 400, description = "Invalid rack position", body = crate::errors::ErrorResponse),
        (status = 404, description = "Warehouse or rack not found", body = crate::errors::ErrorResponse)
    ),
    tag = "racks"
)]
pub async fn move_rack(
    State(state): State<AppState>,
    Path((id, rack_id)): Path<(i32, i32)>,
    Json(mut payload): Json<MoveRackCommand>,
) -> ApiResult<rack::Model> {
    payload.warehouse_id = id;
    payload.rack_id = rack_id;
    let rack = state.services.layout.move_rack(payload).await?;
    Ok(Json(ApiResponse::success(rack)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/racks/{id}",
    params(("id" = i32, Path, description = "Rack ID")),
    responses(
        (status = 200, description = "Rack, shelves and pallets deleted"),
        (status = 404, description = "Rack not found", body = crate::errors::ErrorResponse)
    ),
    tag = "racks"
)]
pub async fn delete_rack(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Value> {
    state.services.layout.delete_rack(id).await?;
    Ok(Json(ApiResponse::success(json!({ "rackId": id }))))
}

#[utoipa::path(
    post,
    path = "/api/v1/racks/{id}/shelves",
    params(("id" = i32, Path, description = "Rack ID")),
    request_body = AddShelfCommand,
    responses(
        (status = 201, description = "Shelf added", body = ApiResponse<shelf::Model>),
        (status = 404, description = "Rack not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Shelf name taken", body = crate::errors::ErrorResponse)
    ),
    tag = "racks"
)]
pub async fn add_shelf(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<AddShelfCommand>,
) -> Result<(StatusCode, Json<ApiResponse<shelf::Model>>), ServiceError> {
    payload.rack_id = id;
    let shelf = state.services.layout.add_shelf(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(shelf))))
}
