use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::{
    commands::{
        grid::ResizeGridCommand,
        warehouses::{CreateWarehouseCommand, SetFieldGridPositionCommand, UpdateFieldCapacityCommand},
    },
    dto::{ResizeGridResult, WarehouseLayout, WarehouseSummary},
    entities::warehouse,
    errors::ServiceError,
    ApiResponse, ApiResult, AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/warehouses",
    responses(
        (status = 200, description = "Warehouses with their fields", body = ApiResponse<Vec<WarehouseSummary>>)
    ),
    tag = "warehouses"
)]
pub async fn list_warehouses(State(state): State<AppState>) -> ApiResult<Vec<WarehouseSummary>> {
    let warehouses = state.services.warehouses.list_warehouses().await?;
    Ok(Json(ApiResponse::success(warehouses)))
}

#[utoipa::path(
    post,
    path = "/api/v1/warehouses",
    request_body = CreateWarehouseCommand,
    responses(
        (status = 201, description = "Warehouse and field grid created", body = ApiResponse<WarehouseSummary>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already taken", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(payload): Json<CreateWarehouseCommand>,
) -> Result<(StatusCode, Json<ApiResponse<WarehouseSummary>>), ServiceError> {
    let created = state.services.warehouses.create_warehouse(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouses/{id}",
    params(("id" = i32, Path, description = "Warehouse ID")),
    responses(
        (status = 200, description = "Fields, racks, shelves and pallets of one warehouse", body = ApiResponse<WarehouseLayout>),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<WarehouseLayout> {
    let layout = state.services.warehouses.get_warehouse_layout(id).await?;
    Ok(Json(ApiResponse::success(layout)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/warehouses/{id}",
    params(("id" = i32, Path, description = "Warehouse ID")),
    responses(
        (status = 200, description = "Warehouse and its contents deleted"),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn delete_warehouse(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    state.services.warehouses.delete_warehouse(id).await?;
    Ok(Json(ApiResponse::success(json!({
        "message": "Warehouse deleted successfully",
        "warehouseId": id
    }))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/warehouses/{id}/field-capacity",
    params(("id" = i32, Path, description = "Warehouse ID")),
    request_body = UpdateFieldCapacityCommand,
    responses(
        (status = 200, description = "Field capacity updated", body = ApiResponse<warehouse::Model>),
        (status = 400, description = "Invalid capacity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Warehouse changed concurrently", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn update_field_capacity(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<UpdateFieldCapacityCommand>,
) -> ApiResult<warehouse::Model> {
    payload.warehouse_id = id;
    let updated = state.services.warehouses.update_field_capacity(payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/warehouses/{id}/field-grid-position",
    params(("id" = i32, Path, description = "Warehouse ID")),
    request_body = SetFieldGridPositionCommand,
    responses(
        (status = 200, description = "Field grid moved", body = ApiResponse<warehouse::Model>),
        (status = 400, description = "Invalid position", body = crate::errors::ErrorResponse),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn set_field_grid_position(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<SetFieldGridPositionCommand>,
) -> ApiResult<warehouse::Model> {
    payload.warehouse_id = id;
    let updated = state.services.warehouses.set_field_grid_position(payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    post,
    path = "/api/v1/warehouses/{id}/grid/resize",
    params(("id" = i32, Path, description = "Warehouse ID")),
    request_body = ResizeGridCommand,
    responses(
        (status = 200, description = "Grid resized", body = ApiResponse<ResizeGridResult>),
        (status = 400, description = "Unknown edge, bad count or occupied fields", body = crate::errors::ErrorResponse),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Warehouse changed concurrently", body = crate::errors::ErrorResponse)
    ),
    tag = "fields"
)]
pub async fn resize_grid(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<ResizeGridCommand>,
) -> ApiResult<ResizeGridResult> {
    payload.warehouse_id = id;
    let result = state.services.layout.resize_grid(payload).await?;
    Ok(Json(ApiResponse::success(result)))
}
