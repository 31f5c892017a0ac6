use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    commands::fields::ToggleFieldTypeCommand,
    dto::{FieldTypeToggleResult, FieldView},
    entities::field,
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SetFieldFullRequest {
    /// Omit to flip the current value.
    pub full: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/v1/fields/{id}",
    params(("id" = i32, Path, description = "Field ID")),
    responses(
        (status = 200, description = "Field with its vaults", body = ApiResponse<FieldView>),
        (status = 404, description = "Field not found", body = crate::errors::ErrorResponse)
    ),
    tag = "fields"
)]
pub async fn get_field(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<FieldView> {
    let field = state.services.layout.get_field(id).await?;
    Ok(Json(ApiResponse::success(field)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/fields/{id}/type",
    params(("id" = i32, Path, description = "Top field ID")),
    request_body = ToggleFieldTypeCommand,
    responses(
        (status = 200, description = "Pair retyped", body = ApiResponse<FieldTypeToggleResult>),
        (status = 400, description = "Occupied pair or invalid type change", body = crate::errors::ErrorResponse),
        (status = 404, description = "Field or bottom field not found", body = crate::errors::ErrorResponse)
    ),
    tag = "fields"
)]
pub async fn set_field_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<ToggleFieldTypeCommand>,
) -> ApiResult<FieldTypeToggleResult> {
    payload.field_id = id;
    let result = state.services.layout.set_field_type(payload).await?;
    Ok(Json(ApiResponse::success(result)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/fields/{id}/full",
    params(("id" = i32, Path, description = "Field ID")),
    request_body = SetFieldFullRequest,
    responses(
        (status = 200, description = "Full flag updated", body = ApiResponse<field::Model>),
        (status = 404, description = "Field not found", body = crate::errors::ErrorResponse)
    ),
    tag = "fields"
)]
pub async fn set_field_full(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<SetFieldFullRequest>,
) -> ApiResult<field::Model> {
    let field = state.services.layout.set_field_full(id, payload.full).await?;
    Ok(Json(ApiResponse::success(field)))
}

#[utoipa::path(
    post,
    path = "/api/v1/fields/{id}/full/toggle",
    params(("id" = i32, Path, description = "Field ID")),
    responses(
        (status = 200, description = "Full flag flipped", body = ApiResponse<field::Model>),
        (status = 404, description = "Field not found", body = crate::errors::ErrorResponse)
    ),
    tag = "fields"
)]
pub async fn toggle_field_full(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<field::Model> {
    let field = state.services.layout.set_field_full(id, None).await?;
    Ok(Json(ApiResponse::success(field)))
}
