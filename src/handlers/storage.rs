use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::{
    commands::{
        pallets::{AddPalletCommand, UpdatePalletCommand},
        vaults::{AddVaultCommand, MoveVaultCommand, UpdateVaultCommand},
    },
    dto::{
        DeletedVaultResult, MovedVaultResult, PlacedVaultResult, ShelfView, StagedVaultResult,
        VaultListing,
    },
    entities::{pallet, vault},
    errors::ServiceError,
    ApiResponse, ApiResult, AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/shelves/{id}/pallets",
    params(("id" = i32, Path, description = "Shelf ID")),
    responses(
        (status = 200, description = "Pallets on the shelf", body = ApiResponse<Vec<pallet::Model>>),
        (status = 404, description = "Shelf not found", body = crate::errors::ErrorResponse)
    ),
    tag = "storage"
)]
pub async fn list_pallets(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<pallet::Model>> {
    let pallets = state.services.storage.list_pallets(id).await?;
    Ok(Json(ApiResponse::success(pallets)))
}

#[utoipa::path(
    post,
    path = "/api/v1/shelves/{id}/pallets",
    params(("id" = i32, Path, description = "Shelf ID")),
    request_body = AddPalletCommand,
    responses(
        (status = 201, description = "Pallet added; returns the updated shelf", body = ApiResponse<ShelfView>),
        (status = 400, description = "Missing fields or shelf capacity exceeded", body = crate::errors::ErrorResponse),
        (status = 404, description = "Shelf not found", body = crate::errors::ErrorResponse)
    ),
    tag = "storage"
)]
pub async fn add_pallet(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<AddPalletCommand>,
) -> Result<(StatusCode, Json<ApiResponse<ShelfView>>), ServiceError> {
    payload.shelf_id = id;
    let shelf = state.services.storage.add_pallet(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(shelf))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/pallets/{id}",
    params(("id" = i32, Path, description = "Pallet ID")),
    request_body = UpdatePalletCommand,
    responses(
        (status = 200, description = "Pallet updated", body = ApiResponse<pallet::Model>),
        (status = 400, description = "Invalid values or shelf capacity exceeded", body = crate::errors::ErrorResponse),
        (status = 404, description = "Pallet not found", body = crate::errors::ErrorResponse)
    ),
    tag = "storage"
)]
pub async fn update_pallet(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<UpdatePalletCommand>,
) -> ApiResult<pallet::Model> {
    payload.pallet_id = id;
    let pallet = state.services.storage.update_pallet(payload).await?;
    Ok(Json(ApiResponse::success(pallet)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/pallets/{id}",
    params(("id" = i32, Path, description = "Pallet ID")),
    responses(
        (status = 200, description = "Pallet deleted"),
        (status = 404, description = "Pallet not found", body = crate::errors::ErrorResponse)
    ),
    tag = "storage"
)]
pub async fn delete_pallet(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Value> {
    state.services.storage.delete_pallet(id).await?;
    Ok(Json(ApiResponse::success(json!({ "palletId": id }))))
}

#[utoipa::path(
    post,
    path = "/api/v1/vaults",
    request_body = AddVaultCommand,
    responses(
        (status = 201, description = "Vault placed in a field", body = ApiResponse<PlacedVaultResult>),
        (status = 400, description = "Field full or lower couchbox half", body = crate::errors::ErrorResponse),
        (status = 404, description = "Field not found", body = crate::errors::ErrorResponse)
    ),
    tag = "storage"
)]
pub async fn add_vault(
    State(state): State<AppState>,
    Json(payload): Json<AddVaultCommand>,
) -> Result<(StatusCode, Json<ApiResponse<PlacedVaultResult>>), ServiceError> {
    let placed = state.services.storage.add_vault(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(placed))))
}

#[utoipa::path(
    post,
    path = "/api/v1/vaults/{id}/stage",
    params(("id" = i32, Path, description = "Vault ID")),
    responses(
        (status = 200, description = "Vault moved to staging", body = ApiResponse<StagedVaultResult>),
        (status = 404, description = "Vault not found", body = crate::errors::ErrorResponse)
    ),
    tag = "storage"
)]
pub async fn stage_vault(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<StagedVaultResult> {
    let staged = state.services.storage.stage_vault(id).await?;
    Ok(Json(ApiResponse::success(staged)))
}

#[utoipa::path(
    get,
    path = "/api/v1/vaults/staged",
    responses(
        (status = 200, description = "Vaults not in any field", body = ApiResponse<Vec<vault::Model>>)
    ),
    tag = "storage"
)]
pub async fn list_staged_vaults(State(state): State<AppState>) -> ApiResult<Vec<vault::Model>> {
    let vaults = state.services.storage.list_staged_vaults().await?;
    Ok(Json(ApiResponse::success(vaults)))
}

#[utoipa::path(
    get,
    path = "/api/v1/vaults",
    responses(
        (status = 200, description = "Every vault with its field and warehouse", body = ApiResponse<Vec<VaultListing>>)
    ),
    tag = "storage"
)]
pub async fn list_vaults(State(state): State<AppState>) -> ApiResult<Vec<VaultListing>> {
    let vaults = state.services.storage.list_vaults().await?;
    Ok(Json(ApiResponse::success(vaults)))
}

#[utoipa::path(
    get,
    path = "/api/v1/vaults/{id}",
    params(("id" = i32, Path, description = "Vault ID")),
    responses(
        (status = 200, description = "Vault", body = ApiResponse<vault::Model>),
        (status = 404, description = "Vault not found", body = crate::errors::ErrorResponse)
    ),
    tag = "storage"
)]
pub async fn get_vault(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<vault::Model> {
    let vault = state.services.storage.get_vault(id).await?;
    Ok(Json(ApiResponse::success(vault)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/vaults/{id}",
    params(("id" = i32, Path, description = "Vault ID")),
    request_body = UpdateVaultCommand,
    responses(
        (status = 200, description = "Vault updated", body = ApiResponse<vault::Model>),
        (status = 400, description = "Blank vault name", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vault not found", body = crate::errors::ErrorResponse)
    ),
    tag = "storage"
)]
pub async fn update_vault(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<UpdateVaultCommand>,
) -> ApiResult<vault::Model> {
    payload.vault_id = id;
    let vault = state.services.storage.update_vault(payload).await?;
    Ok(Json(ApiResponse::success(vault)))
}

#[utoipa::path(
    post,
    path = "/api/v1/vaults/{id}/move",
    params(("id" = i32, Path, description = "Vault ID")),
    request_body = MoveVaultCommand,
    responses(
        (status = 200, description = "Vault placed in the target field", body = ApiResponse<MovedVaultResult>),
        (status = 400, description = "Field full or lower couchbox half", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vault or field not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Warehouse modified concurrently", body = crate::errors::ErrorResponse)
    ),
    tag = "storage"
)]
pub async fn move_vault(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<MoveVaultCommand>,
) -> ApiResult<MovedVaultResult> {
    payload.vault_id = id;
    let moved = state.services.storage.move_vault(payload).await?;
    Ok(Json(ApiResponse::success(moved)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/vaults/{id}",
    params(("id" = i32, Path, description = "Vault ID")),
    responses(
        (status = 200, description = "Vault deleted", body = ApiResponse<DeletedVaultResult>),
        (status = 404, description = "Vault not found", body = crate::errors::ErrorResponse)
    ),
    tag = "storage"
)]
pub async fn delete_vault(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<DeletedVaultResult> {
    let deleted = state.services.storage.delete_vault(id).await?;
    Ok(Json(ApiResponse::success(deleted)))
}
