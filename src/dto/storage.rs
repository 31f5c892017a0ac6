use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{field, vault};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacedVaultResult {
    pub vault: vault::Model,
    pub field: field::Model,
}

/// A vault pulled off the floor, with the field it used to sit in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StagedVaultResult {
    #[serde(flatten)]
    pub vault: vault::Model,
    pub old_field_id: Option<i32>,
}

/// A vault placed into a field, from staging or from another field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovedVaultResult {
    pub vault: vault::Model,
    pub field: field::Model,
    pub old_field_id: Option<i32>,
}

/// A vault with where it currently sits; field and warehouse are empty while staged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultListing {
    #[serde(flatten)]
    pub vault: vault::Model,
    pub field_name: Option<String>,
    pub warehouse_id: Option<i32>,
    pub warehouse_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedVaultResult {
    pub vault_id: i32,
    pub field_id: Option<i32>,
}
