use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{field, pallet, rack, shelf, vault, warehouse};

/// A warehouse with its grid cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseSummary {
    #[serde(flatten)]
    pub warehouse: warehouse::Model,
    pub fields: Vec<field::Model>,
}

/// Everything needed to draw one warehouse floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseLayout {
    #[serde(flatten)]
    pub warehouse: warehouse::Model,
    pub fields: Vec<FieldView>,
    pub racks: Vec<RackView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    #[serde(flatten)]
    pub field: field::Model,
    pub vault_count: u32,
    pub vaults: Vec<vault::Model>,
}

impl FieldView {
    pub fn new(field: field::Model, vaults: Vec<vault::Model>) -> Self {
        Self {
            field,
            vault_count: u32::try_from(vaults.len()).unwrap_or(u32::MAX),
            vaults,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RackView {
    #[serde(flatten)]
    pub rack: rack::Model,
    pub shelves: Vec<ShelfView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShelfView {
    #[serde(flatten)]
    pub shelf: shelf::Model,
    /// Shelf spots taken by the pallets below.
    pub occupied_spots: i32,
    pub pallets: Vec<pallet::Model>,
}

impl ShelfView {
    pub fn new(shelf: shelf::Model, pallets: Vec<pallet::Model>) -> Self {
        Self {
            occupied_spots: pallets.iter().map(|p| p.shelf_spots).sum(),
            shelf,
            pallets,
        }
    }
}

/// Outcome of growing or shrinking a field grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResizeGridResult {
    /// Every field of the warehouse after the resize.
    pub fields: Vec<field::Model>,
    pub warehouse_id: i32,
    pub new_warehouse_rows_count: i32,
    pub new_warehouse_cols_count: i32,
    pub version: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldTypeToggleResult {
    pub field1: field::Model,
    pub field2: field::Model,
}
