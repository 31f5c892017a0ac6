//! Response bodies that combine several entities.

pub mod layout;
pub mod storage;

pub use layout::{
    FieldTypeToggleResult, FieldView, RackView, ResizeGridResult, ShelfView, WarehouseLayout,
    WarehouseSummary,
};
pub use storage::{
    DeletedVaultResult, MovedVaultResult, PlacedVaultResult, StagedVaultResult, VaultListing,
};
