//! Warehouse layout engine.
//!
//! Pure grid and placement logic with no persistence or I/O. Commands load
//! rows from the database, run these functions, and persist whatever they
//! return.

pub mod field_kind;
pub mod grid;
pub mod namer;
pub mod placement;

pub use field_kind::{toggle_pair, FieldKind, PairCell};
pub use grid::{Edge, FieldCell, FieldGrid, GridChange, GridCoord, RenamedCell};
pub use namer::{name_of, parse_name, shift_column_letter, MAX_COLUMNS};
pub use placement::{
    check_placement, FieldGridArea, Footprint, Orientation, PlacementCheck, Point, WarehouseArea,
};

/// Errors raised by the layout engine.
///
/// Display strings for the variants that reach API clients are part of the
/// public contract and must not change.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("Column {0} is outside A-Z")]
    ColumnOutOfRange(i64),

    #[error("Row {0} must be at least 1")]
    RowOutOfRange(u32),

    #[error("Malformed field name '{0}'")]
    MalformedName(String),

    #[error("direction not specified")]
    UnknownEdge(String),

    #[error("Count must be at least 1")]
    InvalidCount,

    #[error("Cannot remove {requested} {axis} from a grid with {available}")]
    ShrinkTooLarge {
        axis: &'static str,
        requested: u32,
        available: u32,
    },

    #[error("Cannot delete fields while vaults are present in fields.")]
    OccupiedFields(Vec<String>),

    #[error("Please stage all vaults in fields to continue")]
    PairOccupied,

    #[error("Invalid type change")]
    InvalidTypeChange,
}
