use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::layout::Point;

/// Top-left corner of an object on the warehouse floor.
///
/// Stored as a JSON column on racks and used by request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct Position {
    #[schema(example = 12.5)]
    pub x: f64,
    #[schema(example = 4.0)]
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Position> for Point {
    fn from(position: Position) -> Self {
        Point::new(position.x, position.y)
    }
}
