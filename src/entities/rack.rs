use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::position::Position;
use crate::layout::{Footprint, Orientation};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "racks")]
#[serde(rename_all = "camelCase")]
#[schema(as = Rack)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub capacity: i32,
    pub warehouse_id: i32,
    #[sea_orm(column_type = "Json")]
    pub position: Position,
    pub width: f64,
    pub length: f64,
    pub orientation: RackOrientation,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id",
        on_delete = "Cascade"
    )]
    Warehouse,
    #[sea_orm(has_many = "super::shelf::Entity")]
    Shelves,
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl Related<super::shelf::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shelves.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Floor area the rack occupies at `position`, orientation applied.
    pub fn footprint_at(&self, position: Position) -> Footprint {
        Footprint::oriented(
            position.into(),
            self.width,
            self.length,
            self.orientation.into(),
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum RackOrientation {
    #[default]
    #[sea_orm(string_value = "vertical")]
    Vertical,
    #[sea_orm(string_value = "horizontal")]
    Horizontal,
}

impl From<RackOrientation> for Orientation {
    fn from(value: RackOrientation) -> Self {
        match value {
            RackOrientation::Vertical => Orientation::Vertical,
            RackOrientation::Horizontal => Orientation::Horizontal,
        }
    }
}
