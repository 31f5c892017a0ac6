use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::layout::{FieldGridArea, Point, WarehouseArea};

/// A warehouse floor with one field grid.
///
/// `version` is bumped by every layout mutation and guards against lost
/// updates between concurrent requests.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "warehouses")]
#[serde(rename_all = "camelCase")]
#[schema(as = Warehouse)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(nullable)]
    pub address: Option<String>,
    #[sea_orm(nullable)]
    pub company_id: Option<i32>,
    pub width: f64,
    pub length: f64,
    pub rows: i32,
    pub cols: i32,
    pub field_capacity: i32,
    pub field_grid_x: f64,
    pub field_grid_y: f64,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::field::Entity")]
    Fields,
    #[sea_orm(has_many = "super::rack::Entity")]
    Racks,
}

impl Related<super::field::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fields.def()
    }
}

impl Related<super::rack::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Racks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn floor(&self) -> WarehouseArea {
        WarehouseArea {
            width: self.width,
            length: self.length,
        }
    }

    pub fn field_grid_area(&self) -> FieldGridArea {
        FieldGridArea {
            origin: Point::new(self.field_grid_x, self.field_grid_y),
            cols: self.cols.max(0) as u32,
            rows: self.rows.max(0) as u32,
        }
    }
}
