use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "pallets")]
#[serde(rename_all = "camelCase")]
#[schema(as = Pallet)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub weight: f64,
    pub customer_name: String,
    #[sea_orm(nullable)]
    pub customer_id: Option<i32>,
    pub pallet_number: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// Number of shelf spots the pallet takes up.
    pub shelf_spots: i32,
    pub shelf_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shelf::Entity",
        from = "Column::ShelfId",
        to = "super::shelf::Column::Id",
        on_delete = "Cascade"
    )]
    Shelf,
}

impl Related<super::shelf::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shelf.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
