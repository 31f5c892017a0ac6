use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A rack level holding pallets; `capacity` counts shelf spots.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "shelves")]
#[serde(rename_all = "camelCase")]
#[schema(as = Shelf)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub capacity: i32,
    pub rack_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rack::Entity",
        from = "Column::RackId",
        to = "super::rack::Column::Id",
        on_delete = "Cascade"
    )]
    Rack,
    #[sea_orm(has_many = "super::pallet::Entity")]
    Pallets,
}

impl Related<super::rack::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rack.def()
    }
}

impl Related<super::pallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
