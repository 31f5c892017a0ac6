use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::layout::FieldKind;

/// One cell of a warehouse's field grid, named like "B3".
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "fields")]
#[serde(rename_all = "camelCase")]
#[schema(as = Field)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub capacity: i32,
    pub full: bool,
    pub warehouse_id: i32,
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
    #[sea_orm(has_many = "super::vault::Entity")]
    Vaults,
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl Related<super::vault::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vaults.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum FieldType {
    #[sea_orm(string_value = "vault")]
    #[serde(rename = "vault")]
    Vault,
    #[sea_orm(string_value = "couchbox-T")]
    #[serde(rename = "couchbox-T")]
    CouchboxTop,
    #[sea_orm(string_value = "couchbox-B")]
    #[serde(rename = "couchbox-B")]
    CouchboxBottom,
}

impl From<FieldType> for FieldKind {
    fn from(value: FieldType) -> Self {
        match value {
            FieldType::Vault => FieldKind::Vault,
            FieldType::CouchboxTop => FieldKind::CouchboxTop,
            FieldType::CouchboxBottom => FieldKind::CouchboxBottom,
        }
    }
}

impl From<FieldKind> for FieldType {
    fn from(value: FieldKind) -> Self {
        match value {
            FieldKind::Vault => FieldType::Vault,
            FieldKind::CouchboxTop => FieldType::CouchboxTop,
            FieldKind::CouchboxBottom => FieldType::CouchboxBottom,
        }
    }
}
