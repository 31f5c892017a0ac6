use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_warehouses_table::Warehouses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Fields::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Fields::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Fields::Name).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Fields::Type)
                            .string_len(16)
                            .not_null()
                            .default("vault"),
                    )
                    .col(
                        ColumnDef::new(Fields::Capacity)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(
                        ColumnDef::new(Fields::Full)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Fields::WarehouseId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fields_warehouse_id")
                            .from(Fields::Table, Fields::WarehouseId)
                            .to(Warehouses::Table, Warehouses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Names are rewritten in bulk during left-edge resizes, so only a
        // plain lookup index is kept here.
        manager
            .create_index(
                Index::create()
                    .name("idx_fields_warehouse_name")
                    .table(Fields::Table)
                    .col(Fields::WarehouseId)
                    .col(Fields::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Fields::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Fields {
    Table,
    Id,
    Name,
    Type,
    Capacity,
    Full,
    WarehouseId,
}
