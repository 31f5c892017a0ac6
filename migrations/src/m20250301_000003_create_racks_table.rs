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
                    .table(Racks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Racks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Racks::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Racks::Capacity).integer().not_null())
                    .col(ColumnDef::new(Racks::WarehouseId).integer().not_null())
                    .col(ColumnDef::new(Racks::Position).json().not_null())
                    .col(ColumnDef::new(Racks::Width).double().not_null())
                    .col(ColumnDef::new(Racks::Length).double().not_null())
                    .col(
                        ColumnDef::new(Racks::Orientation)
                            .string_len(16)
                            .not_null()
                            .default("vertical"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_racks_warehouse_id")
                            .from(Racks::Table, Racks::WarehouseId)
                            .to(Warehouses::Table, Warehouses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_racks_warehouse_name")
                    .table(Racks::Table)
                    .col(Racks::WarehouseId)
                    .col(Racks::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Racks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Racks {
    Table,
    Id,
    Name,
    Capacity,
    WarehouseId,
    Position,
    Width,
    Length,
    Orientation,
}
