use sea_orm_migration::prelude::*;

use super::m20250301_000004_create_shelves_table::Shelves;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pallets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pallets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pallets::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Pallets::Weight)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Pallets::CustomerName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Pallets::CustomerId).integer().null())
                    .col(
                        ColumnDef::new(Pallets::PalletNumber)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Pallets::Notes).text().null())
                    .col(
                        ColumnDef::new(Pallets::ShelfSpots)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Pallets::ShelfId).integer().not_null())
                    .col(
                        ColumnDef::new(Pallets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pallets_shelf_id")
                            .from(Pallets::Table, Pallets::ShelfId)
                            .to(Shelves::Table, Shelves::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pallets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Pallets {
    Table,
    Id,
    Name,
    Weight,
    CustomerName,
    CustomerId,
    PalletNumber,
    Notes,
    ShelfSpots,
    ShelfId,
    CreatedAt,
}
