use sea_orm_migration::prelude::*;

use super::m20250301_000003_create_racks_table::Racks;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shelves::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Shelves::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Shelves::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Shelves::Capacity)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(ColumnDef::new(Shelves::RackId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shelves_rack_id")
                            .from(Shelves::Table, Shelves::RackId)
                            .to(Racks::Table, Racks::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shelves_rack_name")
                    .table(Shelves::Table)
                    .col(Shelves::RackId)
                    .col(Shelves::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shelves::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Shelves {
    Table,
    Id,
    Name,
    Capacity,
    RackId,
}
