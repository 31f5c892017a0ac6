use sea_orm_migration::prelude::*;

use super::m20250301_000002_create_fields_table::Fields;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vaults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vaults::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vaults::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Vaults::FieldId).integer().null())
                    .col(ColumnDef::new(Vaults::Position).string_len(50).null())
                    .col(ColumnDef::new(Vaults::VaultType).string_len(50).null())
                    .col(ColumnDef::new(Vaults::CustomerName).string_len(100).null())
                    .col(ColumnDef::new(Vaults::OrderNumber).string_len(50).null())
                    .col(ColumnDef::new(Vaults::Note).text().null())
                    .col(
                        ColumnDef::new(Vaults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vaults_field_id")
                            .from(Vaults::Table, Vaults::FieldId)
                            .to(Fields::Table, Fields::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vaults_field_id")
                    .table(Vaults::Table)
                    .col(Vaults::FieldId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vaults::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Vaults {
    Table,
    Id,
    Name,
    FieldId,
    Position,
    VaultType,
    CustomerName,
    OrderNumber,
    Note,
    CreatedAt,
}
