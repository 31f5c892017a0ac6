use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::{collections::HashMap, sync::Arc};
use tracing::instrument;

use crate::{
    commands::{
        pallets::{AddPalletCommand, DeletePalletCommand, UpdatePalletCommand},
        vaults::{
            AddVaultCommand, DeleteVaultCommand, MoveVaultCommand, StageVaultCommand,
            UpdateVaultCommand,
        },
        Command,
    },
    db::DbPool,
    dto::{
        DeletedVaultResult, MovedVaultResult, PlacedVaultResult, ShelfView, StagedVaultResult,
        VaultListing,
    },
    entities::{field, pallet, shelf, vault, warehouse},
    errors::ServiceError,
    events::EventSender,
};

/// Pallets on shelves and vaults in fields or staging.
#[derive(Clone)]
pub struct StorageService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl StorageService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, command), fields(shelf_id = command.shelf_id))]
    pub async fn add_pallet(&self, command: AddPalletCommand) -> Result<ShelfView, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_pallets(&self, shelf_id: i32) -> Result<Vec<pallet::Model>, ServiceError> {
        let db = &*self.db_pool;
        shelf::Entity::find_by_id(shelf_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Shelf not found"))?;

        Ok(pallet::Entity::find()
            .filter(pallet::Column::ShelfId.eq(shelf_id))
            .order_by_asc(pallet::Column::Id)
            .all(db)
            .await?)
    }

    #[instrument(skip(self, command), fields(pallet_id = command.pallet_id))]
    pub async fn update_pallet(
        &self,
        command: UpdatePalletCommand,
    ) -> Result<pallet::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_pallet(&self, pallet_id: i32) -> Result<(), ServiceError> {
        DeletePalletCommand { pallet_id }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, command), fields(field_id = command.field_id))]
    pub async fn add_vault(
        &self,
        command: AddVaultCommand,
    ) -> Result<PlacedVaultResult, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn stage_vault(&self, vault_id: i32) -> Result<StagedVaultResult, ServiceError> {
        StageVaultCommand { vault_id }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_staged_vaults(&self) -> Result<Vec<vault::Model>, ServiceError> {
        Ok(vault::Entity::find()
            .filter(vault::Column::FieldId.is_null())
            .order_by_asc(vault::Column::Id)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, command), fields(vault_id = command.vault_id, field_id = command.field_id))]
    pub async fn move_vault(
        &self,
        command: MoveVaultCommand,
    ) -> Result<MovedVaultResult, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, command), fields(vault_id = command.vault_id))]
    pub async fn update_vault(
        &self,
        command: UpdateVaultCommand,
    ) -> Result<vault::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_vault(&self, vault_id: i32) -> Result<vault::Model, ServiceError> {
        vault::Entity::find_by_id(vault_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vault not found"))
    }

    /// Every vault, placed or staged, with its field and warehouse names.
    #[instrument(skip(self))]
    pub async fn list_vaults(&self) -> Result<Vec<VaultListing>, ServiceError> {
        let db = &*self.db_pool;
        let vaults = vault::Entity::find()
            .find_also_related(field::Entity)
            .order_by_asc(vault::Column::Id)
            .all(db)
            .await?;
        let warehouses: HashMap<i32, String> = warehouse::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|w| (w.id, w.name))
            .collect();

        Ok(vaults
            .into_iter()
            .map(|(vault, field)| {
                let warehouse_id = field.as_ref().map(|f| f.warehouse_id);
                VaultListing {
                    vault,
                    field_name: field.map(|f| f.name),
                    warehouse_name: warehouse_id.and_then(|id| warehouses.get(&id).cloned()),
                    warehouse_id,
                }
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn delete_vault(&self, vault_id: i32) -> Result<DeletedVaultResult, ServiceError> {
        DeleteVaultCommand { vault_id }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }
}
