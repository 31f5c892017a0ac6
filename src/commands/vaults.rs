use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    commands::{claim_version, find_field, find_warehouse, observe, vault_count, Command},
    db::DbPool,
    dto::{DeletedVaultResult, MovedVaultResult, PlacedVaultResult, StagedVaultResult},
    entities::{field, vault},
    errors::ServiceError,
    events::{Event, EventSender},
    layout::FieldKind,
};

async fn find_vault<C: ConnectionTrait>(conn: &C, vault_id: i32) -> Result<vault::Model, ServiceError> {
    vault::Entity::find_by_id(vault_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Vault not found"))
}

/// Checks that `field` can take one more vault and returns how many it holds.
async fn room_in(txn: &DatabaseTransaction, field: &field::Model) -> Result<u32, ServiceError> {
    if !FieldKind::from(field.field_type).accepts_vaults() {
        return Err(ServiceError::InvalidOperation(
            "Cannot place vault in the lower half of a couchbox".to_string(),
        ));
    }

    let held = vault_count(txn, field.id).await?;
    if i64::from(held) >= i64::from(field.capacity) {
        return Err(ServiceError::InvalidOperation("Field is full".to_string()));
    }
    Ok(held)
}

/// Marks `field` full once `held` vaults reach its capacity.
async fn occupy(
    txn: &DatabaseTransaction,
    field: field::Model,
    held: u32,
) -> Result<field::Model, ServiceError> {
    if i64::from(held) < i64::from(field.capacity) || field.full {
        return Ok(field);
    }
    let mut active: field::ActiveModel = field.into();
    active.full = Set(true);
    Ok(active.update(txn).await?)
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| v.trim().is_empty())
}

/// Clears the `full` flag of the field a vault is leaving.
async fn release_field(
    txn: &DatabaseTransaction,
    field_id: i32,
) -> Result<Option<field::Model>, ServiceError> {
    let Some(field) = field::Entity::find_by_id(field_id).one(txn).await? else {
        return Ok(None);
    };
    let warehouse = find_warehouse(txn, field.warehouse_id).await?;

    let mut active: field::ActiveModel = field.into();
    active.full = Set(false);
    let field = active.update(txn).await?;

    claim_version(txn, &warehouse, |q| q).await?;
    Ok(Some(field))
}

/// Stores a vault in a field.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddVaultCommand {
    pub field_id: i32,
    #[validate(length(min = 1, max = 100, message = "Vault name is required"))]
    #[schema(example = "V-2041")]
    pub name: String,
    pub position: Option<String>,
    pub vault_type: Option<String>,
    pub customer_name: Option<String>,
    pub order_number: Option<String>,
    pub note: Option<String>,
}

#[async_trait]
impl Command for AddVaultCommand {
    type Result = PlacedVaultResult;

    #[instrument(skip(self, db_pool, event_sender), fields(field_id = self.field_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let placed = observe("add_vault", self.add(&db_pool).await)?;

        info!(
            vault_id = placed.vault.id,
            field = %placed.field.name,
            full = placed.field.full,
            "Vault placed"
        );
        event_sender
            .publish(Event::VaultPlaced {
                field_id: placed.field.id,
                vault_id: placed.vault.id,
            })
            .await;
        Ok(placed)
    }
}

impl AddVaultCommand {
    async fn add(&self, db: &DbPool) -> Result<PlacedVaultResult, ServiceError> {
        self.validate()?;

        let txn = db.begin().await?;
        let field = find_field(&txn, self.field_id).await?;
        let held = room_in(&txn, &field).await?;
        let warehouse = find_warehouse(&txn, field.warehouse_id).await?;

        let vault = vault::ActiveModel {
            name: Set(self.name.trim().to_string()),
            field_id: Set(Some(field.id)),
            position: Set(self.position.clone()),
            vault_type: Set(self.vault_type.clone()),
            customer_name: Set(self.customer_name.clone()),
            order_number: Set(self.order_number.clone()),
            note: Set(self.note.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let field = occupy(&txn, field, held + 1).await?;

        claim_version(&txn, &warehouse, |q| q).await?;
        txn.commit().await?;
        Ok(PlacedVaultResult { vault, field })
    }
}

/// Pulls a vault out of its field into staging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageVaultCommand {
    pub vault_id: i32,
}

#[async_trait]
impl Command for StageVaultCommand {
    type Result = StagedVaultResult;

    #[instrument(skip(self, db_pool, event_sender), fields(vault_id = self.vault_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let staged = observe("stage_vault", self.stage(&db_pool).await)?;

        event_sender
            .publish(Event::VaultStaged {
                vault_id: staged.vault.id,
                old_field_id: staged.old_field_id,
            })
            .await;
        Ok(staged)
    }
}

impl StageVaultCommand {
    async fn stage(&self, db: &DbPool) -> Result<StagedVaultResult, ServiceError> {
        let txn = db.begin().await?;
        let vault = find_vault(&txn, self.vault_id).await?;
        let old_field_id = vault.field_id;

        if let Some(field_id) = old_field_id {
            release_field(&txn, field_id).await?;
        }

        let mut active: vault::ActiveModel = vault.into();
        active.field_id = Set(None);
        active.position = Set(None);
        let vault = active.update(&txn).await?;

        txn.commit().await?;
        Ok(StagedVaultResult {
            vault,
            old_field_id,
        })
    }
}

/// Puts a vault into a field, either back from staging or out of another field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveVaultCommand {
    #[serde(skip)]
    pub vault_id: i32,
    pub field_id: i32,
    #[schema(example = "T")]
    pub position: Option<String>,
}

#[async_trait]
impl Command for MoveVaultCommand {
    type Result = MovedVaultResult;

    #[instrument(skip(self, db_pool, event_sender), fields(vault_id = self.vault_id, field_id = self.field_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let moved = observe("move_vault", self.relocate(&db_pool).await)?;

        info!(
            vault_id = moved.vault.id,
            from = ?moved.old_field_id,
            to = moved.field.id,
            "Vault moved"
        );
        event_sender
            .publish(Event::VaultMoved {
                vault_id: moved.vault.id,
                from_field_id: moved.old_field_id,
                to_field_id: moved.field.id,
            })
            .await;
        Ok(moved)
    }
}

impl MoveVaultCommand {
    async fn relocate(&self, db: &DbPool) -> Result<MovedVaultResult, ServiceError> {
        let txn = db.begin().await?;
        let vault = find_vault(&txn, self.vault_id).await?;
        let old_field_id = vault.field_id;
        let target = find_field(&txn, self.field_id).await?;

        let field = if old_field_id == Some(target.id) {
            // same field, only the position changes
            target
        } else {
            let held = room_in(&txn, &target).await?;
            let released = match old_field_id {
                Some(field_id) => release_field(&txn, field_id).await?,
                None => None,
            };
            let field = occupy(&txn, target, held + 1).await?;

            if released.map(|f| f.warehouse_id) != Some(field.warehouse_id) {
                let warehouse = find_warehouse(&txn, field.warehouse_id).await?;
                claim_version(&txn, &warehouse, |q| q).await?;
            }
            field
        };

        let mut active: vault::ActiveModel = vault.into();
        active.field_id = Set(Some(field.id));
        active.position = Set(self.position.clone());
        let vault = active.update(&txn).await?;

        txn.commit().await?;
        Ok(MovedVaultResult {
            vault,
            field,
            old_field_id,
        })
    }
}

/// Edits the descriptive details of a vault without moving it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVaultCommand {
    #[serde(skip)]
    pub vault_id: i32,
    #[validate(length(max = 100))]
    pub name: Option<String>,
    pub position: Option<String>,
    pub vault_type: Option<String>,
    pub customer_name: Option<String>,
    pub order_number: Option<String>,
    pub note: Option<String>,
}

#[async_trait]
impl Command for UpdateVaultCommand {
    type Result = vault::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(vault_id = self.vault_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let updated = observe("update_vault", self.update(&db_pool).await)?;

        event_sender.publish(Event::VaultUpdated(updated.id)).await;
        Ok(updated)
    }
}

impl UpdateVaultCommand {
    async fn update(&self, db: &DbPool) -> Result<vault::Model, ServiceError> {
        self.validate()?;
        if blank(&self.name) {
            return Err(ServiceError::validation("Vault name is required"));
        }

        let txn = db.begin().await?;
        let existing = find_vault(&txn, self.vault_id).await?;

        let mut active: vault::ActiveModel = existing.into();
        if let Some(name) = &self.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(position) = &self.position {
            active.position = Set(Some(position.clone()));
        }
        if let Some(vault_type) = &self.vault_type {
            active.vault_type = Set(Some(vault_type.clone()));
        }
        if let Some(customer_name) = &self.customer_name {
            active.customer_name = Set(Some(customer_name.trim().to_string()));
        }
        if let Some(order_number) = &self.order_number {
            active.order_number = Set(Some(order_number.trim().to_string()));
        }
        if let Some(note) = &self.note {
            active.note = Set(Some(note.clone()));
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteVaultCommand {
    pub vault_id: i32,
}

#[async_trait]
impl Command for DeleteVaultCommand {
    type Result = DeletedVaultResult;

    #[instrument(skip(self, db_pool, event_sender), fields(vault_id = self.vault_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let deleted = observe("delete_vault", self.delete(&db_pool).await)?;

        event_sender
            .publish(Event::VaultRemoved(deleted.vault_id))
            .await;
        Ok(deleted)
    }
}

impl DeleteVaultCommand {
    async fn delete(&self, db: &DbPool) -> Result<DeletedVaultResult, ServiceError> {
        let txn = db.begin().await?;
        let vault = find_vault(&txn, self.vault_id).await?;

        if let Some(field_id) = vault.field_id {
            release_field(&txn, field_id).await?;
        }
        vault::Entity::delete_by_id(vault.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(DeletedVaultResult {
            vault_id: vault.id,
            field_id: vault.field_id,
        })
    }
}
