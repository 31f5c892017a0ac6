use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    commands::{
        check_expected_version, claim_version, find_field, find_warehouse, observe, vault_count,
        Command,
    },
    db::DbPool,
    dto::FieldTypeToggleResult,
    entities::field,
    errors::ServiceError,
    events::{Event, EventSender},
    layout::{parse_name, toggle_pair, GridCoord, PairCell},
};

fn pair_cell(field: &field::Model, items: u32) -> Result<PairCell, ServiceError> {
    let (col, row) = parse_name(&field.name)?;
    Ok(PairCell {
        coord: GridCoord { col, row },
        kind: field.field_type.into(),
        items,
    })
}

/// Turns a field and the one below it into a couchbox, or back into two vault fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFieldTypeCommand {
    #[serde(skip)]
    pub field_id: i32,
    /// Name of the partner field, e.g. "B4".
    #[serde(rename = "field2")]
    #[schema(example = "B4")]
    pub field2_name: String,
    pub warehouse_id: i32,
    pub expected_version: Option<i32>,
}

#[async_trait]
impl Command for ToggleFieldTypeCommand {
    type Result = FieldTypeToggleResult;

    #[instrument(skip(self, db_pool, event_sender), fields(field_id = self.field_id, warehouse_id = self.warehouse_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let result = observe("toggle_field_type", self.toggle(&db_pool).await)?;

        info!(
            top = %result.field1.name,
            bottom = %result.field2.name,
            "Field pair retyped"
        );
        event_sender
            .publish(Event::FieldTypeChanged {
                warehouse_id: result.field1.warehouse_id,
                top_field_id: result.field1.id,
                bottom_field_id: result.field2.id,
                field_type: crate::layout::FieldKind::from(result.field1.field_type).to_string(),
            })
            .await;
        Ok(result)
    }
}

impl ToggleFieldTypeCommand {
    async fn toggle(&self, db: &DbPool) -> Result<FieldTypeToggleResult, ServiceError> {
        let txn = db.begin().await?;

        let top = find_field(&txn, self.field_id).await?;
        if top.warehouse_id != self.warehouse_id {
            return Err(ServiceError::not_found("Field not found"));
        }
        let warehouse = find_warehouse(&txn, top.warehouse_id).await?;
        check_expected_version(&warehouse, self.expected_version)?;

        let bottom = field::Entity::find()
            .filter(field::Column::WarehouseId.eq(warehouse.id))
            .filter(field::Column::Name.eq(self.field2_name.trim()))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Bottom field not found"))?;

        let top_items = vault_count(&txn, top.id).await?;
        let bottom_items = vault_count(&txn, bottom.id).await?;
        let (top_kind, bottom_kind) =
            toggle_pair(pair_cell(&top, top_items)?, pair_cell(&bottom, bottom_items)?)?;

        let mut top: field::ActiveModel = top.into();
        top.field_type = Set(top_kind.into());
        let field1 = top.update(&txn).await?;

        let mut bottom: field::ActiveModel = bottom.into();
        bottom.field_type = Set(bottom_kind.into());
        let field2 = bottom.update(&txn).await?;

        claim_version(&txn, &warehouse, |q| q).await?;
        txn.commit().await?;

        Ok(FieldTypeToggleResult { field1, field2 })
    }
}

/// Sets or flips the `full` flag of a field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetFieldFullCommand {
    #[serde(skip)]
    pub field_id: i32,
    /// New value; omitted means flip the current one.
    pub full: Option<bool>,
}

#[async_trait]
impl Command for SetFieldFullCommand {
    type Result = field::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(field_id = self.field_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let updated = observe("set_field_full", self.apply(&db_pool).await)?;

        event_sender
            .publish(Event::FieldFullnessChanged {
                field_id: updated.id,
                full: updated.full,
            })
            .await;
        Ok(updated)
    }
}

impl SetFieldFullCommand {
    async fn apply(&self, db: &DbPool) -> Result<field::Model, ServiceError> {
        let txn = db.begin().await?;
        let field = find_field(&txn, self.field_id).await?;

        let full = self.full.unwrap_or(!field.full);
        let mut active: field::ActiveModel = field.into();
        active.full = Set(full);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }
}
