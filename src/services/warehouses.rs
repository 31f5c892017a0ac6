use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;

use crate::{
    commands::{
        find_warehouse,
        warehouses::{
            CreateWarehouseCommand, DeleteWarehouseCommand, SetFieldGridPositionCommand,
            UpdateFieldCapacityCommand,
        },
        Command,
    },
    db::DbPool,
    dto::{FieldView, WarehouseLayout, WarehouseSummary},
    entities::{field, vault, warehouse},
    errors::ServiceError,
    events::EventSender,
    services::layout::rack_views,
};

/// Warehouse lifecycle and whole-floor reads.
#[derive(Clone)]
pub struct WarehouseService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    default_field_capacity: i32,
}

impl WarehouseService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        default_field_capacity: i32,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            default_field_capacity,
        }
    }

    /// Creates a warehouse, filling in the configured field capacity when the
    /// request leaves it out.
    #[instrument(skip(self, command), fields(name = %command.name))]
    pub async fn create_warehouse(
        &self,
        mut command: CreateWarehouseCommand,
    ) -> Result<WarehouseSummary, ServiceError> {
        command
            .field_capacity
            .get_or_insert(self.default_field_capacity);
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_warehouses(&self) -> Result<Vec<WarehouseSummary>, ServiceError> {
        let rows = warehouse::Entity::find()
            .order_by_asc(warehouse::Column::Id)
            .find_with_related(field::Entity)
            .all(&*self.db_pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(warehouse, mut fields)| {
                fields.sort_by_key(|f| f.id);
                WarehouseSummary { warehouse, fields }
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_warehouse_layout(
        &self,
        warehouse_id: i32,
    ) -> Result<WarehouseLayout, ServiceError> {
        let db = &*self.db_pool;
        let warehouse = find_warehouse(db, warehouse_id).await?;
        let fields = field_views(db, warehouse.id).await?;
        let racks = rack_views(db, warehouse.id).await?;

        Ok(WarehouseLayout {
            warehouse,
            fields,
            racks,
        })
    }

    #[instrument(skip(self))]
    pub async fn delete_warehouse(&self, warehouse_id: i32) -> Result<(), ServiceError> {
        DeleteWarehouseCommand { warehouse_id }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, command), fields(warehouse_id = command.warehouse_id))]
    pub async fn update_field_capacity(
        &self,
        command: UpdateFieldCapacityCommand,
    ) -> Result<warehouse::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, command), fields(warehouse_id = command.warehouse_id))]
    pub async fn set_field_grid_position(
        &self,
        command: SetFieldGridPositionCommand,
    ) -> Result<warehouse::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }
}

/// Fields of a warehouse with the vaults they hold, ordered by id.
pub(crate) async fn field_views<C: ConnectionTrait>(
    conn: &C,
    warehouse_id: i32,
) -> Result<Vec<FieldView>, ServiceError> {
    let rows = field::Entity::find()
        .filter(field::Column::WarehouseId.eq(warehouse_id))
        .order_by_asc(field::Column::Id)
        .find_with_related(vault::Entity)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(field, mut vaults)| {
            vaults.sort_by_key(|v| v.id);
            FieldView::new(field, vaults)
        })
        .collect())
}
