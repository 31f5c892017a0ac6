use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    commands::{
        check_expected_version, claim_version, find_warehouse, insert_fields, observe, vault_counts,
        Command,
    },
    db::DbPool,
    dto::WarehouseSummary,
    entities::{
        field,
        pallet, rack, shelf, vault, warehouse, Position,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    layout::FieldGrid,
};

pub const DEFAULT_FIELD_CAPACITY: i32 = 3;

fn validate_grid_position(position: &Position) -> Result<(), ValidationError> {
    if position.x.is_finite() && position.y.is_finite() && position.x >= 0.0 && position.y >= 0.0
    {
        Ok(())
    } else {
        Err(ValidationError::new("Invalid field grid position"))
    }
}

fn invalid_grid_position() -> ServiceError {
    ServiceError::validation("Invalid field grid position")
}

/// Creates a warehouse together with its full field grid.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarehouseCommand {
    #[validate(length(min = 1, max = 100, message = "Warehouse name must be 1-100 characters"))]
    #[schema(example = "North Yard")]
    pub name: String,
    /// At most [`MAX_GRID_ROWS`](crate::commands::MAX_GRID_ROWS).
    #[validate(range(min = 1, max = 1000, message = "Rows must be between 1 and 1000"))]
    #[schema(example = 10)]
    pub rows: i32,
    #[validate(range(min = 1, max = 26, message = "Columns must be between 1 and 26"))]
    #[schema(example = 8)]
    pub cols: i32,
    /// Floor width; defaults to the grid's right edge.
    pub width: Option<f64>,
    /// Floor length; defaults to the grid's bottom edge.
    pub length: Option<f64>,
    #[validate(range(min = 1, message = "Field capacity must be at least 1"))]
    pub field_capacity: Option<i32>,
    pub field_grid_position: Option<Position>,
    pub address: Option<String>,
    pub company_id: Option<i32>,
}

#[async_trait]
impl Command for CreateWarehouseCommand {
    type Result = WarehouseSummary;

    #[instrument(skip(self, db_pool, event_sender), fields(name = %self.name))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let summary = observe("create_warehouse", self.create(&db_pool).await)?;

        info!(
            warehouse_id = summary.warehouse.id,
            fields = summary.fields.len(),
            "Warehouse created"
        );
        event_sender
            .publish(Event::WarehouseCreated {
                warehouse_id: summary.warehouse.id,
                fields: summary.fields.len(),
            })
            .await;

        Ok(summary)
    }
}

impl CreateWarehouseCommand {
    async fn create(&self, db: &DbPool) -> Result<WarehouseSummary, ServiceError> {
        self.validate()?;
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Warehouse name is required"));
        }

        let origin = self.field_grid_position.unwrap_or_default();
        if validate_grid_position(&origin).is_err() {
            return Err(invalid_grid_position());
        }
        let width = self.width.unwrap_or(origin.x + f64::from(self.cols));
        let length = self.length.unwrap_or(origin.y + f64::from(self.rows));
        if !(width.is_finite() && length.is_finite() && width > 0.0 && length > 0.0) {
            return Err(ServiceError::validation("Invalid dimensions provided"));
        }
        let capacity = self.field_capacity.unwrap_or(DEFAULT_FIELD_CAPACITY);

        // validated above, both casts are in range
        let grid = FieldGrid::generate(self.cols as u32, self.rows as u32)?;

        let txn = db.begin().await?;

        let taken = warehouse::Entity::find()
            .filter(warehouse::Column::Name.eq(name))
            .one(&txn)
            .await?;
        if taken.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Warehouse '{}' already exists",
                name
            )));
        }

        let now = Utc::now();
        let created = warehouse::ActiveModel {
            name: Set(name.to_string()),
            address: Set(self.address.clone()),
            company_id: Set(self.company_id),
            width: Set(width),
            length: Set(length),
            rows: Set(self.rows),
            cols: Set(self.cols),
            field_capacity: Set(capacity),
            field_grid_x: Set(origin.x),
            field_grid_y: Set(origin.y),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let rows = grid
            .cells()
            .map(|cell| field::ActiveModel {
                name: Set(cell.name.clone()),
                field_type: Set(cell.kind.into()),
                capacity: Set(capacity),
                full: Set(false),
                warehouse_id: Set(created.id),
                ..Default::default()
            })
            .collect();
        insert_fields(&txn, rows).await?;

        let fields = field::Entity::find()
            .filter(field::Column::WarehouseId.eq(created.id))
            .order_by_asc(field::Column::Id)
            .all(&txn)
            .await?;

        txn.commit().await?;

        Ok(WarehouseSummary {
            warehouse: created,
            fields,
        })
    }
}

/// Removes a warehouse with everything stored in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteWarehouseCommand {
    pub warehouse_id: i32,
}

#[async_trait]
impl Command for DeleteWarehouseCommand {
    type Result = ();

    #[instrument(skip(self, db_pool, event_sender), fields(warehouse_id = self.warehouse_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        observe("delete_warehouse", self.delete(&db_pool).await)?;

        info!(warehouse_id = self.warehouse_id, "Warehouse deleted");
        event_sender
            .publish(Event::WarehouseDeleted(self.warehouse_id))
            .await;
        Ok(())
    }
}

impl DeleteWarehouseCommand {
    async fn delete(&self, db: &DbPool) -> Result<(), ServiceError> {
        let txn = db.begin().await?;
        let warehouse = find_warehouse(&txn, self.warehouse_id).await?;

        let field_ids: Vec<i32> = field::Entity::find()
            .select_only()
            .column(field::Column::Id)
            .filter(field::Column::WarehouseId.eq(warehouse.id))
            .into_tuple()
            .all(&txn)
            .await?;
        let rack_ids: Vec<i32> = rack::Entity::find()
            .select_only()
            .column(rack::Column::Id)
            .filter(rack::Column::WarehouseId.eq(warehouse.id))
            .into_tuple()
            .all(&txn)
            .await?;
        let shelf_ids: Vec<i32> = shelf::Entity::find()
            .select_only()
            .column(shelf::Column::Id)
            .filter(shelf::Column::RackId.is_in(rack_ids.clone()))
            .into_tuple()
            .all(&txn)
            .await?;

        let vaults = vault::Entity::delete_many()
            .filter(vault::Column::FieldId.is_in(field_ids))
            .exec(&txn)
            .await?;
        field::Entity::delete_many()
            .filter(field::Column::WarehouseId.eq(warehouse.id))
            .exec(&txn)
            .await?;
        pallet::Entity::delete_many()
            .filter(pallet::Column::ShelfId.is_in(shelf_ids))
            .exec(&txn)
            .await?;
        shelf::Entity::delete_many()
            .filter(shelf::Column::RackId.is_in(rack_ids))
            .exec(&txn)
            .await?;
        rack::Entity::delete_many()
            .filter(rack::Column::WarehouseId.eq(warehouse.id))
            .exec(&txn)
            .await?;
        warehouse::Entity::delete_by_id(warehouse.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!(
            warehouse_id = warehouse.id,
            vaults_removed = vaults.rows_affected,
            "Warehouse contents removed"
        );
        Ok(())
    }
}

/// Changes how many vaults every field of a warehouse can hold.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFieldCapacityCommand {
    #[serde(skip)]
    pub warehouse_id: i32,
    #[validate(range(min = 1, message = "Field capacity must be at least 1"))]
    #[schema(example = 4)]
    pub capacity: i32,
    pub expected_version: Option<i32>,
}

#[async_trait]
impl Command for UpdateFieldCapacityCommand {
    type Result = warehouse::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(warehouse_id = self.warehouse_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let updated = observe("update_field_capacity", self.update(&db_pool).await)?;

        info!(
            warehouse_id = updated.id,
            capacity = self.capacity,
            "Field capacity updated"
        );
        event_sender
            .publish(Event::FieldCapacityChanged {
                warehouse_id: updated.id,
                capacity: self.capacity,
            })
            .await;
        Ok(updated)
    }
}

impl UpdateFieldCapacityCommand {
    async fn update(&self, db: &DbPool) -> Result<warehouse::Model, ServiceError> {
        self.validate()?;

        let txn = db.begin().await?;
        let warehouse = find_warehouse(&txn, self.warehouse_id).await?;
        check_expected_version(&warehouse, self.expected_version)?;

        let counts = vault_counts(&txn, warehouse.id).await?;
        // validated positive
        let capacity = self.capacity as u32;
        if counts.values().any(|&count| count > capacity) {
            return Err(ServiceError::InvalidOperation(
                "Some fields hold more vaults than the new capacity".to_string(),
            ));
        }

        let capacity_value = self.capacity;
        claim_version(&txn, &warehouse, move |q| {
            q.col_expr(warehouse::Column::FieldCapacity, Expr::value(capacity_value))
        })
        .await?;

        field::Entity::update_many()
            .col_expr(field::Column::Capacity, Expr::value(self.capacity))
            .col_expr(field::Column::Full, Expr::value(false))
            .filter(field::Column::WarehouseId.eq(warehouse.id))
            .exec(&txn)
            .await?;

        let now_full: Vec<i32> = counts
            .iter()
            .filter(|&(_, &count)| count >= capacity)
            .map(|(&id, _)| id)
            .collect();
        if !now_full.is_empty() {
            field::Entity::update_many()
                .col_expr(field::Column::Full, Expr::value(true))
                .filter(field::Column::Id.is_in(now_full))
                .exec(&txn)
                .await?;
        }

        let updated = find_warehouse(&txn, warehouse.id).await?;
        txn.commit().await?;
        Ok(updated)
    }
}

/// Moves the field grid origin on the warehouse floor.
///
/// Racks already on the floor are not checked against the new origin.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetFieldGridPositionCommand {
    #[serde(skip)]
    pub warehouse_id: i32,
    #[validate(custom = "validate_grid_position")]
    pub position: Position,
    pub expected_version: Option<i32>,
}

#[async_trait]
impl Command for SetFieldGridPositionCommand {
    type Result = warehouse::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(warehouse_id = self.warehouse_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let updated = observe("set_field_grid_position", self.update(&db_pool).await)?;

        event_sender
            .publish(Event::FieldGridMoved {
                warehouse_id: updated.id,
                x: updated.field_grid_x,
                y: updated.field_grid_y,
            })
            .await;
        Ok(updated)
    }
}

impl SetFieldGridPositionCommand {
    async fn update(&self, db: &DbPool) -> Result<warehouse::Model, ServiceError> {
        self.validate().map_err(|_| invalid_grid_position())?;

        let txn = db.begin().await?;
        let warehouse = find_warehouse(&txn, self.warehouse_id).await?;
        check_expected_version(&warehouse, self.expected_version)?;

        let Position { x, y } = self.position;
        claim_version(&txn, &warehouse, move |q| {
            q.col_expr(warehouse::Column::FieldGridX, Expr::value(x))
                .col_expr(warehouse::Column::FieldGridY, Expr::value(y))
        })
        .await?;

        let updated = find_warehouse(&txn, warehouse.id).await?;
        txn.commit().await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{commands::MAX_GRID_ROWS, entities::field::FieldType};
    use rstest::rstest;

    fn create(cols: i32, rows: i32) -> CreateWarehouseCommand {
        CreateWarehouseCommand {
            name: "North".into(),
            rows,
            cols,
            width: None,
            length: None,
            field_capacity: None,
            field_grid_position: None,
            address: None,
            company_id: None,
        }
    }

    #[rstest]
    #[case(1, 1, true)]
    #[case(26, 5, true)]
    #[case(27, 5, false)]
    #[case(0, 5, false)]
    #[case(3, 0, false)]
    #[case(26, MAX_GRID_ROWS as i32, true)]
    #[case(1, MAX_GRID_ROWS as i32 + 1, false)]
    #[case(1, i32::MAX, false)]
    fn grid_dimensions_are_validated(#[case] cols: i32, #[case] rows: i32, #[case] ok: bool) {
        assert_eq!(create(cols, rows).validate().is_ok(), ok);
    }

    #[rstest]
    #[case(0.0, 0.0, true)]
    #[case(4.5, 2.0, true)]
    #[case(-1.0, 0.0, false)]
    #[case(0.0, f64::NAN, false)]
    fn grid_position_must_be_on_the_floor(#[case] x: f64, #[case] y: f64, #[case] ok: bool) {
        assert_eq!(validate_grid_position(&Position::new(x, y)).is_ok(), ok);
    }

    #[test]
    fn field_type_defaults_to_vault() {
        let grid = FieldGrid::generate(1, 1).unwrap();
        let kind: FieldType = grid.cells().next().unwrap().kind.into();
        assert_eq!(kind, FieldType::Vault);
    }
}
