use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    commands::{check_expected_version, claim_version, find_warehouse, observe, Command},
    db::DbPool,
    dto::{RackView, ShelfView},
    entities::{
        pallet,
        rack::{self, RackOrientation},
        shelf, warehouse, Position,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    layout::{check_placement, Footprint, Point},
};

fn invalid_position() -> ServiceError {
    ServiceError::validation("Invalid rack position")
}

fn shelf_name(rack_name: &str, index: u64) -> String {
    format!("{rack_name}-shelf-{index}")
}

/// Runs the placement validator for a rack footprint on a warehouse floor.
fn ensure_admissible(
    warehouse: &warehouse::Model,
    footprint: &Footprint,
) -> Result<(), ServiceError> {
    let check = check_placement(&warehouse.floor(), &warehouse.field_grid_area(), footprint);
    if check.is_admissible() {
        Ok(())
    } else {
        warn!(
            warehouse_id = warehouse.id,
            within_bounds = check.within_bounds,
            overlaps_field_grid = check.overlaps_field_grid,
            "rack placement rejected"
        );
        Err(invalid_position())
    }
}

async fn find_rack<C: ConnectionTrait>(conn: &C, rack_id: i32) -> Result<rack::Model, ServiceError> {
    rack::Entity::find_by_id(rack_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Rack not found"))
}

async fn shelf_name_taken(
    txn: &DatabaseTransaction,
    rack_id: i32,
    name: &str,
) -> Result<bool, ServiceError> {
    Ok(shelf::Entity::find()
        .filter(shelf::Column::RackId.eq(rack_id))
        .filter(shelf::Column::Name.eq(name))
        .one(txn)
        .await?
        .is_some())
}

/// Places a new rack on the warehouse floor, optionally with shelves.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddRackCommand {
    #[serde(skip)]
    pub warehouse_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub position: Option<Position>,
    #[schema(example = 4.0)]
    pub width: Option<f64>,
    #[schema(example = 10.0)]
    pub length: Option<f64>,
    #[serde(default)]
    pub orientation: RackOrientation,
    #[schema(example = 3)]
    pub capacity: Option<i32>,
    #[validate(range(max = 50, message = "At most 50 shelves can be created at once"))]
    pub num_shelves: Option<u32>,
    pub expected_version: Option<i32>,
}

#[async_trait]
impl Command for AddRackCommand {
    type Result = RackView;

    #[instrument(skip(self, db_pool, event_sender), fields(warehouse_id = self.warehouse_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let view = observe("add_rack", self.add(&db_pool).await)?;

        info!(
            rack_id = view.rack.id,
            shelves = view.shelves.len(),
            "Rack placed"
        );
        event_sender
            .publish(Event::RackPlaced {
                warehouse_id: view.rack.warehouse_id,
                rack_id: view.rack.id,
                shelves: view.shelves.len(),
            })
            .await;
        Ok(view)
    }
}

impl AddRackCommand {
    /// Checks the request in the order clients see errors reported.
    fn footprint(&self) -> Result<(Footprint, i32), ServiceError> {
        let (Some(width), Some(length)) = (self.width, self.length) else {
            return Err(ServiceError::validation("Rack dimensions are missing"));
        };
        if !(width.is_finite() && length.is_finite() && width > 0.0 && length > 0.0) {
            return Err(ServiceError::validation("Invalid dimensions provided"));
        }
        let capacity = match self.capacity {
            Some(capacity) if capacity >= 1 => capacity,
            _ => return Err(ServiceError::validation("Invalid capacity value")),
        };
        let origin = self
            .position
            .map(Point::from)
            .filter(Point::is_finite)
            .ok_or_else(invalid_position)?;

        Ok((
            Footprint::oriented(origin, width, length, self.orientation.into()),
            capacity,
        ))
    }

    async fn add(&self, db: &DbPool) -> Result<RackView, ServiceError> {
        self.validate()?;

        let txn = db.begin().await?;
        let warehouse = find_warehouse(&txn, self.warehouse_id).await?;
        check_expected_version(&warehouse, self.expected_version)?;

        let (footprint, capacity) = self.footprint()?;
        ensure_admissible(&warehouse, &footprint)?;

        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                let taken = rack::Entity::find()
                    .filter(rack::Column::WarehouseId.eq(warehouse.id))
                    .filter(rack::Column::Name.eq(name))
                    .one(&txn)
                    .await?;
                if taken.is_some() {
                    return Err(ServiceError::Conflict(format!(
                        "Rack '{}' already exists",
                        name
                    )));
                }
                name.to_string()
            }
            _ => next_rack_name(&txn, warehouse.id).await?,
        };

        let created = rack::ActiveModel {
            name: Set(name),
            capacity: Set(capacity),
            warehouse_id: Set(warehouse.id),
            position: Set(self.position.unwrap_or_default()),
            width: Set(self.width.unwrap_or_default()),
            length: Set(self.length.unwrap_or_default()),
            orientation: Set(self.orientation),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut shelves = Vec::new();
        for index in 1..=u64::from(self.num_shelves.unwrap_or(0)) {
            let shelf = shelf::ActiveModel {
                name: Set(shelf_name(&created.name, index)),
                capacity: Set(capacity),
                rack_id: Set(created.id),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            shelves.push(ShelfView::new(shelf, Vec::new()));
        }

        claim_version(&txn, &warehouse, |q| q).await?;
        txn.commit().await?;

        Ok(RackView {
            rack: created,
            shelves,
        })
    }
}

async fn next_rack_name(txn: &DatabaseTransaction, warehouse_id: i32) -> Result<String, ServiceError> {
    let existing: Vec<String> = rack::Entity::find()
        .select_only()
        .column(rack::Column::Name)
        .filter(rack::Column::WarehouseId.eq(warehouse_id))
        .into_tuple()
        .all(txn)
        .await?;

    let mut index = existing.len() + 1;
    loop {
        let candidate = format!("Rack-{index}");
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
        index += 1;
    }
}

/// Moves a rack, keeping its stored dimensions and orientation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveRackCommand {
    #[serde(skip)]
    pub warehouse_id: i32,
    #[serde(skip)]
    pub rack_id: i32,
    pub position: Option<Position>,
    pub expected_version: Option<i32>,
}

#[async_trait]
impl Command for MoveRackCommand {
    type Result = rack::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(warehouse_id = self.warehouse_id, rack_id = self.rack_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let moved = observe("move_rack", self.relocate(&db_pool).await)?;

        info!(rack_id = moved.id, x = moved.position.x, y = moved.position.y, "Rack moved");
        event_sender
            .publish(Event::RackMoved {
                warehouse_id: moved.warehouse_id,
                rack_id: moved.id,
            })
            .await;
        Ok(moved)
    }
}

impl MoveRackCommand {
    async fn relocate(&self, db: &DbPool) -> Result<rack::Model, ServiceError> {
        let txn = db.begin().await?;
        let warehouse = find_warehouse(&txn, self.warehouse_id).await?;
        check_expected_version(&warehouse, self.expected_version)?;

        let rack = find_rack(&txn, self.rack_id).await?;
        if rack.warehouse_id != warehouse.id {
            return Err(ServiceError::not_found("Rack not found"));
        }

        let position = self
            .position
            .filter(|p| Point::from(*p).is_finite())
            .ok_or_else(invalid_position)?;
        ensure_admissible(&warehouse, &rack.footprint_at(position))?;

        let mut active: rack::ActiveModel = rack.into();
        active.position = Set(position);
        let moved = active.update(&txn).await?;

        claim_version(&txn, &warehouse, |q| q).await?;
        txn.commit().await?;
        Ok(moved)
    }
}

/// Removes a rack together with its shelves and pallets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRackCommand {
    pub rack_id: i32,
}

#[async_trait]
impl Command for DeleteRackCommand {
    type Result = ();

    #[instrument(skip(self, db_pool, event_sender), fields(rack_id = self.rack_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let warehouse_id = observe("delete_rack", self.delete(&db_pool).await)?;

        info!(rack_id = self.rack_id, warehouse_id, "Rack removed");
        event_sender
            .publish(Event::RackRemoved {
                warehouse_id,
                rack_id: self.rack_id,
            })
            .await;
        Ok(())
    }
}

impl DeleteRackCommand {
    async fn delete(&self, db: &DbPool) -> Result<i32, ServiceError> {
        let txn = db.begin().await?;
        let rack = find_rack(&txn, self.rack_id).await?;
        let warehouse = find_warehouse(&txn, rack.warehouse_id).await?;

        let shelf_ids: Vec<i32> = shelf::Entity::find()
            .select_only()
            .column(shelf::Column::Id)
            .filter(shelf::Column::RackId.eq(rack.id))
            .into_tuple()
            .all(&txn)
            .await?;

        pallet::Entity::delete_many()
            .filter(pallet::Column::ShelfId.is_in(shelf_ids))
            .exec(&txn)
            .await?;
        shelf::Entity::delete_many()
            .filter(shelf::Column::RackId.eq(rack.id))
            .exec(&txn)
            .await?;
        rack::Entity::delete_by_id(rack.id).exec(&txn).await?;

        claim_version(&txn, &warehouse, |q| q).await?;
        txn.commit().await?;
        Ok(warehouse.id)
    }
}

/// Adds one shelf to an existing rack.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddShelfCommand {
    #[serde(skip)]
    pub rack_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(range(min = 1, message = "Invalid capacity value"))]
    pub capacity: Option<i32>,
}

#[async_trait]
impl Command for AddShelfCommand {
    type Result = shelf::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(rack_id = self.rack_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let shelf = observe("add_shelf", self.add(&db_pool).await)?;

        event_sender
            .publish(Event::ShelfAdded {
                rack_id: shelf.rack_id,
                shelf_id: shelf.id,
            })
            .await;
        Ok(shelf)
    }
}

impl AddShelfCommand {
    async fn add(&self, db: &DbPool) -> Result<shelf::Model, ServiceError> {
        self.validate()?;

        let txn = db.begin().await?;
        let rack = find_rack(&txn, self.rack_id).await?;
        let warehouse = find_warehouse(&txn, rack.warehouse_id).await?;

        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                if shelf_name_taken(&txn, rack.id, name).await? {
                    return Err(ServiceError::Conflict(format!(
                        "Shelf '{}' already exists",
                        name
                    )));
                }
                name.to_string()
            }
            _ => {
                let mut index = shelf::Entity::find()
                    .filter(shelf::Column::RackId.eq(rack.id))
                    .count(&txn)
                    .await?
                    + 1;
                while shelf_name_taken(&txn, rack.id, &shelf_name(&rack.name, index)).await? {
                    index += 1;
                }
                shelf_name(&rack.name, index)
            }
        };

        let shelf = shelf::ActiveModel {
            name: Set(name),
            capacity: Set(self.capacity.unwrap_or(rack.capacity)),
            rack_id: Set(rack.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        claim_version(&txn, &warehouse, |q| q).await?;
        txn.commit().await?;
        Ok(shelf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    fn request(width: Option<f64>, length: Option<f64>, capacity: Option<i32>) -> AddRackCommand {
        AddRackCommand {
            warehouse_id: 1,
            name: None,
            position: Some(Position::new(2.0, 3.0)),
            width,
            length,
            orientation: RackOrientation::Vertical,
            capacity,
            num_shelves: None,
            expected_version: None,
        }
    }

    fn message(result: Result<(Footprint, i32), ServiceError>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn missing_dimension_is_reported_first() {
        assert_eq!(
            message(request(None, Some(2.0), None).footprint()),
            "Rack dimensions are missing"
        );
    }

    #[rstest]
    #[case(0.0, 2.0)]
    #[case(-1.0, 2.0)]
    #[case(2.0, f64::INFINITY)]
    #[case(f64::NAN, 2.0)]
    fn non_positive_or_non_finite_dimensions_are_invalid(#[case] width: f64, #[case] length: f64) {
        assert_eq!(
            message(request(Some(width), Some(length), Some(3)).footprint()),
            "Invalid dimensions provided"
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some(0))]
    #[case(Some(-4))]
    fn capacity_must_be_positive(#[case] capacity: Option<i32>) {
        assert_eq!(
            message(request(Some(2.0), Some(2.0), capacity).footprint()),
            "Invalid capacity value"
        );
    }

    #[test]
    fn missing_position_is_an_invalid_position() {
        let mut command = request(Some(2.0), Some(4.0), Some(3));
        command.position = None;
        assert_matches!(command.footprint(), Err(ServiceError::ValidationError(msg)) if msg == "Invalid rack position");
    }

    #[test]
    fn horizontal_racks_swap_their_dimensions() {
        let mut command = request(Some(2.0), Some(4.0), Some(3));
        command.orientation = RackOrientation::Horizontal;
        let (footprint, capacity) = command.footprint().unwrap();
        assert_eq!((footprint.width, footprint.length), (4.0, 2.0));
        assert_eq!(capacity, 3);
    }

    #[test]
    fn shelves_are_named_after_their_rack() {
        assert_eq!(shelf_name("Rack-2", 3), "Rack-2-shelf-3");
    }
}
