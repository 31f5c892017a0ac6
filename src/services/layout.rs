use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;

use crate::{
    commands::{
        fields::{SetFieldFullCommand, ToggleFieldTypeCommand},
        find_field, find_warehouse,
        grid::ResizeGridCommand,
        racks::{AddRackCommand, AddShelfCommand, DeleteRackCommand, MoveRackCommand},
        Command,
    },
    db::DbPool,
    dto::{FieldTypeToggleResult, FieldView, RackView, ResizeGridResult, ShelfView},
    entities::{field, pallet, rack, shelf, vault},
    errors::ServiceError,
    events::EventSender,
};

/// Grid, rack and field-type operations on a warehouse floor.
#[derive(Clone)]
pub struct LayoutService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl LayoutService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn run<C>(&self, command: C) -> Result<C::Result, ServiceError>
    where
        C: Command,
    {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, command), fields(warehouse_id = command.warehouse_id))]
    pub async fn resize_grid(
        &self,
        command: ResizeGridCommand,
    ) -> Result<ResizeGridResult, ServiceError> {
        self.run(command).await
    }

    #[instrument(skip(self, command), fields(warehouse_id = command.warehouse_id))]
    pub async fn add_rack(&self, command: AddRackCommand) -> Result<RackView, ServiceError> {
        self.run(command).await
    }

    #[instrument(skip(self, command), fields(rack_id = command.rack_id))]
    pub async fn move_rack(&self, command: MoveRackCommand) -> Result<rack::Model, ServiceError> {
        self.run(command).await
    }

    #[instrument(skip(self))]
    pub async fn delete_rack(&self, rack_id: i32) -> Result<(), ServiceError> {
        self.run(DeleteRackCommand { rack_id }).await
    }

    #[instrument(skip(self))]
    pub async fn list_racks(&self, warehouse_id: i32) -> Result<Vec<RackView>, ServiceError> {
        let db = &*self.db_pool;
        find_warehouse(db, warehouse_id).await?;
        rack_views(db, warehouse_id).await
    }

    #[instrument(skip(self, command), fields(rack_id = command.rack_id))]
    pub async fn add_shelf(&self, command: AddShelfCommand) -> Result<shelf::Model, ServiceError> {
        self.run(command).await
    }

    #[instrument(skip(self, command), fields(field_id = command.field_id))]
    pub async fn set_field_type(
        &self,
        command: ToggleFieldTypeCommand,
    ) -> Result<FieldTypeToggleResult, ServiceError> {
        self.run(command).await
    }

    #[instrument(skip(self))]
    pub async fn get_field(&self, field_id: i32) -> Result<FieldView, ServiceError> {
        let db = &*self.db_pool;
        let field = find_field(db, field_id).await?;
        let vaults = vault::Entity::find()
            .filter(vault::Column::FieldId.eq(field.id))
            .order_by_asc(vault::Column::Id)
            .all(db)
            .await?;
        Ok(FieldView::new(field, vaults))
    }

    /// Sets `full` explicitly, or flips it when `full` is `None`.
    #[instrument(skip(self))]
    pub async fn set_field_full(
        &self,
        field_id: i32,
        full: Option<bool>,
    ) -> Result<field::Model, ServiceError> {
        self.run(SetFieldFullCommand { field_id, full }).await
    }
}

/// Racks of a warehouse with their shelves and pallets, ordered by id.
pub(crate) async fn rack_views<C: ConnectionTrait>(
    conn: &C,
    warehouse_id: i32,
) -> Result<Vec<RackView>, ServiceError> {
    let racks = rack::Entity::find()
        .filter(rack::Column::WarehouseId.eq(warehouse_id))
        .order_by_asc(rack::Column::Id)
        .find_with_related(shelf::Entity)
        .all(conn)
        .await?;

    let mut views = Vec::with_capacity(racks.len());
    for (rack, mut shelves) in racks {
        shelves.sort_by_key(|s| s.id);
        let mut shelf_views = Vec::with_capacity(shelves.len());
        for shelf in shelves {
            let pallets = pallet::Entity::find()
                .filter(pallet::Column::ShelfId.eq(shelf.id))
                .order_by_asc(pallet::Column::Id)
                .all(conn)
                .await?;
            shelf_views.push(ShelfView::new(shelf, pallets));
        }
        views.push(RackView {
            rack,
            shelves: shelf_views,
        });
    }
    Ok(views)
}
