use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    commands::{observe, Command},
    db::DbPool,
    dto::ShelfView,
    entities::{pallet, shelf},
    errors::ServiceError,
    events::{Event, EventSender},
};

async fn find_shelf<C: ConnectionTrait>(conn: &C, shelf_id: i32) -> Result<shelf::Model, ServiceError> {
    shelf::Entity::find_by_id(shelf_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Shelf not found"))
}

async fn find_pallet<C: ConnectionTrait>(conn: &C, pallet_id: i32) -> Result<pallet::Model, ServiceError> {
    pallet::Entity::find_by_id(pallet_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Pallet not found"))
}

async fn pallets_on<C: ConnectionTrait>(conn: &C, shelf_id: i32) -> Result<Vec<pallet::Model>, ServiceError> {
    Ok(pallet::Entity::find()
        .filter(pallet::Column::ShelfId.eq(shelf_id))
        .order_by_asc(pallet::Column::Id)
        .all(conn)
        .await?)
}

fn check_weight(weight: f64) -> Result<(), ServiceError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(ServiceError::validation("Invalid weight"))
    }
}

fn check_spots(spots: i32) -> Result<(), ServiceError> {
    if spots >= 1 {
        Ok(())
    } else {
        Err(ServiceError::validation("Invalid shelf spots value"))
    }
}

fn check_room(shelf: &shelf::Model, occupied: i32, requested: i32) -> Result<(), ServiceError> {
    if occupied.saturating_add(requested) > shelf.capacity {
        Err(ServiceError::InvalidOperation(
            "Shelf capacity exceeded".to_string(),
        ))
    } else {
        Ok(())
    }
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Puts a pallet on a shelf.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPalletCommand {
    #[serde(skip)]
    pub shelf_id: i32,
    #[schema(example = "ACME MOVERS")]
    pub customer_name: Option<String>,
    #[schema(example = "P-1042")]
    pub pallet_number: Option<String>,
    #[validate(length(max = 100))]
    pub name: Option<String>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
    pub shelf_spots: Option<i32>,
    pub customer_id: Option<i32>,
}

#[async_trait]
impl Command for AddPalletCommand {
    type Result = ShelfView;

    #[instrument(skip(self, db_pool, event_sender), fields(shelf_id = self.shelf_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let (view, pallet_id) = observe("add_pallet", self.add(&db_pool).await)?;

        info!(pallet_id, shelf_id = view.shelf.id, "Pallet added");
        event_sender
            .publish(Event::PalletAdded {
                shelf_id: view.shelf.id,
                pallet_id,
            })
            .await;
        Ok(view)
    }
}

impl AddPalletCommand {
    async fn add(&self, db: &DbPool) -> Result<(ShelfView, i32), ServiceError> {
        let (Some(customer_name), Some(pallet_number)) = (
            required(self.customer_name.as_deref()),
            required(self.pallet_number.as_deref()),
        ) else {
            return Err(ServiceError::validation(
                "Customer name and pallet number are required",
            ));
        };
        self.validate()?;
        let weight = self.weight.unwrap_or(0.0);
        check_weight(weight)?;
        let spots = self.shelf_spots.unwrap_or(1);
        check_spots(spots)?;

        let txn = db.begin().await?;
        let shelf = find_shelf(&txn, self.shelf_id).await?;
        let occupied: i32 = pallets_on(&txn, shelf.id)
            .await?
            .iter()
            .map(|p| p.shelf_spots)
            .sum();
        check_room(&shelf, occupied, spots)?;

        let name = required(self.name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Pallet-{}-{}", shelf.id, pallet_number));

        let created = pallet::ActiveModel {
            name: Set(name),
            weight: Set(weight),
            customer_name: Set(customer_name.to_string()),
            customer_id: Set(self.customer_id),
            pallet_number: Set(pallet_number.to_string()),
            notes: Set(self.notes.clone()),
            shelf_spots: Set(spots),
            shelf_id: Set(shelf.id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let pallets = pallets_on(&txn, shelf.id).await?;
        txn.commit().await?;
        Ok((ShelfView::new(shelf, pallets), created.id))
    }
}

/// Edits a pallet in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePalletCommand {
    #[serde(skip)]
    pub pallet_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub weight: Option<f64>,
    pub customer_name: Option<String>,
    pub customer_id: Option<i32>,
    pub pallet_number: Option<String>,
    pub notes: Option<String>,
    pub shelf_spots: Option<i32>,
}

#[async_trait]
impl Command for UpdatePalletCommand {
    type Result = pallet::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(pallet_id = self.pallet_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let updated = observe("update_pallet", self.update(&db_pool).await)?;

        event_sender.publish(Event::PalletUpdated(updated.id)).await;
        Ok(updated)
    }
}

impl UpdatePalletCommand {
    async fn update(&self, db: &DbPool) -> Result<pallet::Model, ServiceError> {
        self.validate()?;
        let blank = |value: &Option<String>| value.as_deref().is_some_and(|v| v.trim().is_empty());
        if blank(&self.customer_name) || blank(&self.pallet_number) {
            return Err(ServiceError::validation(
                "Customer name and pallet number are required",
            ));
        }
        if let Some(weight) = self.weight {
            check_weight(weight)?;
        }
        if let Some(spots) = self.shelf_spots {
            check_spots(spots)?;
        }

        let txn = db.begin().await?;
        let existing = find_pallet(&txn, self.pallet_id).await?;

        if let Some(spots) = self.shelf_spots.filter(|&s| s > existing.shelf_spots) {
            let shelf = find_shelf(&txn, existing.shelf_id).await?;
            let others: i32 = pallets_on(&txn, shelf.id)
                .await?
                .iter()
                .filter(|p| p.id != existing.id)
                .map(|p| p.shelf_spots)
                .sum();
            check_room(&shelf, others, spots)?;
        }

        let mut active: pallet::ActiveModel = existing.into();
        if let Some(name) = &self.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(weight) = self.weight {
            active.weight = Set(weight);
        }
        if let Some(customer_name) = &self.customer_name {
            active.customer_name = Set(customer_name.trim().to_string());
        }
        if let Some(customer_id) = self.customer_id {
            active.customer_id = Set(Some(customer_id));
        }
        if let Some(pallet_number) = &self.pallet_number {
            active.pallet_number = Set(pallet_number.trim().to_string());
        }
        if let Some(notes) = &self.notes {
            active.notes = Set(Some(notes.clone()));
        }
        if let Some(spots) = self.shelf_spots {
            active.shelf_spots = Set(spots);
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePalletCommand {
    pub pallet_id: i32,
}

#[async_trait]
impl Command for DeletePalletCommand {
    type Result = ();

    #[instrument(skip(self, db_pool, event_sender), fields(pallet_id = self.pallet_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let shelf_id = observe("delete_pallet", self.delete(&db_pool).await)?;

        event_sender
            .publish(Event::PalletRemoved {
                shelf_id,
                pallet_id: self.pallet_id,
            })
            .await;
        Ok(())
    }
}

impl DeletePalletCommand {
    async fn delete(&self, db: &DbPool) -> Result<i32, ServiceError> {
        let txn = db.begin().await?;
        let pallet = find_pallet(&txn, self.pallet_id).await?;
        pallet::Entity::delete_by_id(pallet.id).exec(&txn).await?;
        txn.commit().await?;
        Ok(pallet.shelf_id)
    }
}
