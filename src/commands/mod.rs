use crate::{
    db::DbPool,
    entities::{field, vault, warehouse},
    errors::ServiceError,
    events::EventSender,
    metrics,
};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QuerySelect, RelationTrait, UpdateMany,
};
use std::{collections::HashMap, sync::Arc};
use tracing::warn;

pub mod fields;
pub mod grid;
pub mod pallets;
pub mod racks;
pub mod vaults;
pub mod warehouses;

/// Command trait for implementing the Command Pattern
///
/// Each command validates its input, runs its mutation inside one database
/// transaction and publishes events once the transaction has committed.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command with the given dependencies
    ///
    /// # Arguments
    /// * `db_pool` - Database connection pool for persistence operations
    /// * `event_sender` - Channel to publish domain events
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError>;
}

/// Largest number of rows a field grid may have.
pub const MAX_GRID_ROWS: u32 = 1000;

/// Fields written per INSERT; five bound values each keeps a batch well
/// under SQLite's bind variable limit.
const FIELD_INSERT_BATCH: usize = 1000;

/// Inserts field rows in fixed-size batches on the caller's connection.
pub(crate) async fn insert_fields<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<field::ActiveModel>,
) -> Result<(), ServiceError> {
    for batch in rows.chunks(FIELD_INSERT_BATCH) {
        field::Entity::insert_many(batch.iter().cloned())
            .exec(conn)
            .await?;
    }
    Ok(())
}

/// Counts a finished command as a mutation or a rejection.
pub(crate) fn observe<T>(
    operation: &'static str,
    result: Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    match &result {
        Ok(_) => metrics::record_mutation(operation),
        Err(err) => {
            metrics::record_rejection(operation, err);
            if err.status_code().is_server_error() {
                tracing::error!(operation, error = %err, "layout command failed");
            } else {
                tracing::debug!(operation, error = %err, "layout command rejected");
            }
        }
    }
    result
}

pub(crate) async fn find_warehouse<C: ConnectionTrait>(
    conn: &C,
    warehouse_id: i32,
) -> Result<warehouse::Model, ServiceError> {
    warehouse::Entity::find_by_id(warehouse_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Warehouse not found"))
}

pub(crate) async fn find_field<C: ConnectionTrait>(
    conn: &C,
    field_id: i32,
) -> Result<field::Model, ServiceError> {
    field::Entity::find_by_id(field_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Field not found"))
}

pub(crate) fn check_expected_version(
    warehouse: &warehouse::Model,
    expected_version: Option<i32>,
) -> Result<(), ServiceError> {
    match expected_version {
        Some(expected) if expected != warehouse.version => {
            warn!(
                warehouse_id = warehouse.id,
                expected,
                actual = warehouse.version,
                "stale warehouse version"
            );
            Err(ServiceError::ConcurrentModification(warehouse.id))
        }
        _ => Ok(()),
    }
}

/// Bumps the warehouse version if it still matches the loaded row.
///
/// `update` adds any other warehouse columns the command changes. Returns
/// the new version; zero affected rows means another request got there first.
pub(crate) async fn claim_version<C, F>(
    conn: &C,
    warehouse: &warehouse::Model,
    update: F,
) -> Result<i32, ServiceError>
where
    C: ConnectionTrait,
    F: FnOnce(UpdateMany<warehouse::Entity>) -> UpdateMany<warehouse::Entity>,
{
    let query = warehouse::Entity::update_many()
        .col_expr(
            warehouse::Column::Version,
            Expr::col(warehouse::Column::Version).add(1),
        )
        .col_expr(warehouse::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(warehouse::Column::Id.eq(warehouse.id))
        .filter(warehouse::Column::Version.eq(warehouse.version));

    let result = update(query).exec(conn).await?;
    if result.rows_affected == 0 {
        warn!(
            warehouse_id = warehouse.id,
            version = warehouse.version,
            "concurrent warehouse modification detected"
        );
        return Err(ServiceError::ConcurrentModification(warehouse.id));
    }

    Ok(warehouse.version + 1)
}

#[derive(Debug, FromQueryResult)]
struct FieldVaultCount {
    field_id: Option<i32>,
    vaults: i64,
}

/// Vault counts keyed by field id for every occupied field of a warehouse.
pub(crate) async fn vault_counts<C: ConnectionTrait>(
    conn: &C,
    warehouse_id: i32,
) -> Result<HashMap<i32, u32>, ServiceError> {
    let rows = vault::Entity::find()
        .select_only()
        .column(vault::Column::FieldId)
        .column_as(Expr::col((vault::Entity, vault::Column::Id)).count(), "vaults")
        .join(JoinType::InnerJoin, vault::Relation::Field.def())
        .filter(field::Column::WarehouseId.eq(warehouse_id))
        .group_by(vault::Column::FieldId)
        .into_model::<FieldVaultCount>()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            row.field_id
                .map(|id| (id, u32::try_from(row.vaults).unwrap_or(u32::MAX)))
        })
        .collect())
}

pub(crate) async fn vault_count<C: ConnectionTrait>(
    conn: &C,
    field_id: i32,
) -> Result<u32, ServiceError> {
    let count = vault::Entity::find()
        .filter(vault::Column::FieldId.eq(field_id))
        .count(conn)
        .await?;
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}
