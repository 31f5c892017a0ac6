use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use strum::{AsRefStr, Display, EnumString};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    commands::{
        check_expected_version, claim_version, find_warehouse, insert_fields, observe, vault_counts,
        Command, MAX_GRID_ROWS,
    },
    db::DbPool,
    dto::ResizeGridResult,
    entities::{
        field::{self, FieldType},
        warehouse,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    layout::{Edge, FieldCell, FieldGrid, GridChange},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ResizeOperation {
    Grow,
    Shrink,
}

/// Adds or removes whole columns or rows on one edge of a field grid.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResizeGridCommand {
    #[serde(skip)]
    pub warehouse_id: i32,
    /// `left`, `right` or `bottom`.
    #[schema(example = "left")]
    pub edge: String,
    #[validate(range(min = 1, max = 500, message = "Count must be between 1 and 500"))]
    #[schema(example = 2)]
    pub count: u32,
    /// `grow` or `shrink`.
    #[schema(example = "grow")]
    pub operation: String,
    pub expected_version: Option<i32>,
}

#[async_trait]
impl Command for ResizeGridCommand {
    type Result = ResizeGridResult;

    #[instrument(
        skip(self, db_pool, event_sender),
        fields(warehouse_id = self.warehouse_id, edge = %self.edge, operation = %self.operation, count = self.count)
    )]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let result = observe("resize_grid", self.resize(&db_pool).await)?;

        info!(
            warehouse_id = result.warehouse_id,
            rows = result.new_warehouse_rows_count,
            cols = result.new_warehouse_cols_count,
            "Field grid resized"
        );
        event_sender
            .publish(Event::GridResized {
                warehouse_id: result.warehouse_id,
                edge: self.edge.clone(),
                operation: self.operation.clone(),
                count: self.count,
                rows: result.new_warehouse_rows_count.max(0) as u32,
                cols: result.new_warehouse_cols_count.max(0) as u32,
            })
            .await;

        Ok(result)
    }
}

impl ResizeGridCommand {
    async fn resize(&self, db: &DbPool) -> Result<ResizeGridResult, ServiceError> {
        let edge = Edge::parse(&self.edge)?;
        let operation = ResizeOperation::from_str(&self.operation)
            .map_err(|_| ServiceError::validation("method or operation are not correct"))?;
        self.validate()?;

        let txn = db.begin().await?;
        let warehouse = find_warehouse(&txn, self.warehouse_id).await?;
        check_expected_version(&warehouse, self.expected_version)?;

        let mut grid = load_grid(&txn, &warehouse).await?;
        let change = match operation {
            ResizeOperation::Grow => grid.grow(edge, self.count)?,
            ResizeOperation::Shrink => grid.shrink(edge, self.count)?,
        };
        if change.rows > MAX_GRID_ROWS {
            return Err(ServiceError::validation(format!(
                "Grid cannot have more than {MAX_GRID_ROWS} rows"
            )));
        }
        debug!(
            created = change.created.len(),
            renamed = change.renamed.len(),
            removed = change.removed.len(),
            retyped = change.retyped.len(),
            "applying grid change"
        );

        persist_change(&txn, &warehouse, &change).await?;

        let rows = i32::try_from(change.rows)
            .map_err(|_| ServiceError::validation("Grid has too many rows"))?;
        let cols = i32::try_from(change.cols)
            .map_err(|_| ServiceError::validation("Grid has too many columns"))?;
        let version = claim_version(&txn, &warehouse, move |q| {
            q.col_expr(warehouse::Column::Rows, Expr::value(rows))
                .col_expr(warehouse::Column::Cols, Expr::value(cols))
        })
        .await?;

        let fields = field::Entity::find()
            .filter(field::Column::WarehouseId.eq(warehouse.id))
            .order_by_asc(field::Column::Id)
            .all(&txn)
            .await?;

        txn.commit().await?;

        Ok(ResizeGridResult {
            fields,
            warehouse_id: warehouse.id,
            new_warehouse_rows_count: rows,
            new_warehouse_cols_count: cols,
            version,
        })
    }
}

/// Rebuilds the in-memory grid of a warehouse with current vault counts.
pub(crate) async fn load_grid(
    txn: &DatabaseTransaction,
    warehouse: &warehouse::Model,
) -> Result<FieldGrid, ServiceError> {
    let fields = field::Entity::find()
        .filter(field::Column::WarehouseId.eq(warehouse.id))
        .all(txn)
        .await?;
    let counts = vault_counts(txn, warehouse.id).await?;

    let cells = fields
        .iter()
        .map(|f| {
            FieldCell::stored(
                f.id,
                &f.name,
                f.field_type.into(),
                counts.get(&f.id).copied().unwrap_or(0),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FieldGrid::from_cells(
        warehouse.cols.max(0) as u32,
        warehouse.rows.max(0) as u32,
        cells,
    )?)
}

async fn persist_change(
    txn: &DatabaseTransaction,
    warehouse: &warehouse::Model,
    change: &GridChange,
) -> Result<(), ServiceError> {
    let removed = change.removed_ids();
    if !removed.is_empty() {
        field::Entity::delete_many()
            .filter(field::Column::Id.is_in(removed))
            .exec(txn)
            .await?;
    }

    for renamed in &change.renamed {
        let Some(id) = renamed.id else { continue };
        field::Entity::update_many()
            .col_expr(field::Column::Name, Expr::value(renamed.to.clone()))
            .filter(field::Column::Id.eq(id))
            .exec(txn)
            .await?;
    }

    let retyped: Vec<i32> = change.retyped.iter().filter_map(|cell| cell.id).collect();
    if !retyped.is_empty() {
        field::Entity::update_many()
            .col_expr(field::Column::FieldType, Expr::value(FieldType::Vault))
            .filter(field::Column::Id.is_in(retyped))
            .exec(txn)
            .await?;
    }

    if !change.created.is_empty() {
        let rows = change
            .created
            .iter()
            .map(|cell| field::ActiveModel {
                name: Set(cell.name.clone()),
                field_type: Set(cell.kind.into()),
                capacity: Set(warehouse.field_capacity),
                full: Set(false),
                warehouse_id: Set(warehouse.id),
                ..Default::default()
            })
            .collect();
        insert_fields(txn, rows).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("grow", ResizeOperation::Grow)]
    #[case("shrink", ResizeOperation::Shrink)]
    fn operations_parse_lowercase(#[case] raw: &str, #[case] expected: ResizeOperation) {
        assert_eq!(ResizeOperation::from_str(raw).unwrap(), expected);
        assert_eq!(expected.as_ref(), raw);
    }

    #[test]
    fn unknown_operation_is_rejected() {
        assert!(ResizeOperation::from_str("stretch").is_err());
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(500, true)]
    #[case(501, false)]
    fn count_is_bounded(#[case] count: u32, #[case] ok: bool) {
        let command = ResizeGridCommand {
            warehouse_id: 1,
            edge: "right".into(),
            count,
            operation: "grow".into(),
            expected_version: None,
        };
        assert_eq!(command.validate().is_ok(), ok);
    }
}
