use std::{collections::BTreeMap, ops::RangeInclusive, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::{
    field_kind::FieldKind,
    namer::{name_of, parse_name, MAX_COLUMNS},
    LayoutError,
};

/// 1-based column and row of a field cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    pub col: u32,
    pub row: u32,
}

impl GridCoord {
    pub fn name(self) -> Result<String, LayoutError> {
        name_of(self.col, self.row)
    }

    /// Same column, next row.
    pub fn is_directly_below(self, above: GridCoord) -> bool {
        self.col == above.col && self.row == above.row + 1
    }

    fn below(self) -> GridCoord {
        GridCoord {
            col: self.col,
            row: self.row + 1,
        }
    }

    fn above(self) -> Option<GridCoord> {
        (self.row > 1).then(|| GridCoord {
            col: self.col,
            row: self.row - 1,
        })
    }
}

/// Grid side that a resize applies to. Row 1 is fixed, so there is no top edge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Edge {
    Left,
    Right,
    Bottom,
}

impl Edge {
    pub fn parse(value: &str) -> Result<Self, LayoutError> {
        Edge::from_str(value).map_err(|_| LayoutError::UnknownEdge(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldCell {
    /// Database id; `None` until the cell has been persisted.
    pub id: Option<i32>,
    pub coord: GridCoord,
    pub name: String,
    pub kind: FieldKind,
    /// Number of vaults currently stored in the cell.
    pub items: u32,
}

impl FieldCell {
    pub fn new(coord: GridCoord) -> Result<Self, LayoutError> {
        Ok(Self {
            id: None,
            name: coord.name()?,
            coord,
            kind: FieldKind::Vault,
            items: 0,
        })
    }

    /// Rebuilds a persisted cell from its stored name.
    pub fn stored(id: i32, name: &str, kind: FieldKind, items: u32) -> Result<Self, LayoutError> {
        let (col, row) = parse_name(name)?;
        Ok(Self {
            id: Some(id),
            coord: GridCoord { col, row },
            name: name.to_string(),
            kind,
            items,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedCell {
    pub id: Option<i32>,
    pub from: String,
    pub to: String,
}

/// Everything a resize did, in the shape the persistence layer needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridChange {
    pub created: Vec<FieldCell>,
    pub renamed: Vec<RenamedCell>,
    pub removed: Vec<FieldCell>,
    /// Surviving couchbox halves whose partner was removed; now plain vault cells.
    pub retyped: Vec<FieldCell>,
    pub cols: u32,
    pub rows: u32,
}

impl GridChange {
    pub fn removed_ids(&self) -> Vec<i32> {
        self.removed.iter().filter_map(|cell| cell.id).collect()
    }
}

/// In-memory model of one warehouse's field grid.
///
/// `cols` and `rows` are the canonical dimensions. Every resize works on a
/// copy and only replaces `self` once it has fully succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGrid {
    cols: u32,
    rows: u32,
    cells: BTreeMap<GridCoord, FieldCell>,
}

impl FieldGrid {
    /// Builds a grid with one vault cell for every coordinate.
    pub fn generate(cols: u32, rows: u32) -> Result<Self, LayoutError> {
        let cols = checked_cols(0, cols)?;
        let mut grid = Self {
            cols,
            rows,
            cells: BTreeMap::new(),
        };
        grid.fill(1..=cols, 1..=rows)?;
        Ok(grid)
    }

    pub fn from_cells(
        cols: u32,
        rows: u32,
        cells: impl IntoIterator<Item = FieldCell>,
    ) -> Result<Self, LayoutError> {
        let cols = checked_cols(0, cols)?;
        Ok(Self {
            cols,
            rows,
            cells: cells.into_iter().map(|cell| (cell.coord, cell)).collect(),
        })
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Cells ordered column by column.
    pub fn cells(&self) -> impl Iterator<Item = &FieldCell> {
        self.cells.values()
    }

    pub fn cell(&self, name: &str) -> Option<&FieldCell> {
        let (col, row) = parse_name(name).ok()?;
        self.cells.get(&GridCoord { col, row })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn grow(&mut self, edge: Edge, count: u32) -> Result<GridChange, LayoutError> {
        if count == 0 {
            return Err(LayoutError::InvalidCount);
        }

        let mut next = self.clone();
        let mut change = GridChange::default();
        match edge {
            Edge::Left => {
                next.cols = checked_cols(self.cols, count)?;
                // checked_cols bounds count by MAX_COLUMNS
                change.renamed = next.shift_columns(count as i32)?;
                change.created = next.fill(1..=count, 1..=next.rows)?;
            }
            Edge::Right => {
                next.cols = checked_cols(self.cols, count)?;
                change.created = next.fill(self.cols + 1..=next.cols, 1..=next.rows)?;
            }
            Edge::Bottom => {
                next.rows = self
                    .rows
                    .checked_add(count)
                    .ok_or(LayoutError::RowOutOfRange(u32::MAX))?;
                change.created = next.fill(1..=next.cols, self.rows + 1..=next.rows)?;
            }
        }

        change.cols = next.cols;
        change.rows = next.rows;
        *self = next;
        Ok(change)
    }

    /// Removes the `count` outermost columns or rows on `edge`.
    ///
    /// All-or-nothing: if any targeted cell still holds items nothing is
    /// removed.
    pub fn shrink(&mut self, edge: Edge, count: u32) -> Result<GridChange, LayoutError> {
        if count == 0 {
            return Err(LayoutError::InvalidCount);
        }

        let (axis, available) = match edge {
            Edge::Left | Edge::Right => ("columns", self.cols),
            Edge::Bottom => ("rows", self.rows),
        };
        if count > available {
            return Err(LayoutError::ShrinkTooLarge {
                axis,
                requested: count,
                available,
            });
        }

        let (cols, rows) = (self.cols, self.rows);
        let targeted = move |coord: &GridCoord| match edge {
            Edge::Left => coord.col <= count,
            Edge::Right => coord.col > cols - count,
            Edge::Bottom => coord.row > rows - count,
        };

        let occupied: Vec<String> = self
            .cells
            .values()
            .filter(|cell| targeted(&cell.coord) && cell.items > 0)
            .map(|cell| cell.name.clone())
            .collect();
        if !occupied.is_empty() {
            return Err(LayoutError::OccupiedFields(occupied));
        }

        let mut next = self.clone();
        let mut change = GridChange::default();
        let doomed: Vec<GridCoord> = next.cells.keys().copied().filter(targeted).collect();
        for coord in doomed {
            if let Some(cell) = next.cells.remove(&coord) {
                change.removed.push(cell);
            }
        }

        match edge {
            Edge::Left => {
                next.cols -= count;
                change.renamed = next.shift_columns(-(count as i32))?;
            }
            Edge::Right => next.cols -= count,
            Edge::Bottom => next.rows -= count,
        }
        change.retyped = next.release_broken_couchboxes();

        change.cols = next.cols;
        change.rows = next.rows;
        *self = next;
        Ok(change)
    }

    fn fill(
        &mut self,
        cols: RangeInclusive<u32>,
        rows: RangeInclusive<u32>,
    ) -> Result<Vec<FieldCell>, LayoutError> {
        let mut created = Vec::new();
        for col in cols {
            for row in rows.clone() {
                let coord = GridCoord { col, row };
                if self.cells.contains_key(&coord) {
                    continue;
                }
                let cell = FieldCell::new(coord)?;
                self.cells.insert(coord, cell.clone());
                created.push(cell);
            }
        }
        Ok(created)
    }

    fn shift_columns(&mut self, delta: i32) -> Result<Vec<RenamedCell>, LayoutError> {
        let mut shifted = BTreeMap::new();
        let mut renamed = Vec::with_capacity(self.cells.len());

        for cell in self.cells.values() {
            let col = i64::from(cell.coord.col) + i64::from(delta);
            if col < 1 || col > i64::from(MAX_COLUMNS) {
                return Err(LayoutError::ColumnOutOfRange(col));
            }
            let coord = GridCoord {
                col: col as u32,
                row: cell.coord.row,
            };
            let name = coord.name()?;
            renamed.push(RenamedCell {
                id: cell.id,
                from: cell.name.clone(),
                to: name.clone(),
            });
            shifted.insert(
                coord,
                FieldCell {
                    coord,
                    name,
                    ..cell.clone()
                },
            );
        }

        self.cells = shifted;
        Ok(renamed)
    }

    fn release_broken_couchboxes(&mut self) -> Vec<FieldCell> {
        let broken: Vec<GridCoord> = self
            .cells
            .values()
            .filter(|cell| match cell.kind {
                FieldKind::CouchboxTop => !self.has_kind(cell.coord.below(), FieldKind::CouchboxBottom),
                FieldKind::CouchboxBottom => !cell
                    .coord
                    .above()
                    .is_some_and(|above| self.has_kind(above, FieldKind::CouchboxTop)),
                FieldKind::Vault => false,
            })
            .map(|cell| cell.coord)
            .collect();

        broken
            .into_iter()
            .filter_map(|coord| {
                let cell = self.cells.get_mut(&coord)?;
                cell.kind = FieldKind::Vault;
                Some(cell.clone())
            })
            .collect()
    }

    fn has_kind(&self, coord: GridCoord, kind: FieldKind) -> bool {
        self.cells.get(&coord).is_some_and(|cell| cell.kind == kind)
    }
}

fn checked_cols(cols: u32, count: u32) -> Result<u32, LayoutError> {
    let total = u64::from(cols) + u64::from(count);
    if total > u64::from(MAX_COLUMNS) {
        return Err(LayoutError::ColumnOutOfRange(total as i64));
    }
    Ok(total as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::collections::BTreeSet;

    fn names(grid: &FieldGrid) -> BTreeSet<String> {
        grid.cells().map(|cell| cell.name.clone()).collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// A persisted 2x2 grid with ids 1..=4 for A1, A2, B1, B2.
    fn stored_two_by_two() -> FieldGrid {
        let cells = ["A1", "A2", "B1", "B2"]
            .iter()
            .enumerate()
            .map(|(i, name)| FieldCell::stored(i as i32 + 1, name, FieldKind::Vault, 0).unwrap());
        FieldGrid::from_cells(2, 2, cells).unwrap()
    }

    #[test]
    fn generate_creates_every_cell() {
        let grid = FieldGrid::generate(3, 2).unwrap();
        assert_eq!(grid.len(), 6);
        assert_eq!(names(&grid), set(&["A1", "A2", "B1", "B2", "C1", "C2"]));
        assert!(grid.cells().all(|cell| cell.kind == FieldKind::Vault));
    }

    #[test]
    fn generate_rejects_more_than_26_columns() {
        assert_matches!(
            FieldGrid::generate(27, 1),
            Err(LayoutError::ColumnOutOfRange(27))
        );
    }

    #[rstest]
    #[case("left", Edge::Left)]
    #[case("right", Edge::Right)]
    #[case("bottom", Edge::Bottom)]
    fn parses_edges(#[case] raw: &str, #[case] expected: Edge) {
        assert_eq!(Edge::parse(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("top")]
    #[case("")]
    #[case("sideways")]
    fn unknown_edges_have_no_direction(#[case] raw: &str) {
        let err = Edge::parse(raw).unwrap_err();
        assert_eq!(err.to_string(), "direction not specified");
    }

    #[test]
    fn grow_left_shifts_existing_cells() {
        let mut grid = stored_two_by_two();
        let change = grid.grow(Edge::Left, 1).unwrap();

        assert_eq!((change.cols, change.rows), (3, 2));
        assert_eq!(names(&grid), set(&["A1", "A2", "B1", "B2", "C1", "C2"]));

        let created: BTreeSet<String> = change.created.iter().map(|c| c.name.clone()).collect();
        assert_eq!(created, set(&["A1", "A2"]));
        assert!(change.created.iter().all(|c| c.id.is_none()));

        assert!(change.renamed.contains(&RenamedCell {
            id: Some(1),
            from: "A1".into(),
            to: "B1".into(),
        }));
        assert!(change.renamed.contains(&RenamedCell {
            id: Some(4),
            from: "B2".into(),
            to: "C2".into(),
        }));
        assert_eq!(grid.cell("C2").and_then(|c| c.id), Some(4));
    }

    #[test]
    fn grow_right_appends_columns() {
        let mut grid = stored_two_by_two();
        let change = grid.grow(Edge::Right, 2).unwrap();

        assert!(change.renamed.is_empty());
        assert_eq!(change.created.len(), 4);
        assert_eq!(grid.cols(), 4);
        assert!(grid.cell("D2").is_some());
        assert_eq!(grid.cell("A1").and_then(|c| c.id), Some(1));
    }

    #[test]
    fn grow_bottom_appends_rows_in_every_column() {
        let mut grid = stored_two_by_two();
        let change = grid.grow(Edge::Bottom, 1).unwrap();

        let created: BTreeSet<String> = change.created.iter().map(|c| c.name.clone()).collect();
        assert_eq!(created, set(&["A3", "B3"]));
        assert_eq!((grid.cols(), grid.rows()), (2, 3));
    }

    #[test]
    fn growth_past_z_is_rejected_without_changes() {
        let mut grid = FieldGrid::generate(25, 1).unwrap();
        let before = grid.clone();

        assert_matches!(
            grid.grow(Edge::Right, 2),
            Err(LayoutError::ColumnOutOfRange(27))
        );
        assert_matches!(
            grid.grow(Edge::Left, 2),
            Err(LayoutError::ColumnOutOfRange(27))
        );
        assert_eq!(grid, before);
        assert!(grid.grow(Edge::Right, 1).is_ok());
    }

    #[test]
    fn zero_count_is_rejected() {
        let mut grid = stored_two_by_two();
        assert_matches!(grid.grow(Edge::Right, 0), Err(LayoutError::InvalidCount));
        assert_matches!(grid.shrink(Edge::Bottom, 0), Err(LayoutError::InvalidCount));
    }

    #[test]
    fn shrink_right_removes_highest_columns() {
        let mut grid = stored_two_by_two();
        let change = grid.shrink(Edge::Right, 1).unwrap();

        assert_eq!(change.removed_ids(), vec![3, 4]);
        assert!(change.renamed.is_empty());
        assert_eq!(names(&grid), set(&["A1", "A2"]));
    }

    #[test]
    fn shrink_left_removes_lowest_columns_and_renames_the_rest() {
        let mut grid = stored_two_by_two();
        let change = grid.shrink(Edge::Left, 1).unwrap();

        assert_eq!(change.removed_ids(), vec![1, 2]);
        assert_eq!(names(&grid), set(&["A1", "A2"]));
        assert_eq!(grid.cell("A1").and_then(|c| c.id), Some(3));
        assert!(change.renamed.contains(&RenamedCell {
            id: Some(4),
            from: "B2".into(),
            to: "A2".into(),
        }));
    }

    #[test]
    fn shrink_bottom_removes_highest_rows() {
        let mut grid = FieldGrid::generate(3, 3).unwrap();
        let change = grid.shrink(Edge::Bottom, 2).unwrap();

        assert_eq!(change.removed.len(), 6);
        assert_eq!(names(&grid), set(&["A1", "B1", "C1"]));
        assert_eq!(grid.rows(), 1);
    }

    #[test]
    fn shrinking_occupied_cells_changes_nothing() {
        let cells = vec![
            FieldCell::stored(1, "A1", FieldKind::Vault, 0).unwrap(),
            FieldCell::stored(2, "A2", FieldKind::Vault, 0).unwrap(),
            FieldCell::stored(3, "B1", FieldKind::Vault, 0).unwrap(),
            FieldCell::stored(4, "B2", FieldKind::Vault, 2).unwrap(),
        ];
        let mut grid = FieldGrid::from_cells(2, 2, cells).unwrap();
        let before = grid.clone();

        let err = grid.shrink(Edge::Right, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot delete fields while vaults are present in fields."
        );
        assert_matches!(err, LayoutError::OccupiedFields(ref occupied) if occupied == &vec!["B2".to_string()]);
        assert_eq!(grid, before);

        // The occupied cell is not on the left edge, so that shrink succeeds.
        assert!(grid.shrink(Edge::Left, 1).is_ok());
    }

    #[rstest]
    #[case(Edge::Left, 3)]
    #[case(Edge::Right, 3)]
    #[case(Edge::Bottom, 3)]
    fn shrinking_more_than_exists_is_rejected(#[case] edge: Edge, #[case] count: u32) {
        let mut grid = stored_two_by_two();
        assert_matches!(
            grid.shrink(edge, count),
            Err(LayoutError::ShrinkTooLarge { requested: 3, available: 2, .. })
        );
    }

    #[test]
    fn bottom_shrink_splits_couchbox_back_into_vaults() {
        let cells = vec![
            FieldCell::stored(1, "A1", FieldKind::Vault, 0).unwrap(),
            FieldCell::stored(2, "A2", FieldKind::CouchboxTop, 0).unwrap(),
            FieldCell::stored(3, "A3", FieldKind::CouchboxBottom, 0).unwrap(),
        ];
        let mut grid = FieldGrid::from_cells(1, 3, cells).unwrap();
        let change = grid.shrink(Edge::Bottom, 1).unwrap();

        assert_eq!(change.removed_ids(), vec![3]);
        assert_eq!(change.retyped.len(), 1);
        assert_eq!(change.retyped[0].id, Some(2));
        assert_eq!(grid.cell("A2").map(|c| c.kind), Some(FieldKind::Vault));
    }

    #[test]
    fn intact_couchboxes_survive_resizes() {
        let cells = vec![
            FieldCell::stored(1, "A1", FieldKind::CouchboxTop, 0).unwrap(),
            FieldCell::stored(2, "A2", FieldKind::CouchboxBottom, 0).unwrap(),
            FieldCell::stored(3, "B1", FieldKind::Vault, 0).unwrap(),
            FieldCell::stored(4, "B2", FieldKind::Vault, 0).unwrap(),
        ];
        let mut grid = FieldGrid::from_cells(2, 2, cells).unwrap();
        grid.grow(Edge::Left, 1).unwrap();
        let change = grid.shrink(Edge::Right, 1).unwrap();

        assert!(change.retyped.is_empty());
        assert_eq!(grid.cell("B1").map(|c| c.kind), Some(FieldKind::CouchboxTop));
        assert_eq!(grid.cell("B2").map(|c| c.kind), Some(FieldKind::CouchboxBottom));
    }

    fn edge_strategy() -> impl Strategy<Value = Edge> {
        prop_oneof![Just(Edge::Left), Just(Edge::Right), Just(Edge::Bottom)]
    }

    proptest! {
        #[test]
        fn grow_then_shrink_restores_names(
            cols in 1u32..=10,
            rows in 1u32..=10,
            count in 1u32..=10,
            edge in edge_strategy(),
        ) {
            let mut grid = FieldGrid::generate(cols, rows).unwrap();
            let original = names(&grid);

            grid.grow(edge, count).unwrap();
            grid.shrink(edge, count).unwrap();

            prop_assert_eq!(names(&grid), original);
            prop_assert_eq!((grid.cols(), grid.rows()), (cols, rows));
        }

        #[test]
        fn cell_count_tracks_dimensions(
            cols in 1u32..=12,
            rows in 1u32..=12,
            count in 1u32..=12,
            edge in edge_strategy(),
        ) {
            let mut grid = FieldGrid::generate(cols, rows).unwrap();
            if grid.grow(edge, count).is_ok() {
                prop_assert_eq!(grid.len() as u32, grid.cols() * grid.rows());
            }
            if grid.shrink(edge, count).is_ok() {
                prop_assert_eq!(grid.len() as u32, grid.cols() * grid.rows());
            }
        }

        #[test]
        fn failed_shrink_leaves_grid_untouched(
            cols in 1u32..=8,
            rows in 1u32..=8,
            occupied_col in 1u32..=8,
            occupied_row in 1u32..=8,
            count in 1u32..=8,
            edge in edge_strategy(),
        ) {
            prop_assume!(occupied_col <= cols && occupied_row <= rows);
            let cells = FieldGrid::generate(cols, rows).unwrap().cells().cloned().map(|mut cell| {
                if cell.coord == (GridCoord { col: occupied_col, row: occupied_row }) {
                    cell.items = 1;
                }
                cell
            }).collect::<Vec<_>>();
            let mut grid = FieldGrid::from_cells(cols, rows, cells).unwrap();
            let before = grid.clone();

            match grid.shrink(edge, count) {
                Ok(change) => prop_assert!(change.removed.iter().all(|cell| cell.items == 0)),
                Err(_) => prop_assert_eq!(grid, before),
            }
        }
    }
}
