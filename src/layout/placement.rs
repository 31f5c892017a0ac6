//! Rack placement checks against the warehouse floor and the field grid.
//!
//! All boxes are axis-aligned with their origin at the top-left corner. A box
//! covers `[x, x + width)` horizontally and `[y, y + length)` vertically, so
//! two boxes that only share an edge do not overlap.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    /// Rotated a quarter turn: width and length trade places on the floor.
    Horizontal,
}

/// Floor area taken by an axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub origin: Point,
    pub width: f64,
    pub length: f64,
}

impl Footprint {
    pub fn new(origin: Point, width: f64, length: f64) -> Self {
        Self {
            origin,
            width,
            length,
        }
    }

    /// Footprint of a rack given its nominal dimensions and orientation.
    pub fn oriented(origin: Point, width: f64, length: f64, orientation: Orientation) -> Self {
        match orientation {
            Orientation::Vertical => Self::new(origin, width, length),
            Orientation::Horizontal => Self::new(origin, length, width),
        }
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.length
    }

    /// A box with no area covers nothing.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.length > 0.0)
    }

    pub fn overlaps(&self, other: &Footprint) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }
        self.origin.x < other.right()
            && other.origin.x < self.right()
            && self.origin.y < other.bottom()
            && other.origin.y < self.bottom()
    }
}

/// The warehouse floor, spanning `[0, width] x [0, length]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarehouseArea {
    pub width: f64,
    pub length: f64,
}

impl WarehouseArea {
    pub fn contains(&self, footprint: &Footprint) -> bool {
        let Footprint {
            origin,
            width,
            length,
        } = *footprint;
        origin.x >= 0.0
            && origin.x <= self.width - width
            && origin.y >= 0.0
            && origin.y <= self.length - length
    }
}

/// Where the field grid sits on the floor.
///
/// Column and row counts stand in for the grid's width and length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldGridArea {
    pub origin: Point,
    pub cols: u32,
    pub rows: u32,
}

impl FieldGridArea {
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.origin, f64::from(self.cols), f64::from(self.rows))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementCheck {
    pub within_bounds: bool,
    pub overlaps_field_grid: bool,
}

impl PlacementCheck {
    pub fn is_admissible(&self) -> bool {
        self.within_bounds && !self.overlaps_field_grid
    }
}

pub fn check_placement(
    warehouse: &WarehouseArea,
    grid: &FieldGridArea,
    rack: &Footprint,
) -> PlacementCheck {
    PlacementCheck {
        within_bounds: warehouse.contains(rack),
        overlaps_field_grid: rack.overlaps(&grid.footprint()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn floor(width: f64, length: f64) -> WarehouseArea {
        WarehouseArea { width, length }
    }

    fn grid_at(x: f64, y: f64, cols: u32, rows: u32) -> FieldGridArea {
        FieldGridArea {
            origin: Point::new(x, y),
            cols,
            rows,
        }
    }

    fn rack(x: f64, y: f64, width: f64, length: f64) -> Footprint {
        Footprint::new(Point::new(x, y), width, length)
    }

    #[test]
    fn rack_clear_of_grid_is_admissible() {
        let check = check_placement(
            &floor(20.0, 20.0),
            &grid_at(15.0, 15.0, 5, 5),
            &rack(0.0, 0.0, 10.0, 10.0),
        );
        assert!(check.within_bounds);
        assert!(!check.overlaps_field_grid);
        assert!(check.is_admissible());
    }

    #[test]
    fn rack_past_the_far_wall_is_out_of_bounds() {
        let check = check_placement(
            &floor(20.0, 20.0),
            &grid_at(15.0, 15.0, 5, 5),
            &rack(18.0, 18.0, 10.0, 10.0),
        );
        assert!(!check.within_bounds);
        assert!(!check.is_admissible());
    }

    #[test]
    fn rack_on_top_of_grid_overlaps() {
        let check = check_placement(
            &floor(30.0, 30.0),
            &grid_at(15.0, 15.0, 5, 5),
            &rack(12.0, 12.0, 5.0, 5.0),
        );
        assert!(check.within_bounds);
        assert!(check.overlaps_field_grid);
        assert!(!check.is_admissible());
    }

    #[rstest]
    #[case(10.0, 15.0)] // rack's right edge on the grid's left edge
    #[case(15.0, 10.0)] // rack's bottom edge on the grid's top edge
    #[case(20.0, 15.0)] // rack starts on the grid's right edge
    #[case(15.0, 20.0)] // rack starts on the grid's bottom edge
    fn touching_edges_do_not_overlap(#[case] x: f64, #[case] y: f64) {
        let check = check_placement(
            &floor(40.0, 40.0),
            &grid_at(15.0, 15.0, 5, 5),
            &rack(x, y, 5.0, 5.0),
        );
        assert!(!check.overlaps_field_grid, "rack at ({x}, {y})");
    }

    #[rstest]
    #[case(-0.5, 0.0)]
    #[case(0.0, -1.0)]
    #[case(10.5, 0.0)]
    #[case(0.0, 10.5)]
    fn negative_or_protruding_positions_are_out_of_bounds(#[case] x: f64, #[case] y: f64) {
        assert!(!floor(20.0, 20.0).contains(&rack(x, y, 10.0, 10.0)));
    }

    #[test]
    fn rack_flush_with_far_corner_fits() {
        assert!(floor(20.0, 20.0).contains(&rack(10.0, 10.0, 10.0, 10.0)));
        assert!(floor(20.0, 20.0).contains(&rack(20.0, 20.0, 0.0, 0.0)));
    }

    #[test]
    fn horizontal_racks_swap_width_and_length() {
        let footprint = Footprint::oriented(Point::new(0.0, 0.0), 4.0, 12.0, Orientation::Horizontal);
        assert_eq!((footprint.width, footprint.length), (12.0, 4.0));

        // Fits lying down in a long, shallow warehouse but not standing up.
        let hall = floor(15.0, 5.0);
        assert!(hall.contains(&footprint));
        assert!(!hall.contains(&Footprint::oriented(
            Point::new(0.0, 0.0),
            4.0,
            12.0,
            Orientation::Vertical
        )));
    }

    #[test]
    fn empty_grid_never_overlaps() {
        let check = check_placement(
            &floor(20.0, 20.0),
            &grid_at(5.0, 5.0, 0, 4),
            &rack(0.0, 0.0, 10.0, 10.0),
        );
        assert!(check.is_admissible());
    }

    #[test]
    fn nan_positions_are_rejected() {
        assert!(!floor(20.0, 20.0).contains(&rack(f64::NAN, 0.0, 1.0, 1.0)));
    }

    fn footprint_strategy() -> impl Strategy<Value = Footprint> {
        (-50.0..50.0f64, -50.0..50.0f64, 0.0..30.0f64, 0.0..30.0f64)
            .prop_map(|(x, y, w, l)| rack(x, y, w, l))
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in footprint_strategy(), b in footprint_strategy()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn admissible_racks_stay_on_the_floor(
            a in footprint_strategy(),
            cols in 0u32..10,
            rows in 0u32..10,
        ) {
            let warehouse = floor(40.0, 40.0);
            let grid = grid_at(10.0, 10.0, cols, rows);
            let check = check_placement(&warehouse, &grid, &a);
            if check.is_admissible() {
                prop_assert!(a.origin.x >= 0.0 && a.right() <= 40.0 + 1e-9);
                prop_assert!(a.origin.y >= 0.0 && a.bottom() <= 40.0 + 1e-9);
            }
        }
    }
}
