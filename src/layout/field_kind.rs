use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::{grid::GridCoord, LayoutError};

/// What a field cell is currently used as.
///
/// A couchbox spans two vertically adjacent cells: the top half is
/// `couchbox-T` and the cell directly below it is `couchbox-B`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
pub enum FieldKind {
    #[default]
    #[serde(rename = "vault")]
    #[strum(serialize = "vault")]
    Vault,
    #[serde(rename = "couchbox-T")]
    #[strum(serialize = "couchbox-T")]
    CouchboxTop,
    #[serde(rename = "couchbox-B")]
    #[strum(serialize = "couchbox-B")]
    CouchboxBottom,
}

impl FieldKind {
    /// Whether vaults may be stored directly in a cell of this kind.
    ///
    /// A couchbox holds everything in its top half, and that half keeps the
    /// single per-field capacity; the pair is not given double capacity.
    pub fn accepts_vaults(self) -> bool {
        !matches!(self, FieldKind::CouchboxBottom)
    }
}

/// One half of a pair passed to [`toggle_pair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairCell {
    pub coord: GridCoord,
    pub kind: FieldKind,
    pub items: u32,
}

/// Flips a vertical pair between two vault cells and one couchbox.
///
/// Returns the new kinds for `(top, bottom)`. Occupancy is checked first, then
/// adjacency, then the source states.
pub fn toggle_pair(top: PairCell, bottom: PairCell) -> Result<(FieldKind, FieldKind), LayoutError> {
    if top.items > 0 || bottom.items > 0 {
        return Err(LayoutError::PairOccupied);
    }
    if !bottom.coord.is_directly_below(top.coord) {
        return Err(LayoutError::InvalidTypeChange);
    }

    match (top.kind, bottom.kind) {
        (FieldKind::Vault, FieldKind::Vault) => {
            Ok((FieldKind::CouchboxTop, FieldKind::CouchboxBottom))
        }
        (FieldKind::CouchboxTop, FieldKind::CouchboxBottom) => {
            Ok((FieldKind::Vault, FieldKind::Vault))
        }
        _ => Err(LayoutError::InvalidTypeChange),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use std::str::FromStr;

    fn cell(col: u32, row: u32, kind: FieldKind, items: u32) -> PairCell {
        PairCell {
            coord: GridCoord { col, row },
            kind,
            items,
        }
    }

    #[test]
    fn vault_pair_becomes_couchbox() {
        let result = toggle_pair(
            cell(1, 1, FieldKind::Vault, 0),
            cell(1, 2, FieldKind::Vault, 0),
        );
        assert_eq!(
            result.unwrap(),
            (FieldKind::CouchboxTop, FieldKind::CouchboxBottom)
        );
    }

    #[test]
    fn couchbox_reverts_to_vaults() {
        let result = toggle_pair(
            cell(3, 4, FieldKind::CouchboxTop, 0),
            cell(3, 5, FieldKind::CouchboxBottom, 0),
        );
        assert_eq!(result.unwrap(), (FieldKind::Vault, FieldKind::Vault));
    }

    #[test]
    fn toggling_twice_restores_original_kinds() {
        let (top, bottom) = toggle_pair(
            cell(2, 1, FieldKind::Vault, 0),
            cell(2, 2, FieldKind::Vault, 0),
        )
        .unwrap();
        let restored = toggle_pair(cell(2, 1, top, 0), cell(2, 2, bottom, 0)).unwrap();
        assert_eq!(restored, (FieldKind::Vault, FieldKind::Vault));
    }

    #[rstest]
    #[case(1, 0)]
    #[case(0, 2)]
    #[case(3, 3)]
    fn occupied_pair_is_rejected(#[case] top_items: u32, #[case] bottom_items: u32) {
        let result = toggle_pair(
            cell(1, 1, FieldKind::Vault, top_items),
            cell(1, 2, FieldKind::Vault, bottom_items),
        );
        assert_matches!(result, Err(LayoutError::PairOccupied));
    }

    #[test]
    fn occupancy_is_reported_before_an_invalid_state() {
        let result = toggle_pair(
            cell(1, 1, FieldKind::CouchboxBottom, 1),
            cell(1, 2, FieldKind::Vault, 0),
        );
        assert_matches!(result, Err(LayoutError::PairOccupied));
    }

    #[rstest]
    #[case(FieldKind::Vault, FieldKind::CouchboxBottom)]
    #[case(FieldKind::CouchboxTop, FieldKind::Vault)]
    #[case(FieldKind::CouchboxBottom, FieldKind::CouchboxTop)]
    #[case(FieldKind::CouchboxTop, FieldKind::CouchboxTop)]
    fn mixed_states_are_invalid(#[case] top: FieldKind, #[case] bottom: FieldKind) {
        let result = toggle_pair(cell(1, 1, top, 0), cell(1, 2, bottom, 0));
        assert_matches!(result, Err(LayoutError::InvalidTypeChange));
    }

    #[rstest]
    #[case(2, 2)]
    #[case(1, 3)]
    #[case(1, 1)]
    fn partner_must_be_directly_below(#[case] col: u32, #[case] row: u32) {
        let result = toggle_pair(
            cell(1, 2, FieldKind::Vault, 0),
            cell(col, row, FieldKind::Vault, 0),
        );
        assert_matches!(result, Err(LayoutError::InvalidTypeChange));
    }

    #[test]
    fn kinds_use_wire_names() {
        assert_eq!(FieldKind::CouchboxTop.to_string(), "couchbox-T");
        assert_eq!(
            FieldKind::from_str("couchbox-B").unwrap(),
            FieldKind::CouchboxBottom
        );
        assert_eq!(
            serde_json::to_string(&FieldKind::Vault).unwrap(),
            "\"vault\""
        );
        assert!(!FieldKind::CouchboxBottom.accepts_vaults());
    }
}
