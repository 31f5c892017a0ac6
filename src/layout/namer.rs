//! Spreadsheet-style names for field grid cells ("A1", "C12").

use super::LayoutError;

/// Columns are single letters, so a grid is at most A..Z wide.
pub const MAX_COLUMNS: u32 = 26;

fn column_letter(col: u32) -> Result<char, LayoutError> {
    if !(1..=MAX_COLUMNS).contains(&col) {
        return Err(LayoutError::ColumnOutOfRange(i64::from(col)));
    }
    // col - 1 is in 0..26, so the cast cannot truncate
    Ok(char::from(b'A' + (col - 1) as u8))
}

/// Name of the cell at a 1-based column and row.
pub fn name_of(col: u32, row: u32) -> Result<String, LayoutError> {
    let letter = column_letter(col)?;
    if row == 0 {
        return Err(LayoutError::RowOutOfRange(row));
    }
    Ok(format!("{letter}{row}"))
}

/// Reverse of [`name_of`]: `"C12"` becomes `(3, 12)`.
pub fn parse_name(name: &str) -> Result<(u32, u32), LayoutError> {
    let malformed = || LayoutError::MalformedName(name.to_string());

    let mut chars = name.chars();
    let letter = chars.next().ok_or_else(malformed)?;
    if !letter.is_ascii_uppercase() {
        return Err(malformed());
    }

    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let row: u32 = digits.parse().map_err(|_| malformed())?;
    if row == 0 {
        return Err(LayoutError::RowOutOfRange(row));
    }

    Ok((u32::from(letter) - u32::from('A') + 1, row))
}

/// Moves the column letter of `name` by `delta`, keeping the row.
pub fn shift_column_letter(name: &str, delta: i32) -> Result<String, LayoutError> {
    let (col, row) = parse_name(name)?;
    let shifted = i64::from(col) + i64::from(delta);
    if shifted < 1 || shifted > i64::from(MAX_COLUMNS) {
        return Err(LayoutError::ColumnOutOfRange(shifted));
    }
    name_of(shifted as u32, row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 1, "A1")]
    #[case(2, 1, "B1")]
    #[case(3, 12, "C12")]
    #[case(26, 99, "Z99")]
    fn names_cells(#[case] col: u32, #[case] row: u32, #[case] expected: &str) {
        assert_eq!(name_of(col, row).unwrap(), expected);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(27, 1)]
    fn rejects_columns_outside_alphabet(#[case] col: u32, #[case] row: u32) {
        assert_matches!(name_of(col, row), Err(LayoutError::ColumnOutOfRange(_)));
    }

    #[test]
    fn rejects_row_zero() {
        assert_matches!(name_of(1, 0), Err(LayoutError::RowOutOfRange(0)));
    }

    #[rstest]
    #[case("")]
    #[case("1A")]
    #[case("a1")]
    #[case("A")]
    #[case("AA1")]
    #[case("A1x")]
    fn rejects_malformed_names(#[case] name: &str) {
        assert_matches!(parse_name(name), Err(LayoutError::MalformedName(_)));
    }

    #[test]
    fn parses_multi_digit_rows() {
        assert_eq!(parse_name("C12").unwrap(), (3, 12));
    }

    #[rstest]
    #[case("A1", 1, "B1")]
    #[case("C4", -2, "A4")]
    #[case("Y7", 1, "Z7")]
    #[case("B2", 0, "B2")]
    fn shifts_column_letters(#[case] name: &str, #[case] delta: i32, #[case] expected: &str) {
        assert_eq!(shift_column_letter(name, delta).unwrap(), expected);
    }

    #[test]
    fn shift_out_of_alphabet_is_rejected() {
        assert_matches!(
            shift_column_letter("A1", -1),
            Err(LayoutError::ColumnOutOfRange(0))
        );
        assert_matches!(
            shift_column_letter("Z1", 1),
            Err(LayoutError::ColumnOutOfRange(27))
        );
    }

    proptest! {
        #[test]
        fn parse_inverts_name_of(col in 1u32..=26, row in 1u32..10_000) {
            let name = name_of(col, row).unwrap();
            prop_assert_eq!(parse_name(&name).unwrap(), (col, row));
        }

        #[test]
        fn shifting_there_and_back_is_identity(col in 1u32..=26, row in 1u32..100, delta in -25i32..=25) {
            let name = name_of(col, row).unwrap();
            let target = i64::from(col) + i64::from(delta);
            prop_assume!((1..=26).contains(&target));
            let shifted = shift_column_letter(&name, delta).unwrap();
            prop_assert_eq!(shift_column_letter(&shifted, -delta).unwrap(), name);
        }
    }
}
