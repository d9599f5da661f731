//! Parcel identifiers: `tile-<ROW><COL>.png`.
//!
//! Rows are spreadsheet-style letters (`A`=0 … `Z`=25, `AA`=26, …), columns
//! are 1-based decimal numbers. Parsing is case-insensitive; formatting always
//! emits upper case, so `parse(format(g)) == g` for every slot.
use crate::types::GridCoordinate;

const PREFIX: &str = "tile-";
const EXTENSION: &str = ".png";

/// Spreadsheet-style label for a 0-based index (`0 -> "A"`, `26 -> "AA"`).
pub fn letters_of_index(index: u32) -> String {
    let mut n = u64::from(index) + 1;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Inverse of [`letters_of_index`]; `None` for empty, non-alphabetic or
/// overflowing input.
pub fn index_of_letters(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut acc: u64 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = u64::from(c.to_ascii_uppercase() as u8 - b'A' + 1);
        acc = acc.checked_mul(26)?.checked_add(digit)?;
        if acc > u64::from(u32::MAX) {
            return None;
        }
    }
    u32::try_from(acc - 1).ok()
}

/// Human-facing label such as `H4` or `AL38`.
pub fn parcel_label(grid: GridCoordinate) -> String {
    format!("{}{}", letters_of_index(grid.row), u64::from(grid.col) + 1)
}

/// File name the upload process uses for `grid`.
pub fn parcel_file_name(grid: GridCoordinate) -> String {
    format!("{PREFIX}{}{EXTENSION}", parcel_label(grid))
}

/// Parse a parcel file name into its slot.
pub fn parse_parcel_file_name(name: &str) -> Option<GridCoordinate> {
    let lower = name.to_ascii_lowercase();
    if !lower.starts_with(PREFIX) || !lower.ends_with(EXTENSION) {
        return None;
    }
    let label = name.get(PREFIX.len()..name.len() - EXTENSION.len())?;
    parse_parcel_label(label)
}

/// Parse a label such as `h4` into its slot.
pub fn parse_parcel_label(label: &str) -> Option<GridCoordinate> {
    let split = label.find(|c: char| !c.is_ascii_alphabetic())?;
    let (letters, digits) = label.split_at(split);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let row = index_of_letters(letters)?;
    let col = digits.parse::<u32>().ok()?.checked_sub(1)?;
    Some(GridCoordinate::new(row, col))
}
