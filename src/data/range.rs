use std::fmt;

use super::error::RangeError;
use super::sheet::Sheet;

// ---------------------------------------------------------------------------
// CellRange – a rectangle of 1-based (column, row) coordinates
// ---------------------------------------------------------------------------

/// Rectangular cell region. Always satisfies `first <= last` on both axes;
/// the only way to build one is [`make_range`] (or the checked constructor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub first_col: u32,
    pub first_row: u32,
    pub last_col: u32,
    pub last_row: u32,
}

impl CellRange {
    pub fn width(&self) -> u32 {
        self.last_col - self.first_col + 1
    }

    pub fn height(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        self.first_row..=self.last_row
    }
}

/// Spreadsheet notation, e.g. `B3:F12`.
impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            column_letter(self.first_col),
            self.first_row,
            column_letter(self.last_col),
            self.last_row
        )
    }
}

/// Column index (1-based) to its letter code: 1 → `A`, 27 → `AA`.
pub fn column_letter(col: u32) -> String {
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

// ---------------------------------------------------------------------------
// Range construction
// ---------------------------------------------------------------------------

/// Build a range from its top-left and bottom-right corners.
pub fn make_range(
    first_col: u32,
    first_row: u32,
    last_col: u32,
    last_row: u32,
) -> Result<CellRange, RangeError> {
    if first_col > last_col || first_row > last_row {
        return Err(RangeError::InvalidRange {
            first_col,
            first_row,
            last_col,
            last_row,
        });
    }
    Ok(CellRange {
        first_col,
        first_row,
        last_col,
        last_row,
    })
}

// ---------------------------------------------------------------------------
// Shrinking to the occupied block
// ---------------------------------------------------------------------------

/// Smallest range inside `range` that still holds every non-empty cell.
///
/// The request is first clamped to the sheet's own bounds, so asking for
/// more than the sheet holds is fine. Returns:
/// * `Err(OutOfBounds)` – the clamped request is empty (no overlap at all)
/// * `Ok(None)` – the overlap exists but every cell in it is empty
/// * `Ok(Some(r))` – the bounding box of the non-empty cells
///
/// Leading and trailing empty rows are trimmed; an empty row strictly inside
/// the block is kept and does not influence the column bounds.
pub fn shrink_to_occupied(sheet: &Sheet, range: CellRange) -> Result<Option<CellRange>, RangeError> {
    let Some(bounds) = sheet.bounds() else {
        return Err(RangeError::OutOfBounds { requested: range });
    };

    let first_col = range.first_col.max(bounds.first_col);
    let first_row = range.first_row.max(bounds.first_row);
    let last_col = range.last_col.min(bounds.last_col);
    let last_row = range.last_row.min(bounds.last_row);
    if first_col > last_col || first_row > last_row {
        return Err(RangeError::OutOfBounds { requested: range });
    }

    let Some(top) = (first_row..=last_row).find(|&r| !sheet.row_is_empty(r, first_col, last_col))
    else {
        return Ok(None);
    };
    let bottom = (top..=last_row)
        .rev()
        .find(|&r| !sheet.row_is_empty(r, first_col, last_col))
        .unwrap_or(top);

    let mut cols: Option<(u32, u32)> = None;
    for row in top..=bottom {
        match sheet.occupied_span(row, first_col, last_col) {
            Some((lo, hi)) => {
                cols = Some(match cols {
                    Some((a, b)) => (a.min(lo), b.max(hi)),
                    None => (lo, hi),
                });
            }
            None => {
                // Keeps the bounds found so far; a gap row is not a block edge.
                log::warn!(
                    "sheet '{}': empty row {row} inside the data block",
                    sheet.name()
                );
            }
        }
    }
    let (left, right) = cols.unwrap_or((first_col, last_col));

    make_range(left, top, right, bottom).map(Some)
}
