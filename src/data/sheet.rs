use std::fmt;

use calamine::Data;

use super::range::CellRange;

// ---------------------------------------------------------------------------
// Cell – one worksheet cell, formulas already resolved to cached values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Convert a calamine cell. Booleans, ISO dates and error codes become
    /// text; Excel date-times keep their serial number.
    pub fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) if s.is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Text(e.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

/// Integral numbers print without a fractional part (`3`, not `3.0`).
pub(crate) fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(v) => f.write_str(&format_number(*v)),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Sheet – dense grid anchored at its first occupied cell
// ---------------------------------------------------------------------------

/// A worksheet held in memory. `rows` starts at (`origin_col`, `origin_row`)
/// and every row has the same width; anything outside the grid is empty.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    origin_col: u32,
    origin_row: u32,
    width: u32,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Grid whose top-left cell is `A1`.
    pub fn from_rows(name: &str, rows: Vec<Vec<Cell>>) -> Self {
        Self::with_origin(name, 1, 1, rows)
    }

    /// Grid whose top-left cell sits at (`origin_col`, `origin_row`), 1-based.
    pub fn with_origin(name: &str, origin_col: u32, origin_row: u32, mut rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Sheet {
            name: name.to_string(),
            origin_col: origin_col.max(1),
            origin_row: origin_row.max(1),
            width: width as u32,
            rows,
        }
    }

    /// Copy a calamine worksheet range into a grid.
    pub fn from_calamine(name: &str, range: &calamine::Range<Data>) -> Self {
        let Some((row0, col0)) = range.start() else {
            return Self::from_rows(name, Vec::new());
        };
        let rows = range
            .rows()
            .map(|row| row.iter().map(Cell::from_data).collect())
            .collect();
        Self::with_origin(name, col0 + 1, row0 + 1, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extent of the stored grid, whether or not its cells hold values.
    /// `None` for a sheet without any cell.
    pub fn bounds(&self) -> Option<CellRange> {
        if self.rows.is_empty() || self.width == 0 {
            return None;
        }
        Some(CellRange {
            first_col: self.origin_col,
            first_row: self.origin_row,
            last_col: self.origin_col + self.width - 1,
            last_row: self.origin_row + self.rows.len() as u32 - 1,
        })
    }

    pub fn cell(&self, col: u32, row: u32) -> &Cell {
        if col < self.origin_col || row < self.origin_row {
            return &EMPTY;
        }
        self.rows
            .get((row - self.origin_row) as usize)
            .and_then(|r| r.get((col - self.origin_col) as usize))
            .unwrap_or(&EMPTY)
    }

    /// Cells of `row` between `first_col` and `last_col` inclusive.
    pub fn row_cells(&self, row: u32, first_col: u32, last_col: u32) -> impl Iterator<Item = &Cell> + '_ {
        (first_col..=last_col).map(move |col| self.cell(col, row))
    }

    pub fn row_is_empty(&self, row: u32, first_col: u32, last_col: u32) -> bool {
        self.row_cells(row, first_col, last_col).all(Cell::is_empty)
    }

    /// First and last non-empty column of `row` within the column window.
    pub fn occupied_span(&self, row: u32, first_col: u32, last_col: u32) -> Option<(u32, u32)> {
        let lo = (first_col..=last_col).find(|&c| !self.cell(c, row).is_empty())?;
        let hi = (lo..=last_col)
            .rev()
            .find(|&c| !self.cell(c, row).is_empty())
            .unwrap_or(lo);
        Some((lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_padded() {
        let sheet = Sheet::from_rows(
            "s",
            vec![vec![Cell::from("a")], vec![Cell::from(1.0), Cell::from(2.0), Cell::from(3.0)]],
        );
        let b = sheet.bounds().unwrap();
        assert_eq!((b.first_col, b.first_row, b.last_col, b.last_row), (1, 1, 3, 2));
        assert!(sheet.cell(3, 1).is_empty());
        assert_eq!(sheet.cell(3, 2), &Cell::Number(3.0));
    }

    #[test]
    fn cells_outside_grid_are_empty() {
        let sheet = Sheet::with_origin("s", 3, 2, vec![vec![Cell::from("x")]]);
        assert_eq!(sheet.cell(3, 2), &Cell::Text("x".into()));
        assert!(sheet.cell(1, 1).is_empty());
        assert!(sheet.cell(4, 2).is_empty());
        assert!(sheet.cell(3, 9).is_empty());
    }

    #[test]
    fn occupied_span_within_window() {
        let sheet = Sheet::from_rows(
            "s",
            vec![vec![Cell::Empty, Cell::from("a"), Cell::Empty, Cell::from(1.0), Cell::Empty]],
        );
        assert_eq!(sheet.occupied_span(1, 1, 5), Some((2, 4)));
        assert_eq!(sheet.occupied_span(1, 3, 3), None);
        assert!(sheet.row_is_empty(1, 5, 5));
    }

    #[test]
    fn calamine_values_convert() {
        assert_eq!(Cell::from_data(&Data::Int(4)), Cell::Number(4.0));
        assert_eq!(Cell::from_data(&Data::Bool(true)), Cell::Text("true".into()));
        assert_eq!(Cell::from_data(&Data::String(String::new())), Cell::Empty);
        assert_eq!(Cell::from_data(&Data::Empty), Cell::Empty);
    }

    #[test]
    fn number_display() {
        assert_eq!(Cell::Number(3.0).to_string(), "3");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::Number(-7.0).to_string(), "-7");
    }
}
