use super::error::SheetError;
use super::model::{parse_number, Column, ColumnData, RowId, Table, VariableId};
use super::range::{make_range, shrink_to_occupied, CellRange};
use super::sheet::{Cell, Sheet};

// ---------------------------------------------------------------------------
// Sheet layout
// ---------------------------------------------------------------------------
//
//   Run 12  operator: J. Doe        <- optional comment block
//   bench B                         <-
//                                   <- blank separator row
//   thrust   N     10.2  11.0  9.8  <- one row per variable:
//   regime   rpm   1200  1500  900  <-   name | unit | one column per point
//   fuel     -     A     A     B    <-
//

/// Table built from one sheet plus the text of its comment block.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSheet {
    pub table: Table,
    pub comment: Option<String>,
}

/// Turn one worksheet into a table.
///
/// Rows of the sheet are variables and columns are sample points, so the
/// block is transposed: each point column becomes a table row keyed by
/// `(sheet name, point index)`.
pub fn extract(sheet: &Sheet) -> Result<ExtractedSheet, SheetError> {
    let name = sheet.name();
    let Some(extent) = sheet.bounds() else {
        return Err(SheetError::malformed(name, "sheet is empty"));
    };
    let used = shrink(sheet, extent)?
        .ok_or_else(|| SheetError::malformed(name, "no non-empty cell"))?;

    let (comment, data_start) = split_comment(sheet, used);

    let data_request = make_range(used.first_col, data_start, used.last_col, used.last_row)
        .map_err(|source| range_error(name, source))?;
    let block = shrink(sheet, data_request)?
        .ok_or_else(|| SheetError::malformed(name, "no data block below the comment"))?;

    if block.width() < 3 {
        return Err(SheetError::malformed(
            name,
            format!("data block {block} needs name, unit and at least one point column"),
        ));
    }

    let name_col = block.first_col;
    let unit_col = block.first_col + 1;
    let point_cols: Vec<u32> = (block.first_col + 2..=block.last_col).collect();

    let mut columns = Vec::with_capacity(block.height() as usize);
    for row in block.rows() {
        if sheet.row_is_empty(row, block.first_col, block.last_col) {
            log::warn!("sheet '{name}': skipping empty row {row} inside the data block");
            continue;
        }
        let var_name = match sheet.cell(name_col, row) {
            Cell::Empty => {
                return Err(SheetError::malformed(
                    name,
                    format!("row {row} has values but no variable name"),
                ))
            }
            cell => cell.to_string(),
        };
        let unit = sheet.cell(unit_col, row).to_string();
        let cells: Vec<&Cell> = point_cols.iter().map(|&c| sheet.cell(c, row)).collect();
        columns.push(Column {
            id: VariableId::new(var_name, unit),
            data: coerce_column(&cells),
        });
    }

    let rows: Vec<RowId> = (1..=point_cols.len() as u32)
        .map(|point| RowId::new(name, point))
        .collect();

    let table = Table::new(rows, columns).map_err(|e| SheetError::malformed(name, e.to_string()))?;

    log::debug!(
        "sheet '{name}': data block {block}, {} variables, {} points, comment: {}",
        table.columns().len(),
        table.len(),
        comment.is_some()
    );

    Ok(ExtractedSheet { table, comment })
}

fn shrink(sheet: &Sheet, range: CellRange) -> Result<Option<CellRange>, SheetError> {
    shrink_to_occupied(sheet, range).map_err(|source| range_error(sheet.name(), source))
}

fn range_error(sheet: &str, source: super::error::RangeError) -> SheetError {
    SheetError::Range {
        sheet: sheet.to_string(),
        source,
    }
}

/// Find the first blank row of `used`. Rows above it are the comment, the
/// first non-empty row below it starts the data. Without a blank row there
/// is no comment and data starts at the top.
fn split_comment(sheet: &Sheet, used: CellRange) -> (Option<String>, u32) {
    let is_blank = |row: u32| sheet.row_is_empty(row, used.first_col, used.last_col);

    let Some(separator) = used.rows().find(|&r| is_blank(r)) else {
        return (None, used.first_row);
    };
    // The last row of `used` is never blank, so a data row always follows.
    let data_start = (separator..=used.last_row)
        .find(|&r| !is_blank(r))
        .unwrap_or(used.last_row);

    let lines: Vec<String> = (used.first_row..separator)
        .map(|row| {
            sheet
                .row_cells(row, used.first_col, used.last_col)
                .filter(|c| !c.is_empty())
                .map(Cell::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect();

    let comment = if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    };
    (comment, data_start)
}

/// Numeric when every non-empty cell is a number or numeric text.
fn coerce_column(cells: &[&Cell]) -> ColumnData {
    let numbers: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            Cell::Empty => Some(None),
            Cell::Number(v) => Some(Some(*v)),
            Cell::Text(s) => parse_number(s).map(Some),
        })
        .collect();

    match numbers {
        Some(values) => ColumnData::Number(values),
        None => ColumnData::Text(
            cells
                .iter()
                .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                .collect(),
        ),
    }
}
