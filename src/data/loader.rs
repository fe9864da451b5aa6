use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Reader};

use super::error::LoadError;
use super::extract::extract;
use super::model::Table;
use super::sheet::Sheet;

// ---------------------------------------------------------------------------
// Workbook – every sheet stacked into one table
// ---------------------------------------------------------------------------

/// Per-sheet facts kept next to the combined table.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSummary {
    pub name: String,
    pub points: usize,
    pub comment: Option<String>,
}

/// The result of a successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub table: Table,
    /// In file order.
    pub sheets: Vec<SheetSummary>,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a workbook from disk. The whole file is read before parsing.
///
/// Supported formats are whatever calamine opens: `.xlsx`, `.xlsm`,
/// `.xlsb`, `.xls` and `.ods`.
pub fn load_path(path: &Path) -> Result<Workbook, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let workbook = load_bytes(bytes)?;
    log::info!(
        "Loaded {} with {} sheets, {} points, {} variables",
        path.display(),
        workbook.sheets.len(),
        workbook.table.len(),
        workbook.table.columns().len()
    );
    Ok(workbook)
}

/// Load a workbook already held in memory (e.g. an upload).
pub fn load_bytes(bytes: Vec<u8>) -> Result<Workbook, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadError::Workbook(e.to_string()))?;

    let names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in &names {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| LoadError::Workbook(format!("sheet '{name}': {e}")))?;
        sheets.push(Sheet::from_calamine(name, &range));
    }

    load_sheets(&sheets)
}

/// Extract every sheet in order and stack the results. The first sheet
/// that fails aborts the whole load.
pub fn load_sheets(sheets: &[Sheet]) -> Result<Workbook, LoadError> {
    if sheets.is_empty() {
        return Err(LoadError::NoSheets);
    }

    let mut tables = Vec::with_capacity(sheets.len());
    let mut summaries = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let extracted = extract(sheet)?;
        summaries.push(SheetSummary {
            name: sheet.name().to_string(),
            points: extracted.table.len(),
            comment: extracted.comment,
        });
        tables.push(extracted.table);
    }

    let table = Table::concat(&tables)?;
    Ok(Workbook {
        table,
        sheets: summaries,
    })
}
