//! Error types for workbook ingestion and subset filtering.

use std::path::PathBuf;

use thiserror::Error;

use super::model::{RowId, VariableId};
use super::range::CellRange;

/// Failures of the pure range-geometry helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The corners were given in the wrong order.
    #[error("invalid range: ({first_col}, {first_row}) is not above-left of ({last_col}, {last_row})")]
    InvalidRange {
        first_col: u32,
        first_row: u32,
        last_col: u32,
        last_row: u32,
    },

    /// The requested range does not intersect the sheet's occupied bounds.
    #[error("range {requested} is out of the sheet bounds")]
    OutOfBounds { requested: CellRange },
}

/// Invariant violations when assembling a table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("variable {0} appears more than once")]
    DuplicateVariable(VariableId),

    #[error("column {variable} has {found} values, expected {expected}")]
    ColumnLength {
        variable: VariableId,
        expected: usize,
        found: usize,
    },

    #[error("row {0} appears more than once")]
    DuplicateRow(RowId),
}

/// A sheet could not be turned into a table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SheetError {
    /// No usable rectangular data block.
    #[error("malformed sheet '{sheet}': {reason}")]
    Malformed { sheet: String, reason: String },

    #[error("sheet '{sheet}': {source}")]
    Range {
        sheet: String,
        #[source]
        source: RangeError,
    },
}

impl SheetError {
    pub(crate) fn malformed(sheet: &str, reason: impl Into<String>) -> Self {
        SheetError::Malformed {
            sheet: sheet.to_string(),
            reason: reason.into(),
        }
    }
}

/// Loading a whole workbook failed; no partial table is produced.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unreadable or corrupt workbook.
    #[error("unreadable workbook: {0}")]
    Workbook(String),

    #[error("workbook contains no worksheets")]
    NoSheets,

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("sheets cannot be combined: {0}")]
    Table(#[from] TableError),
}

/// Evaluating a predicate against a table column failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("unknown variable {0}")]
    UnknownVariable(VariableId),

    /// Ordering operator on a text column.
    #[error("operator '{symbol}' is not defined for text values of {variable}")]
    IncomparableTypes {
        variable: VariableId,
        symbol: &'static str,
    },

    /// Numeric criterion against a text column, or the reverse.
    #[error("criterion '{criterion}' does not match the {column_kind} column {variable}")]
    TypeMismatch {
        variable: VariableId,
        column_kind: &'static str,
        criterion: String,
    },

    #[error("mask has {mask} entries but the table has {rows} rows")]
    MaskLength { mask: usize, rows: usize },
}

/// Rejections from the subset registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubsetError {
    #[error("an identical subset already exists ({0})")]
    Duplicate(String),

    #[error("invalid subset: {0}")]
    Invalid(#[from] FilterError),

    #[error("subset {0} not found")]
    NotFound(u64),
}
