use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::error::TableError;
use super::sheet::format_number;

// ---------------------------------------------------------------------------
// VariableId – (name, unit) pair naming one column
// ---------------------------------------------------------------------------

/// Identifies a column across the whole workbook.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VariableId {
    pub name: String,
    pub unit: String,
}

impl VariableId {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        VariableId {
            name: name.into(),
            unit: unit.into(),
        }
    }
}

/// `name (unit)`, the label shown in variable pickers and on plot axes.
impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.unit)
    }
}

// ---------------------------------------------------------------------------
// RowId – (sheet, point index) pair naming one row
// ---------------------------------------------------------------------------

/// One sample point. `point` is 1-based and unique within its sheet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RowId {
    pub sheet: String,
    pub point: u32,
}

impl RowId {
    pub fn new(sheet: impl Into<String>, point: u32) -> Self {
        RowId {
            sheet: sheet.into(),
            point,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.sheet, self.point)
    }
}

// ---------------------------------------------------------------------------
// Value / ColumnData – typed column storage
// ---------------------------------------------------------------------------

/// Lexically numeric text: trims, then accepts any finite `f64` literal.
/// `"nan"` and `"inf"` stay text.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A single non-empty table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => f.write_str(&format_number(*v)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Column values; every column is entirely numeric or entirely text.
/// `None` marks a cell left empty in the workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnData {
    Number(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Number(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Number(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ColumnData::Number(_) => "numeric",
            ColumnData::Text(_) => "text",
        }
    }

    pub fn get(&self, i: usize) -> Option<Value> {
        match self {
            ColumnData::Number(v) => v.get(i).copied().flatten().map(Value::Number),
            ColumnData::Text(v) => v.get(i).cloned().flatten().map(Value::Text),
        }
    }

    /// Values rendered as text, numbers in their display form.
    pub fn to_text(&self) -> Vec<Option<String>> {
        match self {
            ColumnData::Number(v) => v.iter().map(|x| x.map(format_number)).collect(),
            ColumnData::Text(v) => v.clone(),
        }
    }

    /// New column holding the entries at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> ColumnData {
        match self {
            ColumnData::Number(v) => ColumnData::Number(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Text(v) => {
                ColumnData::Text(indices.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }

    /// Stack column pieces. `None` pieces are that many empty cells. The
    /// result is numeric only when every present piece is numeric;
    /// otherwise every piece is rendered as text.
    fn stack(pieces: &[(usize, Option<&ColumnData>)]) -> ColumnData {
        let numbers: Option<Vec<Option<f64>>> = pieces
            .iter()
            .map(|(len, data)| match data {
                None => Some(vec![None; *len]),
                Some(ColumnData::Number(v)) => Some(v.clone()),
                Some(ColumnData::Text(_)) => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(|chunks| chunks.concat());

        match numbers {
            Some(values) => ColumnData::Number(values),
            None => ColumnData::Text(
                pieces
                    .iter()
                    .flat_map(|(len, data)| match data {
                        Some(d) => d.to_text(),
                        None => vec![None; *len],
                    })
                    .collect(),
            ),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub id: VariableId,
    pub data: ColumnData,
}

// ---------------------------------------------------------------------------
// Table – rows keyed by RowId, columns keyed by VariableId
// ---------------------------------------------------------------------------

/// Immutable table. Filtering produces a new `Table`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    rows: Vec<RowId>,
    columns: Vec<Column>,
}

impl Table {
    /// Check the invariants and build the table.
    pub fn new(rows: Vec<RowId>, columns: Vec<Column>) -> Result<Self, TableError> {
        let mut seen_rows = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen_rows.insert(row) {
                return Err(TableError::DuplicateRow(row.clone()));
            }
        }
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(&col.id) {
                return Err(TableError::DuplicateVariable(col.id.clone()));
            }
            if col.data.len() != rows.len() {
                return Err(TableError::ColumnLength {
                    variable: col.id.clone(),
                    expected: rows.len(),
                    found: col.data.len(),
                });
            }
        }
        Ok(Table { rows, columns })
    }

    /// Stack tables row-wise. Columns are matched by [`VariableId`] in
    /// first-appearance order; a table lacking a column contributes empty
    /// cells. A variable that is numeric in one table and text in another
    /// becomes a text column.
    pub fn concat(tables: &[Table]) -> Result<Self, TableError> {
        let mut order: Vec<VariableId> = Vec::new();
        for table in tables {
            for col in &table.columns {
                if !order.contains(&col.id) {
                    order.push(col.id.clone());
                }
            }
        }

        let rows: Vec<RowId> = tables.iter().flat_map(|t| t.rows.iter().cloned()).collect();
        let columns = order
            .into_iter()
            .map(|id| {
                let pieces: Vec<(usize, Option<&ColumnData>)> = tables
                    .iter()
                    .map(|t| (t.len(), t.column(&id).map(|c| &c.data)))
                    .collect();
                let data = ColumnData::stack(&pieces);
                let has_numbers = pieces
                    .iter()
                    .any(|(_, d)| d.is_some_and(ColumnData::is_numeric));
                if has_numbers && !data.is_numeric() {
                    log::warn!("{id} mixes numeric and text values, keeping it as text");
                }
                Column { id, data }
            })
            .collect();

        Table::new(rows, columns)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_ids(&self) -> &[RowId] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableId> {
        self.columns.iter().map(|c| &c.id)
    }

    pub fn column(&self, id: &VariableId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == *id)
    }

    /// New table holding the rows at `indices`, same columns.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    id: c.id.clone(),
                    data: c.data.take(indices),
                })
                .collect(),
        }
    }
}
