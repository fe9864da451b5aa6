use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::errors::ParquetError;
use thiserror::Error;

use crate::data::model::{ColumnData, Table};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported export extension: .{0}")]
    UnsupportedExtension(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Parquet: {0}")]
    Parquet(#[from] ParquetError),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write a table to a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – `sheet`, `point`, then one column per variable
/// * `.json`    – the table as `{ "rows": [...], "columns": [...] }`
/// * `.parquet` – same layout as CSV, typed columns
pub fn export_path(table: &Table, path: &Path) -> Result<(), ExportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let file = || {
        std::fs::File::create(path).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })
    };

    match ext.as_str() {
        "csv" => write_csv(table, file()?),
        "json" => write_json(table, file()?),
        "parquet" | "pq" => write_parquet(table, file()?),
        other => Err(ExportError::UnsupportedExtension(other.to_string())),
    }?;
    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Arrow
// ---------------------------------------------------------------------------

/// Flat Arrow layout: `sheet` (Utf8), `point` (UInt32), then each variable
/// labelled `name (unit)` as Float64 or Utf8.
pub fn to_record_batch(table: &Table) -> Result<RecordBatch, ExportError> {
    let mut fields = vec![
        Field::new("sheet", DataType::Utf8, false),
        Field::new("point", DataType::UInt32, false),
    ];
    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            table.row_ids().iter().map(|r| r.sheet.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(UInt32Array::from(
            table.row_ids().iter().map(|r| r.point).collect::<Vec<_>>(),
        )),
    ];

    for column in table.columns() {
        let label = column.id.to_string();
        match &column.data {
            ColumnData::Number(v) => {
                fields.push(Field::new(label, DataType::Float64, true));
                arrays.push(Arc::new(Float64Array::from(v.clone())));
            }
            ColumnData::Text(v) => {
                fields.push(Field::new(label, DataType::Utf8, true));
                arrays.push(Arc::new(StringArray::from(v.clone())));
            }
        }
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Render as an aligned text table for terminals.
pub fn pretty(table: &Table) -> Result<String, ExportError> {
    let batch = to_record_batch(table)?;
    Ok(arrow::util::pretty::pretty_format_batches(&[batch])?.to_string())
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec!["sheet".to_string(), "point".to_string()];
    header.extend(table.variables().map(|v| v.to_string()));
    out.write_record(&header)?;

    let texts: Vec<Vec<Option<String>>> = table.columns().iter().map(|c| c.data.to_text()).collect();
    for (i, row) in table.row_ids().iter().enumerate() {
        let mut record = vec![row.sheet.clone(), row.point.to_string()];
        record.extend(texts.iter().map(|col| col[i].clone().unwrap_or_default()));
        out.write_record(&record)?;
    }
    out.flush().map_err(|source| ExportError::Io {
        path: "<csv>".to_string(),
        source,
    })?;
    Ok(())
}

pub fn write_json<W: Write>(table: &Table, writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, table)?;
    Ok(())
}

pub fn write_parquet<W: Write + Send>(table: &Table, writer: W) -> Result<(), ExportError> {
    let batch = to_record_batch(table)?;
    let mut out = ArrowWriter::try_new(writer, batch.schema(), None)?;
    out.write(&batch)?;
    out.close()?;
    Ok(())
}
