use std::io::Cursor;
use std::path::Path;

use polars::prelude::*;
use provstat_core::tables::{REGION_CODE, REGION_NAME, VALUE, YEAR};
use tracing::debug;

use crate::columns::MetricColumns;
use crate::errors::SourceError;

/// Reads a metric CSV and renames its configured columns to the canonical
/// names `provstat_core::MetricTable` ingests.
pub fn read_metric_csv(path: &Path, columns: &MetricColumns) -> Result<DataFrame, SourceError> {
    let content = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let df = metric_frame_from_bytes(&content, columns)?;
    debug!(path = %path.display(), rows = df.height(), "read metric csv");
    Ok(df)
}

pub fn metric_frame_from_bytes(
    content: &[u8],
    columns: &MetricColumns,
) -> Result<DataFrame, SourceError> {
    // Every column is read as text; the core casts year and value and keeps
    // region codes exactly as written.
    let raw = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(content))
        .finish()?;

    for column in columns.source_names() {
        if raw.column(column).is_err() {
            return Err(SourceError::MissingColumn {
                column: column.to_string(),
            });
        }
    }

    let df = raw
        .lazy()
        .select([
            col(columns.region_code.as_str()).alias(REGION_CODE),
            col(columns.region_name.as_str()).alias(REGION_NAME),
            col(columns.year.as_str()).alias(YEAR),
            col(columns.value.as_str()).alias(VALUE),
        ])
        .collect()?;

    Ok(df)
}
