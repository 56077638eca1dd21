mod columns;
mod sink;
mod workbook;

pub use columns::{
    flatten, format_esquema, general_columns, worker_columns, ColumnSpec, Row, Source, UNKNOWN,
};
pub use sink::{open_path, ExportSink, FileSink};
pub use workbook::{build_workbook, decode_payload, encode_payload, SHEET_NAME};

use chrono::NaiveDateTime;
use log::{debug, error};
use std::path::PathBuf;

use crate::error::{CobranzaError, Result};
use crate::models::StatRecord;

#[derive(Debug)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub rows: usize,
}

/// Timestamped workbook name. The prefix is reduced to `[A-Za-z0-9_-]` so
/// the result is always a single path component.
pub fn export_file_name(prefix: &str, now: NaiveDateTime) -> String {
    let prefix: String = prefix
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}-{}.xlsx", prefix, now.format("%Y%m%d-%H%M%S"))
}

/// Fetch, flatten, encode and hand the statistics workbook to `sink`.
///
/// The steps run strictly in order. Any failure is logged and comes back
/// as [`CobranzaError::ExportFailure`].
pub fn export_statistics<F>(
    fetch: F,
    columns: &[ColumnSpec],
    sink: &dyn ExportSink,
    file_name: &str,
) -> Result<ExportOutcome>
where
    F: FnOnce() -> Result<Vec<StatRecord>>,
{
    run_export(fetch, columns, sink, file_name).map_err(|e| {
        error!("statistics export failed: {e}");
        match e {
            CobranzaError::ExportFailure(_) => e,
            other => CobranzaError::ExportFailure(other.to_string()),
        }
    })
}

fn run_export<F>(
    fetch: F,
    columns: &[ColumnSpec],
    sink: &dyn ExportSink,
    file_name: &str,
) -> Result<ExportOutcome>
where
    F: FnOnce() -> Result<Vec<StatRecord>>,
{
    let records = fetch()?;
    debug!("exporting {} statistics records", records.len());

    let rows = flatten(&records, columns)?;
    let bytes = build_workbook(columns, &rows)?;
    let payload = encode_payload(&bytes);
    let path = sink.deliver(file_name, &payload)?;

    Ok(ExportOutcome {
        path,
        rows: rows.len(),
    })
}
