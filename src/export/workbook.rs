use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rust_xlsxwriter::{Format, Workbook};

use super::columns::{ColumnSpec, Row};
use crate::error::{CobranzaError, Result};

pub const SHEET_NAME: &str = "Estadisticas";

/// Build a single-sheet xlsx workbook: bold header row, then one row per record.
pub fn build_workbook(columns: &[ColumnSpec], rows: &[Row]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, spec) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, &spec.header, &header)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let excel_row = (idx + 1) as u32;
        for (col, value) in row.values().enumerate() {
            worksheet.write_string(excel_row, col as u16, value)?;
        }
    }
    worksheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

pub fn encode_payload(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(payload)
        .map_err(|e| CobranzaError::ExportFailure(format!("invalid base64 payload: {e}")))
}
