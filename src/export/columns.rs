use serde_json::Value;

use crate::dates::{format_spanish_date, parse_local_datetime};
use crate::error::{CobranzaError, Result};
use crate::models::StatRecord;

pub const UNKNOWN: &str = "Desconocido";

/// Where a column's value comes from
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Raw field, rendered as text
    Field(String),
    /// Date field, rendered as "15 de enero de 2024"
    Date(String),
    /// Amount, rendered as "$1234.50"
    Money(String),
    /// "{days} Dias ${rate} *$1000" from a day count and a daily rate
    Esquema { days: String, rate: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub header: String,
    pub source: Source,
}

impl ColumnSpec {
    pub fn field(header: &str, field: &str) -> Self {
        Self::new(header, Source::Field(field.to_string()))
    }

    pub fn date(header: &str, field: &str) -> Self {
        Self::new(header, Source::Date(field.to_string()))
    }

    pub fn money(header: &str, field: &str) -> Self {
        Self::new(header, Source::Money(field.to_string()))
    }

    pub fn esquema(header: &str, days: &str, rate: &str) -> Self {
        Self::new(
            header,
            Source::Esquema {
                days: days.to_string(),
                rate: rate.to_string(),
            },
        )
    }

    fn new(header: &str, source: Source) -> Self {
        Self {
            header: header.to_string(),
            source,
        }
    }
}

/// Column layout for the general (per client) statistics export
pub fn general_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::field("Nombre", "nombre"),
        ColumnSpec::field("Telefono", "telefono"),
        ColumnSpec::field("Direccion", "direccion"),
        ColumnSpec::field("Trabajador", "trabajador"),
        ColumnSpec::field("Forma de pago", "forma_pago"),
        ColumnSpec::date("Fecha de inicio", "fecha_inicio"),
        ColumnSpec::esquema("Esquema", "dias_prestamo", "cobro_diario"),
        ColumnSpec::money("Precio total", "precio_total"),
        ColumnSpec::money("Total abonado", "total_abonado"),
        ColumnSpec::money("Monto actual", "monto_actual"),
    ]
}

/// Column layout for the per-worker statistics export
pub fn worker_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::field("Cliente", "nombre"),
        ColumnSpec::date("Fecha de inicio", "fecha_inicio"),
        ColumnSpec::esquema("Esquema", "dias_prestamo", "cobro_diario"),
        ColumnSpec::money("Total prestado", "precio_total"),
        ColumnSpec::money("Total cobrado", "total_abonado"),
        ColumnSpec::money("Pendiente", "monto_actual"),
        ColumnSpec::field("Abonos", "num_abonos"),
        ColumnSpec::field("Sin abono", "num_no_abonos"),
    ]
}

/// One flattened output row: column header to formatted cell, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn cells(&self) -> &[(String, String)] {
        &self.cells
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, v)| v.as_str())
    }
}

pub fn flatten(records: &[StatRecord], columns: &[ColumnSpec]) -> Result<Vec<Row>> {
    records
        .iter()
        .map(|record| {
            let cells = columns
                .iter()
                .map(|col| Ok((col.header.clone(), format_cell(record, &col.source)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Row { cells })
        })
        .collect()
}

fn lookup<'a>(record: &'a StatRecord, field: &str) -> Option<&'a Value> {
    record.get(field).filter(|v| !v.is_null())
}

fn format_cell(record: &StatRecord, source: &Source) -> Result<String> {
    match source {
        Source::Field(field) => Ok(lookup(record, field).map(plain_text).unwrap_or_default()),
        Source::Date(field) => match lookup(record, field) {
            None => Ok(UNKNOWN.to_string()),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(UNKNOWN.to_string()),
            Some(value) => {
                let text = plain_text(value);
                parse_local_datetime(&text)
                    .map(|dt| format_spanish_date(&dt.date()))
                    .ok_or(CobranzaError::InvalidStatDate(text))
            }
        },
        Source::Money(field) => {
            let amount = lookup(record, field).and_then(as_number).unwrap_or(0.0);
            Ok(format!("${:.2}", amount))
        }
        Source::Esquema { days, rate } => Ok(format_esquema(
            lookup(record, days),
            lookup(record, rate),
        )),
    }
}

/// "20 Dias $13 *$1000". Missing days read "Desconocido", a missing rate "0".
pub fn format_esquema(days: Option<&Value>, rate: Option<&Value>) -> String {
    let days = match days {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(v @ Value::Number(_)) => plain_text(v),
        _ => UNKNOWN.to_string(),
    };
    let rate = rate.and_then(as_number).map(|r| r.round() as i64).unwrap_or(0);
    format!("{days} Dias ${rate} *$1000")
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|n: &f64| n.is_finite())
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "Si".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 => format!("{:.0}", f),
            (None, Some(f)) => {
                let s = format!("{:.2}", f);
                s.trim_end_matches('0').trim_end_matches('.').to_string()
            }
            (None, None) => n.to_string(),
        },
        other => other.to_string(),
    }
}
