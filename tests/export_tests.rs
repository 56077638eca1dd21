use serde_json::json;
use std::cell::RefCell;
use std::path::PathBuf;
use tempfile::TempDir;

use cobranza::export::{
    decode_payload, export_statistics, flatten, general_columns, worker_columns, ColumnSpec,
    ExportSink, FileSink,
};
use cobranza::dates::{format_spanish_date, parse_local_datetime};
use cobranza::{CobranzaError, Result, StatRecord};

fn record(value: serde_json::Value) -> StatRecord {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn ana() -> StatRecord {
    record(json!({
        "nombre": "Ana",
        "fecha_inicio": "2024-01-15",
        "dias_prestamo": 20,
        "cobro_diario": 12.7
    }))
}

/// Keeps the payload in memory instead of touching the filesystem
#[derive(Default)]
struct CapturingSink {
    delivered: RefCell<Vec<(String, String)>>,
}

impl ExportSink for CapturingSink {
    fn deliver(&self, file_name: &str, payload_b64: &str) -> Result<PathBuf> {
        self.delivered
            .borrow_mut()
            .push((file_name.to_string(), payload_b64.to_string()));
        Ok(PathBuf::from("/virtual").join(file_name))
    }
}

struct FailingSink;

impl ExportSink for FailingSink {
    fn deliver(&self, _file_name: &str, _payload_b64: &str) -> Result<PathBuf> {
        Err(CobranzaError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    }
}

#[test]
fn test_reference_row() {
    let rows = flatten(&[ana()], &general_columns()).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.get("Nombre"), Some("Ana"));
    assert_eq!(row.get("Esquema"), Some("20 Dias $13 *$1000"));
    assert_eq!(row.get("Fecha de inicio"), Some("15 de enero de 2024"));
}

#[test]
fn test_missing_scheme_inputs_use_fallbacks() {
    let rows = flatten(&[record(json!({"nombre": "Beto"}))], &general_columns()).unwrap();
    let row = &rows[0];
    assert_eq!(row.get("Esquema"), Some("Desconocido Dias $0 *$1000"));
    assert_eq!(row.get("Fecha de inicio"), Some("Desconocido"));
    assert_eq!(row.get("Telefono"), Some(""));
    assert_eq!(row.get("Monto actual"), Some("$0.00"));
}

#[test]
fn test_null_values_count_as_missing() {
    let rows = flatten(
        &[record(json!({"dias_prestamo": null, "cobro_diario": null}))],
        &worker_columns(),
    )
    .unwrap();
    assert_eq!(rows[0].get("Esquema"), Some("Desconocido Dias $0 *$1000"));
}

#[test]
fn test_columns_keep_declared_order() {
    let columns = vec![
        ColumnSpec::money("Debe", "monto_actual"),
        ColumnSpec::field("Nombre", "nombre"),
        ColumnSpec::date("Alta", "fecha_inicio"),
    ];
    let rows = flatten(
        &[record(json!({
            "nombre": "Carla",
            "monto_actual": 1250.5,
            "fecha_inicio": "2024-03-05T10:30:00"
        }))],
        &columns,
    )
    .unwrap();
    let headers: Vec<&str> = rows[0].cells().iter().map(|(h, _)| h.as_str()).collect();
    assert_eq!(headers, ["Debe", "Nombre", "Alta"]);
    let values: Vec<&str> = rows[0].values().collect();
    assert_eq!(values, ["$1250.50", "Carla", "05 de marzo de 2024"]);
}

#[test]
fn test_utc_dates_use_the_classifier_day() {
    let stamp = "2024-01-15T03:00:00Z";
    let rows = flatten(
        &[record(json!({"nombre": "Dora", "fecha_inicio": stamp}))],
        &general_columns(),
    )
    .unwrap();
    let local_day = parse_local_datetime(stamp).unwrap().date();
    assert_eq!(
        rows[0].get("Fecha de inicio"),
        Some(format_spanish_date(&local_day).as_str())
    );
}

#[test]
fn test_invalid_date_fails_flatten() {
    let err = flatten(
        &[record(json!({"fecha_inicio": "15/01/2024"}))],
        &general_columns(),
    )
    .unwrap_err();
    assert!(matches!(err, CobranzaError::InvalidStatDate(_)));
}

#[test]
fn test_export_hands_workbook_to_sink() {
    let sink = CapturingSink::default();
    let outcome = export_statistics(
        || Ok(vec![ana(), record(json!({"nombre": "Beto"}))]),
        &general_columns(),
        &sink,
        "estadisticas.xlsx",
    )
    .unwrap();

    assert_eq!(outcome.rows, 2);
    assert_eq!(outcome.path, PathBuf::from("/virtual/estadisticas.xlsx"));

    let delivered = sink.delivered.borrow();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, "estadisticas.xlsx");
    let bytes = decode_payload(&delivered[0].1).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn test_fetch_failure_becomes_export_failure() {
    let sink = CapturingSink::default();
    let err = export_statistics(
        || {
            Err(CobranzaError::Network {
                url: "http://api/estadisticas".to_string(),
                reason: "connection refused".to_string(),
            })
        },
        &general_columns(),
        &sink,
        "x.xlsx",
    )
    .unwrap_err();

    match err {
        CobranzaError::ExportFailure(msg) => assert!(msg.contains("connection refused")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(sink.delivered.borrow().is_empty());
}

#[test]
fn test_sink_failure_becomes_export_failure() {
    let err = export_statistics(|| Ok(vec![ana()]), &general_columns(), &FailingSink, "x.xlsx")
        .unwrap_err();
    assert!(matches!(err, CobranzaError::ExportFailure(_)));
}

#[test]
fn test_file_sink_writes_workbook() {
    let temp_dir = TempDir::new().unwrap();
    let sink = FileSink::new(temp_dir.path().join("exports"), false);

    let outcome = export_statistics(
        || Ok(vec![ana()]),
        &worker_columns(),
        &sink,
        "trabajador.xlsx",
    )
    .unwrap();

    assert_eq!(outcome.path, temp_dir.path().join("exports/trabajador.xlsx"));
    let bytes = std::fs::read(&outcome.path).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}
