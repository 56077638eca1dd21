use chrono::{NaiveDate, NaiveDateTime};
use cobranza::status::{classify, ClientBuckets, Granularity};
use cobranza::{Cliente, CobranzaError, FormaPago};

fn client(id: &str, due: &str, monto: f64) -> Cliente {
    Cliente {
        id: id.to_string(),
        nombre: format!("Cliente {id}"),
        direccion: "Centro".to_string(),
        telefono: "5550000000".to_string(),
        precio_total: 500.0,
        monto_actual: monto,
        fecha_proximo_pago: due.to_string(),
        forma_pago: FormaPago::Semanal,
        producto_id: None,
        trabajador_id: None,
        fecha_inicio: None,
        dias_prestamo: None,
        cobro_diario: None,
    }
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 10)
        .unwrap()
        .and_hms_opt(15, 0, 0)
        .unwrap()
}

fn ids(clients: &[Cliente]) -> Vec<&str> {
    clients.iter().map(|c| c.id.as_str()).collect()
}

fn sample() -> Vec<Cliente> {
    vec![
        client("A", "2024-06-10T09:00:00", 50.0),
        client("B", "2024-06-08", 20.0),
        client("C", "2024-06-15", 30.0),
        client("D", "2024-06-10T09:00:00", 0.0),
    ]
}

#[test]
fn test_reference_example_both_modes() {
    for mode in [Granularity::CalendarDay, Granularity::Mixed] {
        let buckets = classify(&sample(), now(), mode).unwrap();
        assert_eq!(ids(&buckets.due_today), ["A"], "{mode:?}");
        assert_eq!(ids(&buckets.overdue), ["B"], "{mode:?}");
        assert_eq!(ids(&buckets.upcoming), ["C"], "{mode:?}");
    }
}

#[test]
fn test_paid_clients_never_due_or_overdue() {
    let clients = vec![
        client("hoy", "2024-06-10T09:00:00", 0.0),
        client("ayer", "2024-06-09", 0.0),
        client("negativo", "2024-06-01", -5.0),
        client("futuro", "2024-07-01", 0.0),
    ];
    for mode in [Granularity::CalendarDay, Granularity::Mixed] {
        let buckets = classify(&clients, now(), mode).unwrap();
        assert!(buckets.due_today.is_empty());
        assert!(buckets.overdue.is_empty());
        assert_eq!(ids(&buckets.upcoming), ["futuro"]);
    }
}

#[test]
fn test_buckets_are_disjoint() {
    let clients = vec![
        client("1", "2024-06-10T00:00:00", 10.0),
        client("2", "2024-06-10T14:59:59", 10.0),
        client("3", "2024-06-10T15:00:00", 10.0),
        client("4", "2024-06-10T23:59:00", 10.0),
        client("5", "2024-06-09T23:59:00", 10.0),
        client("6", "2024-06-11T00:00:00", 10.0),
        client("7", "2024-06-11", 0.0),
    ];
    for mode in [Granularity::CalendarDay, Granularity::Mixed] {
        let buckets = classify(&clients, now(), mode).unwrap();
        let mut seen: Vec<&str> = ids(&buckets.due_today);
        seen.extend(ids(&buckets.overdue));
        seen.extend(ids(&buckets.upcoming));
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total, "a client landed in two buckets ({mode:?})");
    }
}

#[test]
fn test_calendar_day_covers_every_owing_client() {
    let clients = vec![
        client("temprano", "2024-06-10T08:00:00", 10.0),
        client("tarde", "2024-06-10T20:00:00", 10.0),
        client("atrasado", "2024-06-01", 10.0),
        client("manana", "2024-06-11", 10.0),
    ];
    let buckets = classify(&clients, now(), Granularity::CalendarDay).unwrap();
    assert_eq!(ids(&buckets.due_today), ["temprano", "tarde"]);
    assert_eq!(buckets.len(), clients.len());
}

#[test]
fn test_mixed_mode_drops_later_today() {
    let clients = vec![
        client("temprano", "2024-06-10T08:00:00", 10.0),
        client("tarde", "2024-06-10T20:00:00", 10.0),
    ];
    let buckets = classify(&clients, now(), Granularity::Mixed).unwrap();
    assert_eq!(ids(&buckets.due_today), ["temprano"]);
    assert_eq!(buckets.len(), 1);
}

#[test]
fn test_classification_is_idempotent() {
    let clients = sample();
    let first = classify(&clients, now(), Granularity::CalendarDay).unwrap();
    let second = classify(&clients, now(), Granularity::CalendarDay).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_due_date_is_an_error() {
    let clients = vec![
        client("ok", "2024-06-10", 10.0),
        client("roto", "10/06/2024", 10.0),
    ];
    let err = classify(&clients, now(), Granularity::CalendarDay).unwrap_err();
    match err {
        CobranzaError::InvalidDueDate { client, value } => {
            assert!(client.contains("roto"));
            assert_eq!(value, "10/06/2024");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_dashboard_filters_paid_first() {
    let active = ClientBuckets::active_only(&sample());
    let buckets = classify(&active, now(), Granularity::CalendarDay).unwrap();
    assert_eq!(buckets.len(), 3);
    assert!(buckets.due_today.iter().all(|c| c.monto_actual > 0.0));
}
