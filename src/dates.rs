//! Date parsing and Spanish formatting shared by classification and export.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};

const MESES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an API date or date-time into a local wall-clock instant.
///
/// RFC 3339 values (with `Z` or an offset) are converted to local time.
/// A bare `YYYY-MM-DD` is midnight of that day.
pub fn parse_local_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

pub fn month_name(date: &NaiveDate) -> &'static str {
    MESES[date.month0() as usize]
}

/// "05 de marzo de 2024"
pub fn format_spanish_date(date: &NaiveDate) -> String {
    format!(
        "{:02} de {} de {}",
        date.day(),
        month_name(date),
        date.year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_spanish_dates() {
        assert_eq!(format_spanish_date(&ymd(2024, 3, 5)), "05 de marzo de 2024");
        assert_eq!(format_spanish_date(&ymd(2024, 1, 15)), "15 de enero de 2024");
        assert_eq!(
            format_spanish_date(&ymd(2023, 12, 31)),
            "31 de diciembre de 2023"
        );
    }

    #[test]
    fn parses_supported_shapes() {
        let nine = ymd(2024, 6, 10).and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(parse_local_datetime("2024-06-10T09:00:00"), Some(nine));
        assert_eq!(parse_local_datetime("2024-06-10T09:00"), Some(nine));
        assert_eq!(parse_local_datetime("2024-06-10 09:00:00"), Some(nine));
        assert_eq!(
            parse_local_datetime("2024-06-10"),
            Some(ymd(2024, 6, 10).and_hms_opt(0, 0, 0).unwrap())
        );
        assert!(parse_local_datetime("2024-06-10T09:00:00Z").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_local_datetime("mañana"), None);
        assert_eq!(parse_local_datetime("2024-13-01"), None);
        assert_eq!(parse_local_datetime("15/01/2024"), None);
        assert_eq!(parse_local_datetime("2024"), None);
    }

    #[test]
    fn utc_timestamps_land_on_the_local_day() {
        let expected = DateTime::parse_from_rfc3339("2024-01-15T03:00:00Z")
            .unwrap()
            .with_timezone(&Local)
            .date_naive();
        assert_eq!(
            parse_local_datetime("2024-01-15T03:00:00Z").map(|dt| dt.date()),
            Some(expected)
        );
    }
}
