//! Form input checks run before anything is sent to the API.

use chrono::NaiveDate;

use crate::error::{CobranzaError, Result};

pub fn amount(field: &str, input: &str) -> Result<f64> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| CobranzaError::malformed(field, format!("'{input}' is not a number")))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(CobranzaError::malformed(field, "must be greater than zero"));
    }
    Ok(value)
}

pub fn date(field: &str, input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| CobranzaError::malformed(field, format!("'{input}' (expected YYYY-MM-DD)")))
}

pub fn phone(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if let Some(bad) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_digit() || matches!(c, ' ' | '-' | '+')))
    {
        return Err(CobranzaError::malformed(
            "telefono",
            format!("unexpected character '{bad}'"),
        ));
    }
    let digits = trimmed.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return Err(CobranzaError::malformed(
            "telefono",
            format!("expected 7 to 15 digits, got {digits}"),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn required(field: &str, input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CobranzaError::malformed(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}
