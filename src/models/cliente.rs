use serde::{Deserialize, Serialize};
use std::fmt;

use super::{id_from_any, opt_id_from_any};
use crate::dates::parse_local_datetime;
use crate::error::{CobranzaError, Result};
use chrono::NaiveDateTime;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FormaPago {
    Diario,
    Semanal,
}

impl fmt::Display for FormaPago {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormaPago::Diario => write!(f, "diario"),
            FormaPago::Semanal => write!(f, "semanal"),
        }
    }
}

impl std::str::FromStr for FormaPago {
    type Err = CobranzaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "diario" => Ok(FormaPago::Diario),
            "semanal" => Ok(FormaPago::Semanal),
            other => Err(CobranzaError::malformed(
                "forma de pago",
                format!("'{other}' (use 'diario' or 'semanal')"),
            )),
        }
    }
}

/// A client as the API reports it
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Cliente {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    pub nombre: String,
    #[serde(default)]
    pub direccion: String,
    #[serde(default)]
    pub telefono: String,
    pub precio_total: f64,
    pub monto_actual: f64,
    /// Raw due date; parsed on use so a bad value surfaces as an error
    pub fecha_proximo_pago: String,
    pub forma_pago: FormaPago,
    #[serde(default, deserialize_with = "opt_id_from_any")]
    pub producto_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id_from_any")]
    pub trabajador_id: Option<String>,
    #[serde(default)]
    pub fecha_inicio: Option<String>,
    #[serde(default)]
    pub dias_prestamo: Option<u32>,
    #[serde(default)]
    pub cobro_diario: Option<f64>,
}

impl Cliente {
    /// Fully paid clients never show up as due or overdue.
    pub fn is_paid(&self) -> bool {
        self.monto_actual <= 0.0
    }

    pub fn due_at(&self) -> Result<NaiveDateTime> {
        parse_local_datetime(&self.fecha_proximo_pago).ok_or_else(|| {
            CobranzaError::InvalidDueDate {
                client: format!("{} ({})", self.nombre, self.id),
                value: self.fecha_proximo_pago.clone(),
            }
        })
    }
}

/// Payload for registering a new client
#[derive(Debug, Serialize, Clone)]
pub struct NuevoCliente {
    pub nombre: String,
    pub direccion: String,
    pub telefono: String,
    pub producto_id: String,
    pub precio_total: f64,
    pub forma_pago: FormaPago,
    pub fecha_proximo_pago: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_api_shape() {
        let json = r#"{
            "id": 7,
            "nombre": "Ana",
            "direccion": "Calle 1",
            "telefono": "5551234567",
            "precio_total": 1200.0,
            "monto_actual": 300.5,
            "fecha_proximo_pago": "2024-06-10T09:00:00",
            "forma_pago": "semanal",
            "producto_id": "p-3"
        }"#;
        let cliente: Cliente = serde_json::from_str(json).unwrap();
        assert_eq!(cliente.id, "7");
        assert_eq!(cliente.forma_pago, FormaPago::Semanal);
        assert_eq!(cliente.producto_id.as_deref(), Some("p-3"));
        assert_eq!(cliente.trabajador_id, None);
        assert!(!cliente.is_paid());
    }

    #[test]
    fn rejects_unknown_frequency() {
        let json = r#"{"id": "1", "nombre": "X", "precio_total": 1, "monto_actual": 1,
            "fecha_proximo_pago": "2024-01-01", "forma_pago": "mensual"}"#;
        assert!(serde_json::from_str::<Cliente>(json).is_err());
        assert!("mensual".parse::<FormaPago>().is_err());
        assert_eq!("Diario".parse::<FormaPago>().unwrap(), FormaPago::Diario);
    }
}
