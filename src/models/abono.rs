use serde::{Deserialize, Serialize};
use std::fmt;

use super::opt_id_from_any;
use crate::dates::parse_local_datetime;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EstadoAbono {
    Pagado,
    NoAbono,
}

impl fmt::Display for EstadoAbono {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstadoAbono::Pagado => write!(f, "PAGADO"),
            EstadoAbono::NoAbono => write!(f, "NO ABONO"),
        }
    }
}

/// A recorded payment. Immutable once the API has it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Abono {
    #[serde(default, deserialize_with = "opt_id_from_any")]
    pub id: Option<String>,
    pub monto: f64,
    pub fecha: String,
    pub estado: EstadoAbono,
}

#[derive(Debug, Serialize, Clone)]
pub struct NuevoAbono {
    pub monto: f64,
}

/// Newest first. Unparseable dates sink to the bottom.
pub fn sort_recent_first(abonos: &mut [Abono]) {
    abonos.sort_by(|a, b| {
        let a = parse_local_datetime(&a.fecha);
        let b = parse_local_datetime(&b.fecha);
        b.cmp(&a)
    });
}
