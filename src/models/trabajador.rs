use serde::{Deserialize, Serialize};
use std::fmt;

use super::id_from_any;
use crate::error::{CobranzaError, Result};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Rol {
    Administrador,
    Trabajador,
}

impl fmt::Display for Rol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rol::Administrador => write!(f, "administrador"),
            Rol::Trabajador => write!(f, "trabajador"),
        }
    }
}

impl std::str::FromStr for Rol {
    type Err = CobranzaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "administrador" | "admin" => Ok(Rol::Administrador),
            "trabajador" => Ok(Rol::Trabajador),
            other => Err(CobranzaError::malformed(
                "rol",
                format!("'{other}' (use 'administrador' or 'trabajador')"),
            )),
        }
    }
}

impl TryFrom<String> for Rol {
    type Error = CobranzaError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Trabajador {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    pub nombre: String,
    pub usuario: String,
    pub rol: Rol,
}

#[derive(Debug, Serialize, Clone)]
pub struct NuevoTrabajador {
    pub nombre: String,
    pub usuario: String,
    pub password: String,
    pub rol: Rol,
}
