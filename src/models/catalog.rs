use serde::{Deserialize, Serialize};

use super::{id_from_any, opt_id_from_any};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Categoria {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    pub nombre: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Producto {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    pub nombre: String,
    pub precio: f64,
    #[serde(default, deserialize_with = "opt_id_from_any")]
    pub categoria_id: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct NuevoProducto {
    pub nombre: String,
    pub precio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria_id: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct NuevaCategoria {
    pub nombre: String,
}
