mod abono;
mod catalog;
mod cliente;
mod trabajador;

pub use abono::{sort_recent_first, Abono, EstadoAbono, NuevoAbono};
pub use catalog::{Categoria, NuevaCategoria, NuevoProducto, Producto};
pub use cliente::{Cliente, FormaPago, NuevoCliente};
pub use trabajador::{NuevoTrabajador, Rol, Trabajador};

use serde::{Deserialize, Deserializer};

/// A statistics record as returned by the API: field name to raw JSON value.
pub type StatRecord = serde_json::Map<String, serde_json::Value>;

/// The API hands out ids as numbers on some endpoints and strings on others.
pub(crate) fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Num(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

pub(crate) fn opt_id_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(u64),
        Text(String),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Num(n) => n.to_string(),
        RawId::Text(s) => s,
    }))
}
