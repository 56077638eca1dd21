use serde::{Deserialize, Serialize};

use super::{segment, ApiClient};
use crate::error::Result;
use crate::models::{
    Abono, Categoria, Cliente, NuevaCategoria, NuevoAbono, NuevoCliente, NuevoProducto,
    NuevoTrabajador, Producto, StatRecord, Trabajador,
};
use crate::session::Session;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    usuario: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
struct Empty {}

impl ApiClient {
    pub fn login(&self, usuario: &str, password: &str) -> Result<Session> {
        let response: LoginResponse =
            self.post_json("auth/login", &LoginRequest { usuario, password }, None)?;
        Ok(Session::new(response.token))
    }

    pub fn clientes(&self, session: &Session) -> Result<Vec<Cliente>> {
        self.get_json("clientes", session)
    }

    /// Clients assigned to the logged-in worker
    pub fn mis_clientes(&self, session: &Session) -> Result<Vec<Cliente>> {
        self.get_json("clientes/trabajador", session)
    }

    pub fn cliente(&self, session: &Session, id: &str) -> Result<Cliente> {
        self.get_json(&format!("clientes/{}", segment(id)), session)
    }

    pub fn crear_cliente(&self, session: &Session, nuevo: &NuevoCliente) -> Result<Cliente> {
        self.post_json("clientes", nuevo, Some(session))
    }

    pub fn eliminar_cliente(&self, session: &Session, id: &str) -> Result<()> {
        self.delete(&format!("clientes/{}", segment(id)), session)
    }

    pub fn abonos(&self, session: &Session, cliente_id: &str) -> Result<Vec<Abono>> {
        let path = format!("clientes/{}/abonos", segment(cliente_id));
        self.get_json(&path, session)
    }

    pub fn registrar_abono(&self, session: &Session, cliente_id: &str, monto: f64) -> Result<()> {
        self.post_unit(
            &format!("clientes/{}/abonos", segment(cliente_id)),
            &NuevoAbono { monto },
            session,
        )
    }

    /// Record a visit where the client paid nothing
    pub fn registrar_no_abono(&self, session: &Session, cliente_id: &str) -> Result<()> {
        let path = format!("clientes/{}/no-abono", segment(cliente_id));
        self.post_unit(&path, &Empty {}, session)
    }

    pub fn trabajadores(&self, session: &Session) -> Result<Vec<Trabajador>> {
        self.get_json("trabajadores", session)
    }

    pub fn crear_trabajador(
        &self,
        session: &Session,
        nuevo: &NuevoTrabajador,
    ) -> Result<Trabajador> {
        self.post_json("trabajadores", nuevo, Some(session))
    }

    pub fn eliminar_trabajador(&self, session: &Session, id: &str) -> Result<()> {
        self.delete(&format!("trabajadores/{}", segment(id)), session)
    }

    pub fn productos(&self, session: &Session) -> Result<Vec<Producto>> {
        self.get_json("productos", session)
    }

    pub fn crear_producto(&self, session: &Session, nuevo: &NuevoProducto) -> Result<Producto> {
        self.post_json("productos", nuevo, Some(session))
    }

    pub fn eliminar_producto(&self, session: &Session, id: &str) -> Result<()> {
        self.delete(&format!("productos/{}", segment(id)), session)
    }

    pub fn categorias(&self, session: &Session) -> Result<Vec<Categoria>> {
        self.get_json("categorias", session)
    }

    pub fn crear_categoria(&self, session: &Session, nombre: &str) -> Result<Categoria> {
        self.post_json(
            "categorias",
            &NuevaCategoria {
                nombre: nombre.to_string(),
            },
            Some(session),
        )
    }

    pub fn estadisticas(&self, session: &Session) -> Result<Vec<StatRecord>> {
        self.get_json("estadisticas", session)
    }

    pub fn estadisticas_trabajador(
        &self,
        session: &Session,
        trabajador_id: &str,
    ) -> Result<Vec<StatRecord>> {
        let path = format!("estadisticas/trabajador/{}", segment(trabajador_id));
        self.get_json(&path, session)
    }
}
