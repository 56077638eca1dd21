use chrono::{Local, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use cobranza::config::{config_dir, load_config, resolve_output_dir, CONFIG_TEMPLATE};
use cobranza::dates::parse_local_datetime;
use cobranza::export::{
    export_file_name, export_statistics, general_columns, worker_columns, FileSink,
};
use cobranza::models::{
    sort_recent_first, Cliente, FormaPago, NuevoCliente, NuevoProducto, NuevoTrabajador, Rol,
};
use cobranza::status::{classify, ClientBuckets, Granularity};
use cobranza::{validate, ApiClient, CobranzaError, Config, FileTokenStore, Result, Session};

#[derive(Parser)]
#[command(name = "cobranza")]
#[command(version, about = "Installment collection CLI for workers and administrators", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.cobranza)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Log in and store the session token
    Login {
        /// User name
        usuario: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored session token
    Logout,

    /// Show the role and name carried by the stored token
    Whoami,

    /// Show clients grouped into due today, overdue and upcoming
    Clientes {
        /// Classify against this local time instead of now (YYYY-MM-DDTHH:MM)
        #[arg(long)]
        ahora: Option<String>,

        /// All clients, including fully paid ones (administrador)
        #[arg(long)]
        todos: bool,

        /// Use instant comparison for today's payments (a client due later
        /// today is not listed until the due time passes)
        #[arg(long)]
        estricto: bool,
    },

    /// Show a client's details and payment history
    Cliente {
        /// Client id
        id: String,
    },

    /// Register a new client
    NuevoCliente {
        #[arg(long)]
        nombre: String,

        #[arg(long)]
        direccion: String,

        #[arg(long)]
        telefono: String,

        /// Product id from 'cobranza productos'
        #[arg(long)]
        producto: String,

        /// Total price of the piece
        #[arg(long)]
        precio: String,

        /// Payment frequency: diario or semanal
        #[arg(long, default_value = "semanal")]
        forma_pago: String,

        /// First payment date (YYYY-MM-DD)
        #[arg(long)]
        primer_pago: String,
    },

    /// Delete a client (administrador)
    EliminarCliente {
        id: String,
    },

    /// Record a payment for a client
    Abono {
        /// Client id
        cliente: String,

        /// Amount paid
        monto: String,
    },

    /// Record a visit where the client did not pay
    NoAbono {
        /// Client id
        cliente: String,
    },

    /// Manage workers (administrador)
    Trabajadores {
        #[command(subcommand)]
        action: Option<TrabajadorAction>,
    },

    /// Manage the product catalog
    Productos {
        #[command(subcommand)]
        action: Option<ProductoAction>,
    },

    /// Manage product categories
    Categorias {
        #[command(subcommand)]
        action: Option<CategoriaAction>,
    },

    /// Export statistics to an xlsx workbook (administrador)
    Estadisticas {
        /// Export a single worker's statistics
        #[arg(short, long)]
        trabajador: Option<String>,

        /// Open the workbook after writing it
        #[arg(long)]
        abrir: bool,
    },
}

#[derive(Subcommand)]
enum TrabajadorAction {
    /// List workers
    List,
    /// Add a worker
    Add {
        #[arg(long)]
        nombre: String,
        #[arg(long)]
        usuario: String,
        #[arg(long)]
        password: String,
        /// administrador or trabajador
        #[arg(long, default_value = "trabajador")]
        rol: String,
    },
    /// Remove a worker
    Remove { id: String },
}

#[derive(Subcommand)]
enum ProductoAction {
    /// List products
    List,
    /// Add a product
    Add {
        #[arg(long)]
        nombre: String,
        #[arg(long)]
        precio: String,
        /// Category id from 'cobranza categorias'
        #[arg(long)]
        categoria: Option<String>,
    },
    /// Remove a product
    Remove { id: String },
}

#[derive(Subcommand)]
enum CategoriaAction {
    /// List categories
    List,
    /// Add a category
    Add { nombre: String },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Login { usuario, password } => cmd_login(&cfg_dir, &usuario, &password),
        Commands::Logout => cmd_logout(&cfg_dir),
        Commands::Whoami => cmd_whoami(&cfg_dir),
        Commands::Clientes {
            ahora,
            todos,
            estricto,
        } => cmd_clientes(&cfg_dir, ahora, todos, estricto),
        Commands::Cliente { id } => cmd_cliente(&cfg_dir, &id),
        Commands::NuevoCliente {
            nombre,
            direccion,
            telefono,
            producto,
            precio,
            forma_pago,
            primer_pago,
        } => {
            let nuevo = NuevoCliente {
                nombre: validate::required("nombre", &nombre)?,
                direccion: validate::required("direccion", &direccion)?,
                telefono: validate::phone(&telefono)?,
                producto_id: validate::required("producto", &producto)?,
                precio_total: validate::amount("precio", &precio)?,
                forma_pago: forma_pago.parse::<FormaPago>()?,
                fecha_proximo_pago: validate::date("primer pago", &primer_pago)?
                    .format("%Y-%m-%d")
                    .to_string(),
            };
            cmd_nuevo_cliente(&cfg_dir, &nuevo)
        }
        Commands::EliminarCliente { id } => cmd_eliminar_cliente(&cfg_dir, &id),
        Commands::Abono { cliente, monto } => {
            let monto = validate::amount("monto", &monto)?;
            cmd_abono(&cfg_dir, &cliente, monto)
        }
        Commands::NoAbono { cliente } => cmd_no_abono(&cfg_dir, &cliente),
        Commands::Trabajadores { action } => cmd_trabajadores(&cfg_dir, action),
        Commands::Productos { action } => cmd_productos(&cfg_dir, action),
        Commands::Categorias { action } => cmd_categorias(&cfg_dir, action),
        Commands::Estadisticas { trabajador, abrir } => {
            cmd_estadisticas(&cfg_dir, trabajador, abrir)
        }
    }
}

/// Config, API client and stored session, in that order. A missing token
/// stops here before any request goes out.
fn connect(cfg_dir: &Path) -> Result<(Config, ApiClient, Session)> {
    let config = load_config(cfg_dir)?;
    let session = Session::load(&FileTokenStore::new(cfg_dir))?;
    let api = ApiClient::new(&config.api);
    Ok((config, api, session))
}

fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(CobranzaError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized cobranza config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point it at your API:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Log in:                cobranza login <usuario> --password <password>");

    Ok(())
}

fn cmd_login(cfg_dir: &Path, usuario: &str, password: &str) -> Result<()> {
    let usuario = validate::required("usuario", usuario)?;
    let password = validate::required("password", password)?;
    let config = load_config(cfg_dir)?;
    let api = ApiClient::new(&config.api);

    let session = api.login(&usuario, &password)?;
    session.save(&FileTokenStore::new(cfg_dir))?;

    match session.role() {
        Ok(rol) => println!("Logged in as {usuario} ({rol})"),
        Err(_) => println!("Logged in as {usuario}"),
    }
    Ok(())
}

fn cmd_logout(cfg_dir: &Path) -> Result<()> {
    Session::clear(&FileTokenStore::new(cfg_dir))?;
    println!("Logged out");
    Ok(())
}

fn cmd_whoami(cfg_dir: &Path) -> Result<()> {
    let session = Session::load(&FileTokenStore::new(cfg_dir))?;
    let claims = session.claims()?;

    let rol = claims
        .rol
        .map(|r| r.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    match &claims.nombre {
        Some(nombre) => println!("{nombre} ({rol})"),
        None => println!("{rol}"),
    }
    if claims.is_expired(Utc::now().timestamp()) {
        println!("Session expired. Run 'cobranza login' again.");
    }
    Ok(())
}

#[derive(Tabled)]
struct ClienteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NOMBRE")]
    nombre: String,
    #[tabled(rename = "TELEFONO")]
    telefono: String,
    #[tabled(rename = "DEBE")]
    debe: String,
    #[tabled(rename = "PROXIMO PAGO")]
    proximo_pago: String,
    #[tabled(rename = "FORMA")]
    forma: String,
}

#[derive(Tabled)]
struct AbonoRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "FECHA")]
    fecha: String,
    #[tabled(rename = "MONTO")]
    monto: String,
    #[tabled(rename = "ESTADO")]
    estado: String,
}

#[derive(Tabled)]
struct TrabajadorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NOMBRE")]
    nombre: String,
    #[tabled(rename = "USUARIO")]
    usuario: String,
    #[tabled(rename = "ROL")]
    rol: String,
}

#[derive(Tabled)]
struct ProductoRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NOMBRE")]
    nombre: String,
    #[tabled(rename = "PRECIO")]
    precio: String,
    #[tabled(rename = "CATEGORIA")]
    categoria: String,
}

#[derive(Tabled)]
struct CategoriaRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NOMBRE")]
    nombre: String,
}

fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// "$1,234.50"
fn format_money(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!(
        "{}${}.{:02}",
        sign,
        format_grouped_int((cents / 100) as i64),
        cents % 100
    )
}

fn display_date(raw: &str) -> String {
    parse_local_datetime(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn cliente_rows(clientes: &[Cliente]) -> Vec<ClienteRow> {
    clientes
        .iter()
        .map(|c| ClienteRow {
            id: c.id.clone(),
            nombre: c.nombre.clone(),
            telefono: c.telefono.clone(),
            debe: format_money(c.monto_actual),
            proximo_pago: display_date(&c.fecha_proximo_pago),
            forma: c.forma_pago.to_string(),
        })
        .collect()
}

fn print_bucket(title: &str, clientes: &[Cliente]) {
    println!("{} ({})", title, clientes.len());
    if clientes.is_empty() {
        println!("  Nadie.");
    } else {
        let table = Table::new(cliente_rows(clientes))
            .with(Style::rounded())
            .to_string();
        println!("{table}");
    }
    println!();
}

fn cmd_clientes(
    cfg_dir: &Path,
    ahora: Option<String>,
    todos: bool,
    estricto: bool,
) -> Result<()> {
    let now: NaiveDateTime = match ahora {
        Some(s) => parse_local_datetime(&s).ok_or_else(|| CobranzaError::MalformedInput {
            field: "--ahora".to_string(),
            reason: format!("'{s}' (expected YYYY-MM-DDTHH:MM)"),
        })?,
        None => Local::now().naive_local(),
    };
    let mode = if estricto {
        Granularity::Mixed
    } else {
        Granularity::CalendarDay
    };

    let (_, api, session) = connect(cfg_dir)?;

    let clientes = if todos {
        session.require_admin()?;
        api.clientes(&session)?
    } else {
        ClientBuckets::active_only(&api.mis_clientes(&session)?)
    };

    let buckets = classify(&clientes, now, mode)?;

    print_bucket("Cobrar hoy", &buckets.due_today);
    print_bucket("Atrasados", &buckets.overdue);
    print_bucket("Proximos", &buckets.upcoming);

    let owed: f64 = buckets
        .due_today
        .iter()
        .chain(&buckets.overdue)
        .map(|c| c.monto_actual)
        .sum();
    println!("Total pendiente (hoy + atrasados): {}", format_money(owed));

    Ok(())
}

fn cmd_cliente(cfg_dir: &Path, id: &str) -> Result<()> {
    let (_, api, session) = connect(cfg_dir)?;

    let cliente = api.cliente(&session, id)?;
    let mut abonos = api.abonos(&session, id)?;
    sort_recent_first(&mut abonos);

    println!("{} ({})", cliente.nombre, cliente.id);
    println!("{}", "-".repeat(50));
    println!("Direccion:     {}", cliente.direccion);
    println!("Telefono:      {}", cliente.telefono);
    println!("Precio total:  {}", format_money(cliente.precio_total));
    println!("Debe:          {}", format_money(cliente.monto_actual));
    println!("Forma de pago: {}", cliente.forma_pago);
    if cliente.is_paid() {
        println!("Proximo pago:  liquidado");
    } else {
        println!(
            "Proximo pago:  {}",
            display_date(&cliente.fecha_proximo_pago)
        );
    }
    println!();

    if abonos.is_empty() {
        println!("Sin abonos registrados.");
        return Ok(());
    }

    let rows: Vec<AbonoRow> = abonos
        .iter()
        .enumerate()
        .map(|(idx, a)| AbonoRow {
            index: idx + 1,
            fecha: display_date(&a.fecha),
            monto: format_money(a.monto),
            estado: a.estado.to_string(),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    let pagado: f64 = abonos.iter().map(|a| a.monto).sum();
    println!("Total abonado: {}", format_money(pagado));

    Ok(())
}

fn cmd_nuevo_cliente(cfg_dir: &Path, nuevo: &NuevoCliente) -> Result<()> {
    let (_, api, session) = connect(cfg_dir)?;
    let cliente = api.crear_cliente(&session, nuevo)?;

    println!("Registered {} ({})", cliente.nombre, cliente.id);
    println!("  Debe:         {}", format_money(cliente.monto_actual));
    println!(
        "  Primer pago:  {}",
        display_date(&cliente.fecha_proximo_pago)
    );
    Ok(())
}

fn cmd_eliminar_cliente(cfg_dir: &Path, id: &str) -> Result<()> {
    let (_, api, session) = connect(cfg_dir)?;
    session.require_admin()?;
    api.eliminar_cliente(&session, id)?;
    println!("Deleted client {id}");
    Ok(())
}

fn cmd_abono(cfg_dir: &Path, cliente_id: &str, monto: f64) -> Result<()> {
    let (_, api, session) = connect(cfg_dir)?;
    api.registrar_abono(&session, cliente_id, monto)?;

    // The server recomputes the balance; show what it says now.
    let cliente = api.cliente(&session, cliente_id)?;
    if cliente.is_paid() {
        println!(
            "Recorded {} payment for {} (fully paid)",
            format_money(monto),
            cliente.nombre
        );
    } else {
        println!(
            "Recorded {} payment for {} ({} remaining, next payment {})",
            format_money(monto),
            cliente.nombre,
            format_money(cliente.monto_actual),
            display_date(&cliente.fecha_proximo_pago)
        );
    }
    Ok(())
}

fn cmd_no_abono(cfg_dir: &Path, cliente_id: &str) -> Result<()> {
    let (_, api, session) = connect(cfg_dir)?;
    api.registrar_no_abono(&session, cliente_id)?;
    println!("Recorded missed payment for client {cliente_id}");
    Ok(())
}

fn cmd_trabajadores(cfg_dir: &Path, action: Option<TrabajadorAction>) -> Result<()> {
    let (_, api, session) = connect(cfg_dir)?;
    session.require_admin()?;

    match action.unwrap_or(TrabajadorAction::List) {
        TrabajadorAction::List => {
            let trabajadores = api.trabajadores(&session)?;
            if trabajadores.is_empty() {
                println!("No workers registered.");
                return Ok(());
            }
            let rows: Vec<TrabajadorRow> = trabajadores
                .into_iter()
                .map(|t| TrabajadorRow {
                    id: t.id,
                    nombre: t.nombre,
                    usuario: t.usuario,
                    rol: t.rol.to_string(),
                })
                .collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
        TrabajadorAction::Add {
            nombre,
            usuario,
            password,
            rol,
        } => {
            let nuevo = NuevoTrabajador {
                nombre: validate::required("nombre", &nombre)?,
                usuario: validate::required("usuario", &usuario)?,
                password: validate::required("password", &password)?,
                rol: rol.parse::<Rol>()?,
            };
            let creado = api.crear_trabajador(&session, &nuevo)?;
            println!("Added {} ({}, {})", creado.nombre, creado.id, creado.rol);
        }
        TrabajadorAction::Remove { id } => {
            api.eliminar_trabajador(&session, &id)?;
            println!("Removed worker {id}");
        }
    }
    Ok(())
}

fn cmd_productos(cfg_dir: &Path, action: Option<ProductoAction>) -> Result<()> {
    let (_, api, session) = connect(cfg_dir)?;

    match action.unwrap_or(ProductoAction::List) {
        ProductoAction::List => {
            let productos = api.productos(&session)?;
            if productos.is_empty() {
                println!("No products in the catalog.");
                return Ok(());
            }
            let categorias = api.categorias(&session)?;
            let rows: Vec<ProductoRow> = productos
                .into_iter()
                .map(|p| {
                    let categoria = p
                        .categoria_id
                        .as_ref()
                        .and_then(|id| categorias.iter().find(|c| &c.id == id))
                        .map(|c| c.nombre.clone())
                        .unwrap_or_default();
                    ProductoRow {
                        id: p.id,
                        nombre: p.nombre,
                        precio: format_money(p.precio),
                        categoria,
                    }
                })
                .collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
        ProductoAction::Add {
            nombre,
            precio,
            categoria,
        } => {
            session.require_admin()?;
            let nuevo = NuevoProducto {
                nombre: validate::required("nombre", &nombre)?,
                precio: validate::amount("precio", &precio)?,
                categoria_id: categoria,
            };
            let creado = api.crear_producto(&session, &nuevo)?;
            println!(
                "Added {} ({}) at {}",
                creado.nombre,
                creado.id,
                format_money(creado.precio)
            );
        }
        ProductoAction::Remove { id } => {
            session.require_admin()?;
            api.eliminar_producto(&session, &id)?;
            println!("Removed product {id}");
        }
    }
    Ok(())
}

fn cmd_categorias(cfg_dir: &Path, action: Option<CategoriaAction>) -> Result<()> {
    let (_, api, session) = connect(cfg_dir)?;

    match action.unwrap_or(CategoriaAction::List) {
        CategoriaAction::List => {
            let categorias = api.categorias(&session)?;
            if categorias.is_empty() {
                println!("No categories.");
                return Ok(());
            }
            let rows: Vec<CategoriaRow> = categorias
                .into_iter()
                .map(|c| CategoriaRow {
                    id: c.id,
                    nombre: c.nombre,
                })
                .collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
        CategoriaAction::Add { nombre } => {
            session.require_admin()?;
            let nombre = validate::required("nombre", &nombre)?;
            let creada = api.crear_categoria(&session, &nombre)?;
            println!("Added category {} ({})", creada.nombre, creada.id);
        }
    }
    Ok(())
}

fn cmd_estadisticas(cfg_dir: &Path, trabajador: Option<String>, abrir: bool) -> Result<()> {
    let (config, api, session) = connect(cfg_dir)?;
    session.require_admin()?;

    let output_dir = resolve_output_dir(config.export.output_dir.as_deref(), cfg_dir);
    let sink = FileSink::new(output_dir, abrir || config.export.open);
    let now = Local::now().naive_local();

    let outcome = match trabajador {
        Some(id) => {
            let prefix = format!("{}-trabajador-{}", config.export.file_prefix, id);
            export_statistics(
                || api.estadisticas_trabajador(&session, &id),
                &worker_columns(),
                &sink,
                &export_file_name(&prefix, now),
            )?
        }
        None => export_statistics(
            || api.estadisticas(&session),
            &general_columns(),
            &sink,
            &export_file_name(&config.export.file_prefix, now),
        )?,
    };

    println!("Exported {} rows", outcome.rows);
    println!("  Saved: {}", outcome.path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_grouping() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(1234.5), "$1,234.50");
        assert_eq!(format_money(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_money(-12.5), "-$12.50");
    }

    #[test]
    fn money_saturated_negative_does_not_overflow() {
        let formatted = format_money(-1e18);
        assert!(formatted.starts_with("-$92,233,720,368,547,758."));
    }

    #[test]
    fn display_date_falls_back_to_raw() {
        assert_eq!(display_date("2024-06-10T09:00:00"), "2024-06-10 09:00");
        assert_eq!(display_date("pronto"), "pronto");
    }
}
