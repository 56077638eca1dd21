pub mod api;
pub mod config;
pub mod dates;
pub mod error;
pub mod export;
pub mod models;
pub mod session;
pub mod status;
pub mod validate;

pub use api::ApiClient;
pub use config::{ApiSettings, Config, ExportSettings};
pub use error::{CobranzaError, Result};
pub use export::{export_statistics, ColumnSpec, ExportSink, FileSink, Row};
pub use models::{Abono, Cliente, FormaPago, Rol, StatRecord};
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
pub use status::{classify, ClientBuckets, Granularity};
