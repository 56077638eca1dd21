use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CobranzaError {
    #[error("Config directory not found at {0}. Run 'cobranza init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Not logged in. Run 'cobranza login' first.")]
    AuthenticationMissing,

    #[error("This command requires the administrador role")]
    Forbidden,

    #[error("Network error calling {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("API returned status {status} for {url}")]
    Api { url: String, status: u16 },

    #[error("Unexpected response from {url}: {source}")]
    ApiSchema {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {field}: {reason}")]
    MalformedInput { field: String, reason: String },

    #[error("Client {client} has an invalid due date '{value}'")]
    InvalidDueDate { client: String, value: String },

    #[error("Invalid date '{0}' in statistics record")]
    InvalidStatDate(String),

    #[error("Token could not be decoded: {0}")]
    InvalidToken(String),

    #[error("Export failed: {0}")]
    ExportFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CobranzaError {
    pub(crate) fn malformed(field: &str, reason: impl Into<String>) -> Self {
        CobranzaError::MalformedInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for CobranzaError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        CobranzaError::ExportFailure(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CobranzaError>;
