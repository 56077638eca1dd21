use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use super::workbook::decode_payload;
use crate::error::{CobranzaError, Result};

/// Receives an encoded export, stores it somewhere transient and shares it.
pub trait ExportSink {
    fn deliver(&self, file_name: &str, payload_b64: &str) -> Result<PathBuf>;
}

/// Writes the decoded payload into a directory and optionally opens it
/// with the system viewer.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    open: bool,
}

impl FileSink {
    pub fn new(dir: PathBuf, open: bool) -> Self {
        Self { dir, open }
    }
}

impl ExportSink for FileSink {
    fn deliver(&self, file_name: &str, payload_b64: &str) -> Result<PathBuf> {
        let bytes = decode_payload(payload_b64)?;
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, &bytes)?;
        debug!("wrote {} bytes to {}", bytes.len(), path.display());

        if self.open {
            open_path(&path)?;
            info!("opened {}", path.display());
        }
        Ok(path)
    }
}

pub fn open_path(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()
            .map_err(CobranzaError::Io)?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()
            .map_err(CobranzaError::Io)?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(path)
            .spawn()
            .map_err(CobranzaError::Io)?;
    }
    Ok(())
}
