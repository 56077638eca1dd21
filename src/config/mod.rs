mod settings;

pub use settings::{ApiSettings, Config, ExportSettings};

use crate::error::{CobranzaError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir, or ~/.cobranza/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "cobranza") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        CobranzaError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".cobranza"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the export directory. Relative paths are taken from the config
/// directory; no setting means a transient directory under the system temp dir.
pub fn resolve_output_dir(setting: Option<&str>, cfg_dir: &Path) -> PathBuf {
    match setting.map(str::trim).filter(|s| !s.is_empty()) {
        Some(dir) => {
            let path = expand_path(dir);
            if path.is_absolute() {
                path
            } else {
                cfg_dir.join(path)
            }
        }
        None => std::env::temp_dir().join("cobranza"),
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(CobranzaError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(CobranzaError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    parse_config(&content).map_err(|e| CobranzaError::ConfigParse { path, source: e })
}

pub fn parse_config(content: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(content)
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
base_url = "https://api.example.com"
timeout_secs = 15

[export]
# output_dir = "~/Documents/cobranza"   # optional, defaults to the system temp dir
file_prefix = "estadisticas"
open = false   # open the workbook after exporting
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses() {
        let config = parse_config(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.export.output_dir, None);
        assert!(!config.export.open);
    }

    #[test]
    fn export_section_is_optional() {
        let config = parse_config("[api]\nbase_url = \"http://localhost:3000\"\n").unwrap();
        assert_eq!(config.export.file_prefix, "estadisticas");
        assert_eq!(config.api.timeout_secs, 15);
    }

    #[test]
    fn relative_output_dir_is_under_config_dir() {
        let dir = resolve_output_dir(Some("exports"), Path::new("/etc/cobranza"));
        assert_eq!(dir, PathBuf::from("/etc/cobranza/exports"));
    }

    #[test]
    fn missing_output_dir_uses_temp() {
        let dir = resolve_output_dir(None, Path::new("/etc/cobranza"));
        assert!(dir.starts_with(std::env::temp_dir()));
        let blank = resolve_output_dir(Some("  "), Path::new("/etc/cobranza"));
        assert_eq!(dir, blank);
    }
}
