use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub api: ApiSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExportSettings {
    /// Where exported workbooks land. Empty means the system temp directory.
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Open the workbook with the system viewer after writing it
    #[serde(default)]
    pub open: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_prefix: default_file_prefix(),
            open: false,
        }
    }
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_file_prefix() -> String {
    "estadisticas".to_string()
}
