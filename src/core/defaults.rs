use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::io;

pub const CONFIG_FILE: &str = "beyond.json";

/// Root configuration structure for beyond.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BeyondConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via beyond.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Directory the framework generated, relative to the project root.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    #[serde(default = "default_autoload")]
    pub autoload: AutoloadCommandConfig,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            autoload: default_autoload(),
        }
    }
}

/// Command that regenerates the autoload index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoloadCommandConfig {
    #[serde(default = "default_autoload_program")]
    pub program: String,

    #[serde(default = "default_autoload_args")]
    pub args: Vec<String>,
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_source_dir() -> String {
    "app".to_string()
}

fn default_autoload() -> AutoloadCommandConfig {
    AutoloadCommandConfig {
        program: default_autoload_program(),
        args: default_autoload_args(),
    }
}

fn default_autoload_program() -> String {
    "composer".to_string()
}

fn default_autoload_args() -> Vec<String> {
    vec!["dump-autoload".to_string()]
}

/// Load `beyond.json` from the project root, falling back to built-in
/// defaults when the file does not exist.
pub fn load_config(project_root: &Path) -> Result<BeyondConfig> {
    let path = project_root.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(BeyondConfig::default());
    }

    let raw = io::read_file(&path, "read beyond.json")?;
    serde_json::from_str(&raw).map_err(|e| Error::config_invalid_json(&path, e))
}
