//! Application configuration management

use crate::errors::{EspFatfsError, Result};
use crate::models::{DEFAULT_OTA_PORT, DEFAULT_RESERVATION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Hardware platform folder (holds `tools/` and `tools/partitions/`)
    pub platform_dir: Option<PathBuf>,
    /// Text a partition table line must contain to be the FatFS entry
    pub partition_tag: String,
    /// Bytes reserved at the start of the partition
    pub reservation: u64,
    pub page_size: u32,
    pub block_size: u32,
    /// Hand page and block size to the image builder
    pub pass_geometry: bool,
    pub ota_port: u16,
    /// Value passed to `esptool --chip`
    pub chip: String,
    /// Used when the board has no `upload.speed`
    pub default_baud: String,
    /// Used when the board has no `build.flash_mode`
    pub default_flash_mode: String,
    /// Used when the board has no `build.flash_freq`
    pub default_flash_freq: String,
    /// Interpreter for `.py` tools; defaults per OS
    pub interpreter: Option<String>,
    /// Fall back to `PATH` when a tool is not in any platform folder
    pub search_path: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            platform_dir: None,
            partition_tag: "ffat".to_string(),
            reservation: DEFAULT_RESERVATION,
            page_size: 256,
            block_size: 4096,
            pass_geometry: false,
            ota_port: DEFAULT_OTA_PORT,
            chip: "esp32".to_string(),
            default_baud: "921600".to_string(),
            default_flash_mode: "dio".to_string(),
            default_flash_freq: "80m".to_string(),
            interpreter: None,
            search_path: false,
        }
    }
}

impl AppConfig {
    /// `<config dir>/espfatfs/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(crate::APP_NAME).join("config.toml"))
    }

    /// Load from an explicit path, else from the default path if it exists,
    /// else fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    log::debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        log::debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(&path).map_err(|e| {
            EspFatfsError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EspFatfsError::Config(e.to_string()))
    }
}
