//! Board and IDE preferences as a flat key-value store
//!
//! The keys follow the Arduino naming (`build.partitions`, `upload.speed`,
//! `serial.port`, ...). Values come from a `key=value` file and are then
//! overridden from the command line.

use crate::errors::{EspFatfsError, Result};
use crate::models::RuntimeOs;
use std::collections::HashMap;
use std::path::Path;

pub const KEY_NAME: &str = "name";
pub const KEY_PARTITIONS: &str = "build.partitions";
pub const KEY_UPLOAD_SPEED: &str = "upload.speed";
pub const KEY_FLASH_MODE: &str = "build.flash_mode";
pub const KEY_FLASH_FREQ: &str = "build.flash_freq";
pub const KEY_BUILD_PATH: &str = "build.path";
pub const KEY_SERIAL_PORT: &str = "serial.port";
pub const KEY_TARGET_PLATFORM: &str = "target_platform";
pub const KEY_RUNTIME_OS: &str = "runtime.os";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardPreferences {
    values: HashMap<String, String>,
}

impl BoardPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EspFatfsError::Config(format!(
                "Failed to read preferences {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// Parse `key=value` lines; blank lines and `#` comments are skipped
    pub fn parse(content: &str) -> Result<Self> {
        let mut prefs = Self::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                EspFatfsError::Config(format!(
                    "line {}: expected key=value, got '{}'",
                    index + 1,
                    line
                ))
            })?;
            prefs.set(key.trim(), value.trim());
        }
        Ok(prefs)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// Apply a `key=value` override from the command line
    pub fn apply_override(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            EspFatfsError::Config(format!("expected key=value, got '{}'", assignment))
        })?;
        self.set(key.trim(), value.trim());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Like `get`, but empty values count as missing
    pub fn get_nonempty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Fill in the host defaults for keys the IDE would normally provide
    pub fn with_defaults(mut self) -> Self {
        if !self.contains(KEY_TARGET_PLATFORM) {
            self.set(KEY_TARGET_PLATFORM, "esp32");
        }
        if !self.contains(KEY_RUNTIME_OS) {
            self.set(KEY_RUNTIME_OS, RuntimeOs::host().as_pref());
        }
        self
    }

    pub fn runtime_os(&self) -> RuntimeOs {
        self.get(KEY_RUNTIME_OS)
            .map(RuntimeOs::from_pref)
            .unwrap_or_else(RuntimeOs::host)
    }

    /// Board name for messages
    pub fn board_name(&self) -> &str {
        self.get_nonempty(KEY_NAME).unwrap_or("this board")
    }
}
