//! External executables the workflow drives

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Host operating system as reported by the `runtime.os` preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuntimeOs {
    Windows,
    MacOsx,
    Linux,
}

impl RuntimeOs {
    /// Parse an Arduino-style `runtime.os` value; unknown values count as Linux
    pub fn from_pref(value: &str) -> Self {
        match value.trim() {
            "windows" => RuntimeOs::Windows,
            "macosx" | "macos" => RuntimeOs::MacOsx,
            _ => RuntimeOs::Linux,
        }
    }

    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => RuntimeOs::Windows,
            "macos" => RuntimeOs::MacOsx,
            _ => RuntimeOs::Linux,
        }
    }

    pub fn as_pref(&self) -> &'static str {
        match self {
            RuntimeOs::Windows => "windows",
            RuntimeOs::MacOsx => "macosx",
            RuntimeOs::Linux => "linux",
        }
    }

    /// Interpreter used for `.py` tools
    pub fn default_interpreter(&self) -> &'static str {
        match self {
            RuntimeOs::Windows => "python.exe",
            _ => "python",
        }
    }

    /// File names tried for a tool, native executable first
    pub fn tool_file_names(&self, stem: &str) -> Vec<String> {
        match self {
            RuntimeOs::Windows => vec![format!("{}.exe", stem), format!("{}.py", stem)],
            _ => vec![stem.to_string(), format!("{}.py", stem)],
        }
    }
}

/// The three tools the workflow knows how to find
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ToolKind {
    ImageBuilder,
    SerialFlasher,
    NetworkFlasher,
}

impl ToolKind {
    pub fn stem(&self) -> &'static str {
        match self {
            ToolKind::ImageBuilder => "mkfatfs",
            ToolKind::SerialFlasher => "esptool",
            ToolKind::NetworkFlasher => "espota",
        }
    }

    /// Tool-specific folder under the platform's `tools` folder
    pub fn subdir(&self) -> &'static str {
        match self {
            ToolKind::ImageBuilder => "mkfatfs",
            ToolKind::SerialFlasher => "esptool_py",
            ToolKind::NetworkFlasher => "espota",
        }
    }

    /// Preference holding the tool's install folder
    pub fn install_path_key(&self) -> &'static str {
        match self {
            ToolKind::ImageBuilder => "runtime.tools.mkfatfs.path",
            ToolKind::SerialFlasher => "runtime.tools.esptool_py.path",
            ToolKind::NetworkFlasher => "runtime.tools.espota.path",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

/// Resolved tool locations; only the flasher the destination needs is set
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolPaths {
    pub image_builder: PathBuf,
    pub serial_flasher: Option<PathBuf>,
    pub network_flasher: Option<PathBuf>,
}

impl ToolPaths {
    /// Record a located flasher; the image builder is set on construction
    pub fn set_flasher(&mut self, kind: ToolKind, path: PathBuf) {
        match kind {
            ToolKind::SerialFlasher => self.serial_flasher = Some(path),
            ToolKind::NetworkFlasher => self.network_flasher = Some(path),
            ToolKind::ImageBuilder => self.image_builder = path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_file_names_per_os() {
        assert_eq!(
            RuntimeOs::Windows.tool_file_names("esptool"),
            vec!["esptool.exe", "esptool.py"]
        );
        assert_eq!(
            RuntimeOs::Linux.tool_file_names("mkfatfs"),
            vec!["mkfatfs", "mkfatfs.py"]
        );
    }

    #[test]
    fn test_runtime_os_round_trips_pref_names() {
        for os in [RuntimeOs::Windows, RuntimeOs::MacOsx, RuntimeOs::Linux] {
            assert_eq!(RuntimeOs::from_pref(os.as_pref()), os);
        }
        assert_eq!(RuntimeOs::from_pref("freebsd"), RuntimeOs::Linux);
    }
}
