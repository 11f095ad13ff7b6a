//! Custom error types for espfatfs

use std::fmt;
use std::path::PathBuf;

/// Main error type for espfatfs operations
///
/// Every variant is terminal for the current invocation; the workflow stops on
/// the first one it hits.
#[derive(Debug)]
pub enum EspFatfsError {
    /// `target_platform` is not one FatFS images can be built for
    UnsupportedPlatform(String),
    /// The board has no `build.partitions` preference (board name)
    PartitionsUndefined(String),
    /// The partition CSV named by `build.partitions` does not exist
    PartitionsFileMissing(PathBuf),
    /// No line carries the tag, or the resolved size is zero (tag)
    PartitionNotFound(String),
    /// A tagged line could not be read as `name, type, subtype, offset, size`
    InvalidPartitionEntry { line: String, reason: String },
    /// None of the candidate locations holds the tool
    ToolNotFound { tool: String, searched: Vec<PathBuf> },
    /// `serial.port` is empty, so there is nowhere to upload to
    SerialPortUndefined,
    /// The user declined to build an image from an empty data folder
    BuildCancelled,
    /// The image builder exited non-zero (exit code, captured stderr)
    ImageBuildFailed { code: i32, stderr: String },
    /// The flasher exited non-zero (exit code, captured stderr)
    UploadFailed { code: i32, stderr: String },
    /// The subprocess could not be started or its output could not be read
    ProcessSpawnFailed { program: String, source: std::io::Error },
    /// Configuration or preference file errors
    Config(String),
    /// General I/O errors
    Io(std::io::Error),
}

impl fmt::Display for EspFatfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EspFatfsError::UnsupportedPlatform(platform) => {
                write!(f, "FatFS Not Supported on {}", platform)
            }
            EspFatfsError::PartitionsUndefined(board) => {
                write!(f, "Partitions Not Defined for {}", board)
            }
            EspFatfsError::PartitionsFileMissing(path) => write!(
                f,
                "FatFS Error: partitions file {} not found!",
                path.display()
            ),
            EspFatfsError::PartitionNotFound(tag) => write!(
                f,
                "FatFS Error: partition size could not be found! (no usable '{}' entry)",
                tag
            ),
            EspFatfsError::InvalidPartitionEntry { line, reason } => {
                write!(f, "FatFS Error: bad partition entry '{}': {}", line, reason)
            }
            EspFatfsError::ToolNotFound { tool, searched } => {
                write!(f, "FatFS Error: {} not found!", tool)?;
                if !searched.is_empty() {
                    let paths: Vec<String> =
                        searched.iter().map(|p| p.display().to_string()).collect();
                    write!(f, " (searched: {})", paths.join(", "))?;
                }
                Ok(())
            }
            EspFatfsError::SerialPortUndefined => {
                write!(f, "FatFS Error: serial port not defined!")
            }
            EspFatfsError::BuildCancelled => write!(f, "FatFS Warning: mkfatfs canceled!"),
            EspFatfsError::ImageBuildFailed { code, .. } => {
                write!(f, "FatFS Create Failed! (exit code {})", code)
            }
            EspFatfsError::UploadFailed { code, .. } => {
                write!(f, "FatFS Upload failed! (exit code {})", code)
            }
            EspFatfsError::ProcessSpawnFailed { program, source } => {
                write!(f, "Failed to run {}: {}", program, source)
            }
            EspFatfsError::Config(msg) => write!(f, "Configuration error: {}", msg),
            EspFatfsError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for EspFatfsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EspFatfsError::Io(err) => Some(err),
            EspFatfsError::ProcessSpawnFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl EspFatfsError {
    /// Captured stderr of a failed subprocess, if this error carries one
    pub fn captured_stderr(&self) -> Option<&str> {
        match self {
            EspFatfsError::ImageBuildFailed { stderr, .. }
            | EspFatfsError::UploadFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EspFatfsError {
    fn from(err: std::io::Error) -> Self {
        EspFatfsError::Io(err)
    }
}

impl From<toml::de::Error> for EspFatfsError {
    fn from(err: toml::de::Error) -> Self {
        EspFatfsError::Config(err.to_string())
    }
}

/// Result type alias for espfatfs operations
pub type Result<T> = std::result::Result<T, EspFatfsError>;
