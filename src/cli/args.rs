//! Command line argument parsing

use crate::config::{
    AppConfig, BoardPreferences, KEY_FLASH_FREQ, KEY_FLASH_MODE, KEY_PARTITIONS, KEY_RUNTIME_OS,
    KEY_SERIAL_PORT, KEY_TARGET_PLATFORM, KEY_UPLOAD_SPEED,
};
use crate::errors::Result;
use crate::services::WorkflowRequest;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "espfatfs")]
#[command(
    about = "📁 Pack a sketch's data folder into a FatFS image and upload it to an ESP32"
)]
pub struct Cli {
    /// Configuration file (defaults to <config dir>/espfatfs/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Decrease logging verbosity (only errors)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Append log records to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Print workflow events as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Build the FatFS image and upload it over serial or OTA
    Upload {
        #[command(flatten)]
        sketch: SketchArgs,
    },
    /// Build the FatFS image only
    Build {
        #[command(flatten)]
        sketch: SketchArgs,
    },
    /// Show the FatFS partition the image would be written to
    Partition {
        #[command(flatten)]
        sketch: SketchArgs,
    },
    /// Show which image builder and flasher would be used
    Tools {
        #[command(flatten)]
        sketch: SketchArgs,
    },
    /// List serial ports
    Ports,
    /// Write the effective configuration as TOML
    Config {
        /// Where to write it (defaults to the standard config path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Options shared by every command that works on a sketch
#[derive(Args, Clone, Debug, Default)]
pub struct SketchArgs {
    /// Sketch folder
    #[arg(long, default_value = ".")]
    pub sketch: PathBuf,

    /// Folder to pack (defaults to <sketch>/data)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Folder the image is written to
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Hardware platform folder containing tools/ and tools/partitions/
    #[arg(long)]
    pub platform_dir: Option<PathBuf>,

    /// Partition scheme name (build.partitions)
    #[arg(long)]
    pub partitions: Option<String>,

    /// Partition table CSV to use directly
    #[arg(long)]
    pub partitions_file: Option<PathBuf>,

    /// Board preferences file with key=value lines
    #[arg(long, value_name = "FILE")]
    pub prefs: Option<PathBuf>,

    /// Set a board preference, e.g. --set build.flash_mode=qio
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Serial port (e.g., /dev/ttyUSB0, COM3) or IPv4 address for OTA
    #[arg(short, long)]
    pub port: Option<String>,

    /// Serial upload speed
    #[arg(short, long)]
    pub baud: Option<u32>,

    #[arg(long)]
    pub flash_mode: Option<String>,

    #[arg(long)]
    pub flash_freq: Option<String>,

    /// Target platform (only esp32 is supported)
    #[arg(long)]
    pub target_platform: Option<String>,

    /// Host OS naming for tools: windows, macosx or linux
    #[arg(long)]
    pub os: Option<String>,

    /// Build an empty image without asking
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Also look for tools on PATH
    #[arg(long)]
    pub use_path: bool,
}

impl SketchArgs {
    /// Preferences file, then `--set`, then the dedicated flags
    pub fn preferences(&self) -> Result<BoardPreferences> {
        let mut prefs = match &self.prefs {
            Some(path) => BoardPreferences::load_file(path)?,
            None => BoardPreferences::new(),
        };

        for assignment in &self.set {
            prefs.apply_override(assignment)?;
        }

        let flags = [
            (KEY_PARTITIONS, &self.partitions),
            (KEY_SERIAL_PORT, &self.port),
            (KEY_FLASH_MODE, &self.flash_mode),
            (KEY_FLASH_FREQ, &self.flash_freq),
            (KEY_TARGET_PLATFORM, &self.target_platform),
            (KEY_RUNTIME_OS, &self.os),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                prefs.set(key, value);
            }
        }
        if let Some(baud) = self.baud {
            prefs.set(KEY_UPLOAD_SPEED, &baud.to_string());
        }

        Ok(prefs.with_defaults())
    }

    pub fn apply_to_config(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.platform_dir {
            config.platform_dir = Some(dir.clone());
        }
        if self.use_path {
            config.search_path = true;
        }
    }

    pub fn request(&self) -> WorkflowRequest {
        WorkflowRequest {
            sketch_dir: self.sketch.clone(),
            data_dir: self.data_dir.clone(),
            build_dir: self.build_dir.clone(),
            partitions_file: self.partitions_file.clone(),
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_prefs() {
        let cli = Cli::try_parse_from([
            "espfatfs",
            "upload",
            "--set",
            "serial.port=/dev/ttyUSB0",
            "--set",
            "upload.speed=115200",
            "--port",
            "192.168.4.1",
            "--partitions",
            "default_ffat",
        ])
        .unwrap();

        let Commands::Upload { sketch } = cli.command else {
            panic!("expected upload command");
        };
        let prefs = sketch.preferences().unwrap();
        assert_eq!(prefs.get(KEY_SERIAL_PORT), Some("192.168.4.1"));
        assert_eq!(prefs.get(KEY_UPLOAD_SPEED), Some("115200"));
        assert_eq!(prefs.get(KEY_PARTITIONS), Some("default_ffat"));
        assert_eq!(prefs.get(KEY_TARGET_PLATFORM), Some("esp32"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["espfatfs", "build", "-vv", "--json", "-y"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Build { sketch } if sketch.yes));
    }

    #[test]
    fn test_bad_set_assignment_is_rejected() {
        let args = SketchArgs {
            set: vec!["serial.port".to_string()],
            ..SketchArgs::default()
        };
        assert!(args.preferences().is_err());
    }

    #[test]
    fn test_platform_dir_flag_overrides_config() {
        let args = SketchArgs {
            platform_dir: Some(PathBuf::from("/hw/esp32")),
            use_path: true,
            ..SketchArgs::default()
        };
        let mut config = AppConfig::default();
        args.apply_to_config(&mut config);
        assert_eq!(config.platform_dir, Some(PathBuf::from("/hw/esp32")));
        assert!(config.search_path);
    }
}
