//! Core unit tests for espfatfs CLI inputs
//!
//! Configuration files, board preference files, command line parsing and
//! partition table lookup as the CLI wires them together.


use clap::Parser;
use espfatfs::EspFatfsError;
use espfatfs::cli::{Cli, Commands};
use espfatfs::config::{AppConfig, BoardPreferences, KEY_PARTITIONS, KEY_SERIAL_PORT};
use espfatfs::models::RuntimeOs;
use espfatfs::services::{PartitionTableParser, ToolLocator, Workflow};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use test_fixtures::{DEFAULT_FFAT_CSV, PlatformFixture};
use tokio::sync::mpsc;

#[test]
fn test_config_file_loading() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
platform_dir = "/opt/arduino15/packages/esp32/hardware/esp32/2.0.17"
partition_tag = "fatfs"
ota_port = 8266
interpreter = "python3"
"#,
    )
    .unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.partition_tag, "fatfs");
    assert_eq!(config.ota_port, 8266);
    assert_eq!(config.interpreter.as_deref(), Some("python3"));
    assert_eq!(config.reservation, 4096);
}

#[test]
fn test_explicit_missing_config_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = AppConfig::load(Some(&temp_dir.path().join("nope.toml"))).unwrap_err();
    assert!(matches!(err, EspFatfsError::Config(_)));
}

#[test]
fn test_prefs_file_with_cli_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let prefs_path = temp_dir.path().join("board.txt");
    fs::write(
        &prefs_path,
        "# exported from the IDE\nname=ESP32 Dev Module\nbuild.partitions=default\nserial.port=COM3\n",
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "espfatfs",
        "upload",
        "--prefs",
        prefs_path.to_str().unwrap(),
        "--partitions",
        "default_ffat",
    ])
    .unwrap();
    let Commands::Upload { sketch } = &cli.command else {
        panic!("expected upload command");
    };

    let prefs = sketch.preferences().unwrap();
    assert_eq!(prefs.get(KEY_PARTITIONS), Some("default_ffat"));
    assert_eq!(prefs.get(KEY_SERIAL_PORT), Some("COM3"));
}

#[test]
fn test_missing_prefs_file_is_config_error() {
    let err = BoardPreferences::load_file(&PathBuf::from("/nonexistent/board.txt")).unwrap_err();
    assert!(matches!(err, EspFatfsError::Config(_)));
}

#[test]
fn test_partition_lookup_through_platform_folder() {
    let fx = PlatformFixture::new();
    fx.write_partitions("default_ffat", DEFAULT_FFAT_CSV);

    let (tx, _rx) = mpsc::unbounded_channel();
    let prefs = BoardPreferences::parse("build.partitions=default_ffat").unwrap();
    let workflow = Workflow::new(fx.config(), prefs, fx.request(), tx);

    let resolved = workflow.parse_partition().unwrap();
    assert_eq!(resolved.offset, 0x291000);
    assert_eq!(resolved.size, 0x16F000);
}

#[test]
fn test_missing_scheme_file_is_reported() {
    let fx = PlatformFixture::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    let prefs = BoardPreferences::parse("build.partitions=huge_app").unwrap();
    let workflow = Workflow::new(fx.config(), prefs, fx.request(), tx);

    match workflow.parse_partition() {
        Err(EspFatfsError::PartitionsFileMissing(path)) => {
            assert!(path.ends_with("tools/partitions/huge_app.csv"));
        }
        other => panic!("Expected PartitionsFileMissing, got: {:?}", other),
    }
}

#[test]
fn test_custom_tag_selects_other_partition() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("custom.csv");
    fs::write(
        &path,
        "nvs,data,nvs,0x9000,0x5000,\nstorage,data,fat,0x300000,0x100000,\n",
    )
    .unwrap();

    assert!(matches!(
        PartitionTableParser::new("ffat", 4096).parse_file(&path),
        Err(EspFatfsError::PartitionNotFound(_))
    ));
    let resolved = PartitionTableParser::new("storage", 4096)
        .parse_file(&path)
        .unwrap();
    assert_eq!(resolved.offset, 0x301000);
}

#[test]
fn test_install_path_preference_is_searched() {
    let temp_dir = TempDir::new().unwrap();
    let install = temp_dir.path().join("mkfatfs-2.0.1");
    fs::create_dir_all(&install).unwrap();
    fs::write(install.join("mkfatfs.exe"), b"MZ").unwrap();

    let config = AppConfig::default();
    let prefs = BoardPreferences::parse(&format!(
        "runtime.os=windows\nruntime.tools.mkfatfs.path={}",
        install.display()
    ))
    .unwrap();

    let locator = ToolLocator::from_settings(&config, &prefs);
    assert_eq!(locator.os(), RuntimeOs::Windows);
    assert_eq!(
        locator
            .locate(espfatfs::models::ToolKind::ImageBuilder)
            .unwrap(),
        install.join("mkfatfs.exe")
    );
}
