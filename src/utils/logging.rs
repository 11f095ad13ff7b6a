//! Logging utilities and initialization for espfatfs

use anyhow::{Context, Result};
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::io::Write;
use std::path::Path;

/// Map `-q` / `-v` flags to a level filter
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Initialize logging for the espfatfs CLI
///
/// Records go to stderr, or are appended to `log_file` when one is given, so
/// that stdout stays free for tool output and `--json` events.
pub fn init_cli_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let level = level_for(verbose, quiet);

    match log_file {
        Some(path) => init_file_logger(level, path)?,
        None => {
            Builder::from_default_env()
                .target(Target::Stderr)
                .filter_level(level)
                .format_timestamp_secs()
                .format_module_path(false)
                .init();
        }
    }

    // Initialize panic logging
    #[cfg(debug_assertions)]
    log_panics::init();

    log::debug!("espfatfs logging initialized with level: {:?}", level);
    Ok(())
}

fn init_file_logger(level: LevelFilter, path: &Path) -> Result<()> {
    use std::fs::OpenOptions;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    Builder::from_default_env()
        .target(Target::Pipe(Box::new(file)))
        .filter_level(level)
        .format_timestamp_secs()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                buf.timestamp(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .init();

    Ok(())
}
