use crate::cli::args::Cli;
use crate::config::AppConfig;
use anyhow::{Context, Result, anyhow};
use std::path::Path;

pub fn execute_config_command(cli: &Cli, output: Option<&Path>) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => AppConfig::default_path()
            .ok_or_else(|| anyhow!("Cannot determine the configuration directory"))?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(&path, config.to_toml_string()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("📝 Configuration written to {}", path.display());
    Ok(())
}
