//! CLI command implementations

pub mod build;
pub mod config;
pub mod partition;
pub mod ports;
pub mod tools;
pub mod upload;

use crate::cli::args::{Cli, Commands, SketchArgs};
use crate::config::{AppConfig, BoardPreferences};
use crate::services::Workflow;
use crate::utils::process::ProcessRunner;
use crate::utils::prompt::{Confirm, FixedAnswer, TerminalPrompt};
use anyhow::{Context, Result};
use tokio::sync::mpsc;

/// Execute a CLI command
pub async fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Upload { sketch } => upload::execute_upload_command(cli, sketch).await,
        Commands::Build { sketch } => build::execute_build_command(cli, sketch).await,
        Commands::Partition { sketch } => partition::execute_partition_command(cli, sketch),
        Commands::Tools { sketch } => tools::execute_tools_command(cli, sketch),
        Commands::Ports => ports::execute_ports_command(cli),
        Commands::Config { output } => config::execute_config_command(cli, output.as_deref()),
    }
}

/// Config file plus command line overrides
pub(crate) fn load_settings(
    cli: &Cli,
    sketch: &SketchArgs,
) -> Result<(AppConfig, BoardPreferences)> {
    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    sketch.apply_to_config(&mut config);
    let prefs = sketch
        .preferences()
        .context("Failed to load board preferences")?;
    Ok((config, prefs))
}

/// Workflow wired to the CLI's prompt and the given event sender
pub(crate) fn build_workflow(
    cli: &Cli,
    sketch: &SketchArgs,
    events: mpsc::UnboundedSender<crate::models::WorkflowEvent>,
) -> Result<Workflow> {
    let (config, prefs) = load_settings(cli, sketch)?;
    let confirm: Box<dyn Confirm> = if sketch.yes {
        Box::new(FixedAnswer(true))
    } else {
        Box::new(TerminalPrompt)
    };
    // With --json, stdout carries only event lines
    let runner = if cli.json {
        ProcessRunner::to_stderr()
    } else {
        ProcessRunner::new()
    };
    Ok(Workflow::new(config, prefs, sketch.request(), events)
        .with_runner(runner)
        .with_confirm(confirm))
}
