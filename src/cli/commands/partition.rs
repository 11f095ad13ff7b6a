use crate::cli::args::{Cli, SketchArgs};
use crate::services::{PartitionTableParser, Workflow};
use anyhow::{Context, Result};
use tokio::sync::mpsc;

pub fn execute_partition_command(cli: &Cli, sketch: &SketchArgs) -> Result<()> {
    let (config, prefs) = super::load_settings(cli, sketch)?;
    let parser = PartitionTableParser::from_config(&config);
    let (tx, _rx) = mpsc::unbounded_channel();
    let workflow = Workflow::new(config, prefs, sketch.request(), tx);

    let path = workflow.partitions_path()?;
    let resolved = workflow.parse_partition()?;
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let entry = parser
        .find_entry(&text)?
        .context("Partition entry disappeared while reading")?;

    if cli.json {
        let json = serde_json::json!({
            "table": path,
            "tag": parser.tag(),
            "entry": entry,
            "resolved": resolved,
        });
        println!("{}", json);
        return Ok(());
    }

    println!("📋 Partition table: {}", path.display());
    println!(
        "   {} ({}, {}) at 0x{:X}, {} bytes",
        entry.name, entry.ty, entry.subtype, entry.offset, entry.size
    );
    println!("[FatFS] offset : {}", resolved.reservation);
    println!("[FatFS] start  : {} (0x{:X})", resolved.offset, resolved.offset);
    println!(
        "[FatFS] size   : {} KiB (0x{:X})",
        resolved.size / 1024,
        resolved.size
    );
    Ok(())
}
