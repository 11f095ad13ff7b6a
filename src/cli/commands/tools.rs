use crate::cli::args::{Cli, SketchArgs};
use crate::errors::EspFatfsError;
use crate::services::Workflow;
use anyhow::Result;
use tokio::sync::mpsc;

pub fn execute_tools_command(cli: &Cli, sketch: &SketchArgs) -> Result<()> {
    let (config, prefs) = super::load_settings(cli, sketch)?;
    let (tx, _rx) = mpsc::unbounded_channel();
    let workflow = Workflow::new(config, prefs, sketch.request(), tx);

    // Without a destination only the image builder can be resolved
    let target = match workflow.upload_target() {
        Ok(target) => Some(target),
        Err(EspFatfsError::SerialPortUndefined) => None,
        Err(e) => return Err(e.into()),
    };
    let tools = workflow.locate_tools(target.as_ref())?;

    if cli.json {
        println!("{}", serde_json::json!({ "target": target, "tools": tools }));
        return Ok(());
    }

    println!("🔧 mkfatfs : {}", tools.image_builder.display());
    if let Some(path) = &tools.serial_flasher {
        println!("🔧 esptool : {}", path.display());
    }
    if let Some(path) = &tools.network_flasher {
        println!("🔧 espota  : {}", path.display());
    }
    if target.is_none() {
        println!("ℹ️  No serial port or IP given; flasher not resolved");
    }
    Ok(())
}
