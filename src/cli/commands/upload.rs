use crate::cli::args::{Cli, SketchArgs};
use crate::cli::output::spawn_renderer;
use crate::errors::EspFatfsError;
use anyhow::Result;

pub async fn execute_upload_command(cli: &Cli, sketch: &SketchArgs) -> Result<()> {
    let (tx, renderer) = spawn_renderer(cli.json);
    let mut workflow = super::build_workflow(cli, sketch, tx)?;

    let started = workflow.run().await;
    // The upload task holds its own sender; the renderer stops after it ends
    drop(workflow);

    let result = match started {
        Ok(handle) => handle.wait().await,
        Err(e) => Err(e),
    };
    let _ = renderer.await;

    match result {
        Ok(()) => {
            if !cli.json {
                println!("🎉 FatFS image uploaded");
            }
            Ok(())
        }
        Err(e) => {
            if matches!(e, EspFatfsError::SerialPortUndefined) && !cli.json {
                super::ports::print_port_hint();
            }
            Err(e.into())
        }
    }
}
