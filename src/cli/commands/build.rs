use crate::cli::args::{Cli, SketchArgs};
use crate::cli::output::spawn_renderer;
use anyhow::Result;

pub async fn execute_build_command(cli: &Cli, sketch: &SketchArgs) -> Result<()> {
    let (tx, renderer) = spawn_renderer(cli.json);
    let mut workflow = super::build_workflow(cli, sketch, tx)?;

    let result = workflow.run_build().await;
    drop(workflow);
    let _ = renderer.await;

    let outcome = result?;
    if !cli.json {
        println!("📦 Image: {}", outcome.build.image_path.display());
    }
    Ok(())
}
