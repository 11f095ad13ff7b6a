//! Writing the image to the board over serial (`esptool`) or OTA (`espota`)

use crate::errors::{EspFatfsError, Result};
use crate::models::{
    SerialFlashSettings, ToolKind, ToolPaths, UploadTarget, WorkflowEvent, WorkflowState,
};
use crate::utils::process::{CommandLine, FAILURE_CODE, ProcessRunner};
use std::path::Path;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct Uploader {
    interpreter: String,
    runner: ProcessRunner,
}

impl Uploader {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            runner: ProcessRunner::new(),
        }
    }

    pub fn with_runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Flasher invocation for `target`
    pub fn command(
        &self,
        tools: &ToolPaths,
        target: &UploadTarget,
        settings: &SerialFlashSettings,
        offset: u64,
        image: &Path,
    ) -> Result<CommandLine> {
        let missing = |kind: ToolKind| EspFatfsError::ToolNotFound {
            tool: kind.stem().to_string(),
            searched: Vec::new(),
        };

        match target {
            UploadTarget::Network { host, ota_port } => {
                let tool = tools
                    .network_flasher
                    .as_deref()
                    .ok_or_else(|| missing(ToolKind::NetworkFlasher))?;
                Ok(CommandLine::for_tool(tool, &self.interpreter)
                    .args(["-i", &host.to_string()])
                    .args(["-p", &ota_port.to_string()])
                    .args(["-s", "-f"])
                    .arg(image))
            }
            UploadTarget::Serial { port, baud } => {
                let tool = tools
                    .serial_flasher
                    .as_deref()
                    .ok_or_else(|| missing(ToolKind::SerialFlasher))?;
                Ok(CommandLine::for_tool(tool, &self.interpreter)
                    .args(["--chip", &settings.chip])
                    .args(["--baud", baud.as_str()])
                    .args(["--port", port.as_str()])
                    .args(["--before", "default_reset", "--after", "hard_reset"])
                    .args(["write_flash", "-z"])
                    .args(["--flash_mode", &settings.flash_mode])
                    .args(["--flash_freq", &settings.flash_freq])
                    .args(["--flash_size", "detect"])
                    .arg(offset.to_string())
                    .arg(image))
            }
        }
    }

    /// Run the flasher and wait for it; a non-zero exit becomes `UploadFailed`
    pub async fn upload(&self, command: &CommandLine) -> Result<()> {
        let output = self.runner.run(command).await?;
        if output.success() {
            Ok(())
        } else {
            Err(EspFatfsError::UploadFailed {
                code: output.code,
                stderr: output.stderr_text(),
            })
        }
    }

    /// Run the upload on its own task and return immediately.
    ///
    /// The final state and status message are sent on `events` when the
    /// flasher exits.
    pub fn start(
        self,
        command: CommandLine,
        events: mpsc::UnboundedSender<WorkflowEvent>,
    ) -> UploadHandle {
        let handle = tokio::spawn(async move {
            let result = self.upload(&command).await;
            match &result {
                Ok(()) => {
                    let _ = events.send(WorkflowEvent::state(WorkflowState::Uploaded));
                    let _ = events.send(WorkflowEvent::notice("FatFS Image Uploaded"));
                }
                Err(e) => {
                    log::error!("{}", e);
                    let _ = events.send(WorkflowEvent::state(WorkflowState::Failed));
                    let _ = events.send(WorkflowEvent::error("FatFS Upload failed!"));
                }
            }
            result
        });
        UploadHandle { handle }
    }
}

/// A running upload
#[derive(Debug)]
pub struct UploadHandle {
    handle: JoinHandle<Result<()>>,
}

impl UploadHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the flasher to exit
    pub async fn wait(self) -> Result<()> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(EspFatfsError::UploadFailed {
                code: FAILURE_CODE,
                stderr: e.to_string(),
            }),
        }
    }
}
