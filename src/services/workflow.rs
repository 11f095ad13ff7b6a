//! The build-and-upload workflow
//!
//! `Idle → TableParsed → ToolsLocated → ImageBuilt → Uploaded`, with any
//! failure going straight to `Failed`. Nothing is retried or rolled back; an
//! image that was already written stays on disk.

use crate::config::{
    AppConfig, BoardPreferences, KEY_BUILD_PATH, KEY_FLASH_FREQ, KEY_FLASH_MODE, KEY_PARTITIONS,
    KEY_SERIAL_PORT, KEY_TARGET_PLATFORM, KEY_UPLOAD_SPEED,
};
use crate::errors::{EspFatfsError, Result};
use crate::models::{
    BuildConfig, ResolvedPartition, SerialFlashSettings, ToolKind, ToolPaths, UploadTarget,
    WorkflowEvent, WorkflowState,
};
use crate::services::image_builder::{ImageBuilder, prepare_data_dir};
use crate::services::partition_parser::PartitionTableParser;
use crate::services::tool_locator::ToolLocator;
use crate::services::uploader::{UploadHandle, Uploader};
use crate::utils::process::ProcessRunner;
use crate::utils::prompt::{Confirm, TerminalPrompt};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Platform FatFS images can be built for
pub const SUPPORTED_PLATFORM: &str = "esp32";

/// Where the sketch and its outputs live
#[derive(Debug, Clone, Default)]
pub struct WorkflowRequest {
    pub sketch_dir: PathBuf,
    /// Defaults to `<sketch>/data`
    pub data_dir: Option<PathBuf>,
    /// Defaults to `build.path`, then a hashed temp folder
    pub build_dir: Option<PathBuf>,
    /// Bypasses the `build.partitions` lookup
    pub partitions_file: Option<PathBuf>,
}

/// What a finished build produced
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub build: BuildConfig,
    pub tools: ToolPaths,
}

pub struct Workflow {
    config: AppConfig,
    prefs: BoardPreferences,
    request: WorkflowRequest,
    runner: ProcessRunner,
    confirm: Box<dyn Confirm>,
    events: mpsc::UnboundedSender<WorkflowEvent>,
    state: WorkflowState,
}

impl Workflow {
    pub fn new(
        config: AppConfig,
        prefs: BoardPreferences,
        request: WorkflowRequest,
        events: mpsc::UnboundedSender<WorkflowEvent>,
    ) -> Self {
        Self {
            config,
            prefs,
            request,
            runner: ProcessRunner::new(),
            confirm: Box::new(TerminalPrompt),
            events,
            state: WorkflowState::Idle,
        }
    }

    pub fn with_runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_confirm(mut self, confirm: Box<dyn Confirm>) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    fn emit(&self, event: WorkflowEvent) {
        let _ = self.events.send(event);
    }

    fn advance(&mut self, state: WorkflowState) {
        log::debug!("Workflow state: {:?} -> {:?}", self.state, state);
        self.state = state;
        self.emit(WorkflowEvent::state(state));
    }

    fn fail(&mut self, err: EspFatfsError) -> EspFatfsError {
        self.emit(WorkflowEvent::error(err.to_string()));
        self.advance(WorkflowState::Failed);
        err
    }

    fn interpreter(&self) -> String {
        self.config
            .interpreter
            .clone()
            .unwrap_or_else(|| self.prefs.runtime_os().default_interpreter().to_string())
    }

    pub fn check_platform(&self) -> Result<()> {
        let platform = self.prefs.get(KEY_TARGET_PLATFORM).unwrap_or_default();
        if platform == SUPPORTED_PLATFORM {
            Ok(())
        } else {
            Err(EspFatfsError::UnsupportedPlatform(platform.to_string()))
        }
    }

    /// `<platform>/tools/partitions/<build.partitions>.csv`, unless a file was
    /// given directly
    pub fn partitions_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.request.partitions_file {
            return Ok(path.clone());
        }

        let name = self.prefs.get_nonempty(KEY_PARTITIONS).ok_or_else(|| {
            EspFatfsError::PartitionsUndefined(self.prefs.board_name().to_string())
        })?;
        let platform_dir = self.config.platform_dir.as_ref().ok_or_else(|| {
            EspFatfsError::Config(
                "platform folder is not set (use --platform-dir or --partitions-file)".to_string(),
            )
        })?;
        Ok(platform_dir
            .join("tools")
            .join("partitions")
            .join(format!("{}.csv", name)))
    }

    pub fn parse_partition(&self) -> Result<ResolvedPartition> {
        PartitionTableParser::from_config(&self.config).parse_file(&self.partitions_path()?)
    }

    /// Serial port or IPv4 address from `serial.port`
    pub fn upload_target(&self) -> Result<UploadTarget> {
        let destination = self
            .prefs
            .get_nonempty(KEY_SERIAL_PORT)
            .ok_or(EspFatfsError::SerialPortUndefined)?;
        let baud = self
            .prefs
            .get_nonempty(KEY_UPLOAD_SPEED)
            .unwrap_or(self.config.default_baud.as_str());
        Ok(UploadTarget::from_destination(
            destination,
            baud,
            self.config.ota_port,
        ))
    }

    pub fn serial_settings(&self) -> SerialFlashSettings {
        SerialFlashSettings {
            chip: self.config.chip.clone(),
            flash_mode: self
                .prefs
                .get_nonempty(KEY_FLASH_MODE)
                .unwrap_or(self.config.default_flash_mode.as_str())
                .to_string(),
            flash_freq: self
                .prefs
                .get_nonempty(KEY_FLASH_FREQ)
                .unwrap_or(self.config.default_flash_freq.as_str())
                .to_string(),
        }
    }

    pub fn sketch_name(&self) -> String {
        let dir = std::path::absolute(&self.request.sketch_dir)
            .unwrap_or_else(|_| self.request.sketch_dir.clone());
        dir.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sketch".to_string())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.request
            .data_dir
            .clone()
            .unwrap_or_else(|| self.request.sketch_dir.join("data"))
    }

    /// Explicit folder, then `build.path`, then `<tmp>/build<sha256>.tmp`
    pub fn build_dir(&self) -> PathBuf {
        if let Some(dir) = &self.request.build_dir {
            return dir.clone();
        }
        if let Some(dir) = self.prefs.get_nonempty(KEY_BUILD_PATH) {
            return PathBuf::from(dir);
        }
        let sketch = std::path::absolute(&self.request.sketch_dir)
            .unwrap_or_else(|_| self.request.sketch_dir.clone());
        let digest = Sha256::digest(sketch.to_string_lossy().as_bytes());
        std::env::temp_dir().join(format!("build{:x}.tmp", digest))
    }

    pub fn build_config(&self, partition: ResolvedPartition) -> BuildConfig {
        BuildConfig {
            data_dir: self.data_dir(),
            partition,
            page_size: self.config.page_size,
            block_size: self.config.block_size,
            pass_geometry: self.config.pass_geometry,
            image_path: self
                .build_dir()
                .join(BuildConfig::image_file_name(&self.sketch_name())),
        }
    }

    fn locator(&self) -> ToolLocator {
        ToolLocator::from_settings(&self.config, &self.prefs)
    }

    /// Resolve the tool paths without running anything
    pub fn locate_tools(&self, target: Option<&UploadTarget>) -> Result<ToolPaths> {
        self.locator().locate_for(target)
    }

    /// Parse, locate the image builder and build the image; no upload
    pub async fn run_build(&mut self) -> Result<BuildOutcome> {
        match self.build_steps(false).await {
            Ok((outcome, _)) => Ok(outcome),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// The whole workflow. Returns once the upload has been started; await
    /// the handle for its result.
    pub async fn run(&mut self) -> Result<UploadHandle> {
        let (outcome, target) = match self.build_steps(true).await {
            Ok((outcome, Some(target))) => (outcome, target),
            Ok((_, None)) => return Err(self.fail(EspFatfsError::SerialPortUndefined)),
            Err(e) => return Err(self.fail(e)),
        };

        match self.start_upload(&outcome, &target) {
            Ok(handle) => Ok(handle),
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn build_steps(&mut self, upload: bool) -> Result<(BuildOutcome, Option<UploadTarget>)> {
        self.check_platform()?;

        let partition = self.parse_partition()?;
        self.advance(WorkflowState::TableParsed);

        let locator = self.locator();
        let image_builder = locator.locate(ToolKind::ImageBuilder)?;
        self.emit(WorkflowEvent::ToolLocated {
            tool: ToolKind::ImageBuilder,
            path: image_builder.clone(),
        });

        let target = if upload {
            Some(self.upload_target()?)
        } else {
            None
        };

        let mut tools = ToolPaths {
            image_builder,
            ..ToolPaths::default()
        };
        if let Some(target) = &target {
            let (tool, path) = locator.locate_flasher(target)?;
            self.emit(WorkflowEvent::ToolLocated {
                tool,
                path: path.clone(),
            });
            tools.set_flasher(tool, path);
        }
        self.advance(WorkflowState::ToolsLocated);

        let build = self.build_config(partition);
        prepare_data_dir(&build.data_dir, self.confirm.as_ref())?;

        self.emit(WorkflowEvent::notice("FatFS Creating Image..."));
        self.emit(WorkflowEvent::detail("data", build.data_dir.display()));
        self.emit(WorkflowEvent::detail("offset", partition.reservation));
        self.emit(WorkflowEvent::detail("start", partition.offset));
        self.emit(WorkflowEvent::detail("size", partition.size / 1024));

        ImageBuilder::new(&tools.image_builder, self.interpreter())
            .with_runner(self.runner)
            .build(&build)
            .await?;
        self.advance(WorkflowState::ImageBuilt);

        Ok((BuildOutcome { build, tools }, target))
    }

    fn start_upload(
        &mut self,
        outcome: &BuildOutcome,
        target: &UploadTarget,
    ) -> Result<UploadHandle> {
        let uploader = Uploader::new(self.interpreter()).with_runner(self.runner);
        let settings = self.serial_settings();
        let command = uploader.command(
            &outcome.tools,
            target,
            &settings,
            outcome.build.partition.offset,
            &outcome.build.image_path,
        )?;

        self.emit(WorkflowEvent::notice("FatFS Uploading Image..."));
        self.emit(WorkflowEvent::detail(
            "upload",
            outcome.build.image_path.display(),
        ));
        match target {
            UploadTarget::Network { host, .. } => {
                self.emit(WorkflowEvent::detail("IP", host));
            }
            UploadTarget::Serial { port, baud } => {
                self.emit(WorkflowEvent::detail("address", outcome.build.partition.offset));
                self.emit(WorkflowEvent::detail("port", port));
                self.emit(WorkflowEvent::detail("speed", baud));
                self.emit(WorkflowEvent::detail("mode", &settings.flash_mode));
                self.emit(WorkflowEvent::detail("freq", &settings.flash_freq));
            }
        }

        Ok(uploader.start(command, self.events.clone()))
    }
}
