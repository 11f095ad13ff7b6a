//! Packing the data folder into a FatFS image with `mkfatfs`

use crate::errors::{EspFatfsError, Result};
use crate::models::BuildConfig;
use crate::utils::process::{CommandLine, ProcessRunner};
use crate::utils::prompt::Confirm;
use std::path::{Path, PathBuf};

pub const EMPTY_DATA_TITLE: &str = "FatFS Create";
pub const EMPTY_DATA_MESSAGE: &str =
    "No files have been found in your data folder!\nAre you sure you want to create an empty FatFS image?";

#[derive(Debug, Clone)]
pub struct ImageBuilder {
    tool: PathBuf,
    interpreter: String,
    runner: ProcessRunner,
}

impl ImageBuilder {
    pub fn new(tool: impl Into<PathBuf>, interpreter: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            interpreter: interpreter.into(),
            runner: ProcessRunner::new(),
        }
    }

    pub fn with_runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    /// `mkfatfs -c <data> [-p <page> -b <block>] -s <size> <image>`
    pub fn command(&self, config: &BuildConfig) -> CommandLine {
        let mut cmd = CommandLine::for_tool(&self.tool, &self.interpreter)
            .arg("-c")
            .arg(&config.data_dir);
        if config.pass_geometry {
            cmd = cmd
                .args(["-p", &config.page_size.to_string()])
                .args(["-b", &config.block_size.to_string()]);
        }
        cmd.args(["-s", &config.partition.size.to_string()])
            .arg(&config.image_path)
    }

    /// Run the builder; a non-zero exit becomes `ImageBuildFailed`
    pub async fn build(&self, config: &BuildConfig) -> Result<()> {
        if let Some(parent) = config.image_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let output = self.runner.run(&self.command(config)).await?;
        if !output.success() {
            return Err(EspFatfsError::ImageBuildFailed {
                code: output.code,
                stderr: output.stderr_text(),
            });
        }

        log::info!("FatFS image written to {}", config.image_path.display());
        Ok(())
    }
}

/// Visible files and folders directly inside `dir`; dot-entries are ignored
pub fn count_data_entries(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        // Follows symlinks; dangling links count as nothing
        let path = entry.path();
        if !hidden && (path.is_file() || path.is_dir()) {
            count += 1;
        }
    }
    Ok(count)
}

/// Make sure the data folder exists and, if it is empty, that the user really
/// wants an empty image. Returns the number of entries found.
pub fn prepare_data_dir(dir: &Path, confirm: &dyn Confirm) -> Result<usize> {
    if !dir.exists() {
        log::debug!("Creating data folder {}", dir.display());
        std::fs::create_dir_all(dir)?;
    }

    let count = count_data_entries(dir)?;
    if count == 0 && !confirm.confirm(EMPTY_DATA_TITLE, EMPTY_DATA_MESSAGE) {
        return Err(EspFatfsError::BuildCancelled);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResolvedPartition;
    use crate::utils::prompt::FixedAnswer;
    use std::fs;
    use tempfile::TempDir;

    fn build_config(pass_geometry: bool) -> BuildConfig {
        BuildConfig {
            data_dir: PathBuf::from("/sketch/data"),
            partition: ResolvedPartition {
                offset: 0x111000,
                size: 0x1EF000,
                reservation: 4096,
            },
            page_size: 256,
            block_size: 4096,
            pass_geometry,
            image_path: PathBuf::from("/build/sketch.fatfs.bin"),
        }
    }

    #[test]
    fn test_builder_arguments() {
        let builder = ImageBuilder::new("/tools/mkfatfs", "python");
        assert_eq!(
            builder.command(&build_config(false)).argv(),
            vec![
                "/tools/mkfatfs",
                "-c",
                "/sketch/data",
                "-s",
                "2027520",
                "/build/sketch.fatfs.bin"
            ]
        );
    }

    #[test]
    fn test_builder_arguments_with_geometry() {
        let builder = ImageBuilder::new("/tools/mkfatfs", "python");
        let argv = builder.command(&build_config(true)).argv();
        assert_eq!(&argv[3..7], &["-p", "256", "-b", "4096"]);
        assert_eq!(argv.last().map(String::as_str), Some("/build/sketch.fatfs.bin"));
    }

    #[test]
    fn test_hidden_entries_are_not_counted() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".DS_Store"), b"").unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        assert_eq!(count_data_entries(temp.path()).unwrap(), 0);

        fs::write(temp.path().join("index.html"), b"<html>").unwrap();
        fs::create_dir(temp.path().join("img")).unwrap();
        assert_eq!(count_data_entries(temp.path()).unwrap(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_entries_are_counted() {
        let temp = TempDir::new().unwrap();
        let assets = temp.path().join("assets");
        fs::create_dir_all(assets.join("img")).unwrap();
        fs::write(assets.join("index.html"), b"<html>").unwrap();

        let data = temp.path().join("data");
        fs::create_dir(&data).unwrap();
        std::os::unix::fs::symlink(assets.join("index.html"), data.join("index.html")).unwrap();
        std::os::unix::fs::symlink(assets.join("img"), data.join("img")).unwrap();
        std::os::unix::fs::symlink(assets.join("gone.txt"), data.join("gone.txt")).unwrap();

        assert_eq!(count_data_entries(&data).unwrap(), 2);
        assert_eq!(prepare_data_dir(&data, &FixedAnswer(false)).unwrap(), 2);
    }

    #[test]
    fn test_missing_data_dir_is_created() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("data");
        assert_eq!(prepare_data_dir(&data, &FixedAnswer(true)).unwrap(), 0);
        assert!(data.is_dir());
    }

    #[test]
    fn test_empty_data_dir_needs_confirmation() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            prepare_data_dir(temp.path(), &FixedAnswer(false)),
            Err(EspFatfsError::BuildCancelled)
        ));
        assert!(prepare_data_dir(temp.path(), &FixedAnswer(true)).is_ok());
    }

    #[test]
    fn test_non_empty_data_dir_skips_confirmation() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.json"), b"{}").unwrap();
        assert_eq!(prepare_data_dir(temp.path(), &FixedAnswer(false)).unwrap(), 1);
    }
}
