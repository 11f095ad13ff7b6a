//! Finding the image builder and flashers on disk

use crate::config::{AppConfig, BoardPreferences};
use crate::errors::{EspFatfsError, Result};
use crate::models::{RuntimeOs, ToolKind, ToolPaths, UploadTarget};
use std::collections::HashMap;
use std::path::PathBuf;

/// Searches, in order: the platform `tools` folder, the tool's own folder
/// under it, then the tool's configured install folder. Within each folder
/// the native executable is tried before the `.py` script.
#[derive(Debug, Clone)]
pub struct ToolLocator {
    tools_dir: Option<PathBuf>,
    install_paths: HashMap<ToolKind, PathBuf>,
    os: RuntimeOs,
    search_path: bool,
}

impl ToolLocator {
    pub fn new(tools_dir: Option<PathBuf>, os: RuntimeOs) -> Self {
        Self {
            tools_dir,
            install_paths: HashMap::new(),
            os,
            search_path: false,
        }
    }

    /// Locator for `<platform_dir>/tools` with install folders from the
    /// `runtime.tools.*.path` preferences
    pub fn from_settings(config: &AppConfig, prefs: &BoardPreferences) -> Self {
        let tools_dir = config.platform_dir.as_ref().map(|dir| dir.join("tools"));
        let mut locator =
            Self::new(tools_dir, prefs.runtime_os()).with_search_path(config.search_path);
        for kind in [
            ToolKind::ImageBuilder,
            ToolKind::SerialFlasher,
            ToolKind::NetworkFlasher,
        ] {
            if let Some(path) = prefs.get_nonempty(kind.install_path_key()) {
                locator = locator.with_install_path(kind, path);
            }
        }
        locator
    }

    pub fn with_install_path(mut self, kind: ToolKind, path: impl Into<PathBuf>) -> Self {
        self.install_paths.insert(kind, path.into());
        self
    }

    /// Also look on `PATH` once every folder came up empty
    pub fn with_search_path(mut self, enabled: bool) -> Self {
        self.search_path = enabled;
        self
    }

    pub fn os(&self) -> RuntimeOs {
        self.os
    }

    fn candidate_dirs(&self, kind: ToolKind) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(tools_dir) = &self.tools_dir {
            dirs.push(tools_dir.clone());
            dirs.push(tools_dir.join(kind.subdir()));
        }
        if let Some(install_path) = self.install_paths.get(&kind) {
            dirs.push(install_path.clone());
        }
        dirs
    }

    /// Every path probed for `kind`, in priority order
    pub fn candidates(&self, kind: ToolKind) -> Vec<PathBuf> {
        let names = self.os.tool_file_names(kind.stem());
        self.candidate_dirs(kind)
            .into_iter()
            .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
            .collect()
    }

    /// First candidate that is an existing regular file
    pub fn locate(&self, kind: ToolKind) -> Result<PathBuf> {
        let candidates = self.candidates(kind);
        if let Some(found) = candidates.iter().find(|path| path.is_file()) {
            log::info!("{} : {}", kind, found.display());
            return Ok(found.clone());
        }

        if self.search_path {
            for name in self.os.tool_file_names(kind.stem()) {
                if let Ok(found) = which::which(&name) {
                    log::info!("{} : {} (from PATH)", kind, found.display());
                    return Ok(found);
                }
            }
        }

        log::debug!("{} not found in {:?}", kind, candidates);
        Err(EspFatfsError::ToolNotFound {
            tool: kind.stem().to_string(),
            searched: candidates,
        })
    }

    /// The flasher `target` needs: `espota` for network, `esptool` for serial
    pub fn locate_flasher(&self, target: &UploadTarget) -> Result<(ToolKind, PathBuf)> {
        let kind = match target {
            UploadTarget::Network { .. } => ToolKind::NetworkFlasher,
            UploadTarget::Serial { .. } => ToolKind::SerialFlasher,
        };
        Ok((kind, self.locate(kind)?))
    }

    /// The image builder plus whichever flasher `target` needs
    pub fn locate_for(&self, target: Option<&UploadTarget>) -> Result<ToolPaths> {
        let mut paths = ToolPaths {
            image_builder: self.locate(ToolKind::ImageBuilder)?,
            ..ToolPaths::default()
        };
        if let Some(target) = target {
            let (kind, path) = self.locate_flasher(target)?;
            paths.set_flasher(kind, path);
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::process::is_script;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_candidate_order() {
        let locator = ToolLocator::new(Some(PathBuf::from("/p/tools")), RuntimeOs::Linux)
            .with_install_path(ToolKind::ImageBuilder, "/opt/mkfatfs");
        assert_eq!(
            locator.candidates(ToolKind::ImageBuilder),
            vec![
                PathBuf::from("/p/tools/mkfatfs"),
                PathBuf::from("/p/tools/mkfatfs.py"),
                PathBuf::from("/p/tools/mkfatfs/mkfatfs"),
                PathBuf::from("/p/tools/mkfatfs/mkfatfs.py"),
                PathBuf::from("/opt/mkfatfs/mkfatfs"),
                PathBuf::from("/opt/mkfatfs/mkfatfs.py"),
            ]
        );
    }

    #[test]
    fn test_primary_dir_wins_over_later_dirs() {
        let temp = TempDir::new().unwrap();
        let tools = temp.path().join("tools");
        let install = temp.path().join("install");
        touch(&tools.join("esptool_py").join("esptool"));
        touch(&install.join("esptool"));
        touch(&tools.join("esptool"));

        let locator = ToolLocator::new(Some(tools.clone()), RuntimeOs::Linux)
            .with_install_path(ToolKind::SerialFlasher, &install);
        assert_eq!(
            locator.locate(ToolKind::SerialFlasher).unwrap(),
            tools.join("esptool")
        );
    }

    #[test]
    fn test_falls_back_to_subdir_then_install_path() {
        let temp = TempDir::new().unwrap();
        let tools = temp.path().join("tools");
        let install = temp.path().join("install");
        touch(&install.join("mkfatfs"));

        let locator = ToolLocator::new(Some(tools.clone()), RuntimeOs::Linux)
            .with_install_path(ToolKind::ImageBuilder, &install);
        assert_eq!(
            locator.locate(ToolKind::ImageBuilder).unwrap(),
            install.join("mkfatfs")
        );

        touch(&tools.join("mkfatfs").join("mkfatfs"));
        assert_eq!(
            locator.locate(ToolKind::ImageBuilder).unwrap(),
            tools.join("mkfatfs").join("mkfatfs")
        );
    }

    #[test]
    fn test_script_is_fallback_for_native_executable() {
        let temp = TempDir::new().unwrap();
        let tools = temp.path().join("tools");
        touch(&tools.join("espota.py"));

        let locator = ToolLocator::new(Some(tools.clone()), RuntimeOs::MacOsx);
        let found = locator.locate(ToolKind::NetworkFlasher).unwrap();
        assert_eq!(found, tools.join("espota.py"));
        assert!(is_script(&found));
    }

    #[test]
    fn test_directory_is_not_a_tool() {
        let temp = TempDir::new().unwrap();
        let tools = temp.path().join("tools");
        // `tools/mkfatfs` is the subdir, not the executable
        fs::create_dir_all(tools.join("mkfatfs")).unwrap();

        let locator = ToolLocator::new(Some(tools), RuntimeOs::Linux);
        let err = locator.locate(ToolKind::ImageBuilder).unwrap_err();
        match err {
            EspFatfsError::ToolNotFound { tool, searched } => {
                assert_eq!(tool, "mkfatfs");
                assert_eq!(searched.len(), 4);
            }
            other => panic!("Expected ToolNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_flasher_follows_target() {
        let temp = TempDir::new().unwrap();
        let tools = temp.path().join("tools");
        touch(&tools.join("mkfatfs.exe"));
        touch(&tools.join("espota.exe"));

        let locator = ToolLocator::new(Some(tools.clone()), RuntimeOs::Windows);
        let network = UploadTarget::from_destination("10.0.0.7", "921600", 3232);
        let paths = locator.locate_for(Some(&network)).unwrap();
        assert_eq!(paths.network_flasher, Some(tools.join("espota.exe")));
        assert!(paths.serial_flasher.is_none());

        let serial = UploadTarget::from_destination("COM3", "921600", 3232);
        assert!(matches!(
            locator.locate_for(Some(&serial)),
            Err(EspFatfsError::ToolNotFound { tool, .. }) if tool == "esptool"
        ));
    }

    #[test]
    fn test_locate_flasher_reports_kind() {
        let temp = TempDir::new().unwrap();
        let tools = temp.path().join("tools");
        touch(&tools.join("espota.py"));
        touch(&tools.join("esptool_py").join("esptool"));

        let locator = ToolLocator::new(Some(tools.clone()), RuntimeOs::Linux);
        let network = UploadTarget::from_destination("192.168.4.1", "921600", 3232);
        assert_eq!(
            locator.locate_flasher(&network).unwrap(),
            (ToolKind::NetworkFlasher, tools.join("espota.py"))
        );

        let serial = UploadTarget::from_destination("/dev/ttyUSB0", "921600", 3232);
        assert_eq!(
            locator.locate_flasher(&serial).unwrap(),
            (ToolKind::SerialFlasher, tools.join("esptool_py").join("esptool"))
        );
    }
}
