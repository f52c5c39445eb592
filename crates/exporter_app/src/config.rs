use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use exporter_core::{DeviceProfile, SpreadOrder};
use exporter_engine::{BrowserSettings, HarvestSettings};
use serde::{Deserialize, Serialize};

/// Tile order of split spreads, as written in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpreadOrderSetting {
    #[default]
    RightToLeft,
    LeftToRight,
}

impl From<SpreadOrderSetting> for SpreadOrder {
    fn from(setting: SpreadOrderSetting) -> Self {
        match setting {
            SpreadOrderSetting::RightToLeft => SpreadOrder::RightToLeft,
            SpreadOrderSetting::LeftToRight => SpreadOrder::LeftToRight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSetting {
    pub width: u32,
    pub height: u32,
}

impl Default for DeviceSetting {
    fn default() -> Self {
        let device = DeviceProfile::default();
        Self {
            width: device.width,
            height: device.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    pub device: DeviceSetting,
    pub spread_order: SpreadOrderSetting,
    pub output_dir: PathBuf,
    pub navigation_timeout_secs: u64,
    pub chrome_path: Option<PathBuf>,
    pub headful: bool,
    /// Download images again over HTTP when the browser lost their body.
    pub fallback_download: bool,
    pub language: String,
    pub log_file: PathBuf,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            device: DeviceSetting::default(),
            spread_order: SpreadOrderSetting::default(),
            output_dir: PathBuf::from("output"),
            navigation_timeout_secs: 30,
            chrome_path: None,
            headful: false,
            fallback_download: true,
            language: "en".to_string(),
            log_file: PathBuf::from(exporter_logging::DEFAULT_LOG_FILE),
        }
    }
}

impl ExporterConfig {
    pub fn device(&self) -> DeviceProfile {
        DeviceProfile::new(self.device.width, self.device.height)
    }

    pub fn spread_order(&self) -> SpreadOrder {
        self.spread_order.into()
    }

    pub fn harvest_settings(&self) -> HarvestSettings {
        HarvestSettings {
            navigation_timeout: Duration::from_secs(self.navigation_timeout_secs),
            browser: BrowserSettings {
                chrome_path: self.chrome_path.clone(),
                headful: self.headful,
            },
            work_root: None,
        }
    }

    pub fn to_ron(&self) -> anyhow::Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
            .context("Failed to serialize configuration")
    }
}

/// Reads the configuration. A missing file is not an error and yields the
/// defaults; unreadable or invalid files are reported to the caller.
pub fn load_config(path: &Path) -> anyhow::Result<ExporterConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(ExporterConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read configuration {path:?}"));
        }
    };
    let config: ExporterConfig = ron::from_str(&content)
        .with_context(|| format!("Failed to parse configuration {path:?}"))?;
    anyhow::ensure!(
        config.device().is_supported(),
        "Device size in {path:?} must be between 1 and {} pixels per side",
        DeviceProfile::MAX_SIDE
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, ExporterConfig::default());
        assert_eq!(config.device(), DeviceProfile::KINDLE_OASIS);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("exporter.ron");
        fs::write(
            &path,
            "(device: (width: 1072, height: 1448), spread_order: LeftToRight, language: \"fr\")",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.device(), DeviceProfile::new(1072, 1448));
        assert_eq!(config.spread_order(), SpreadOrder::LeftToRight);
        assert_eq!(config.language, "fr");
        assert_eq!(config.navigation_timeout_secs, 30);
    }

    #[test]
    fn broken_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("exporter.ron");
        fs::write(&path, "(device: 12").unwrap();
        assert!(load_config(&path).is_err());

        fs::write(&path, "(device: (width: 0, height: 10))").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn oversized_device_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("exporter.ron");
        fs::write(&path, "(device: (width: 4294967295, height: 1680))").unwrap();
        assert!(load_config(&path).is_err());

        fs::write(&path, "(device: (width: 8192, height: 8192))").unwrap();
        assert_eq!(load_config(&path).unwrap().device(), DeviceProfile::new(8192, 8192));
    }

    #[test]
    fn printed_config_loads_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("exporter.ron");
        let config = ExporterConfig {
            chrome_path: Some(PathBuf::from("/usr/bin/chromium")),
            ..ExporterConfig::default()
        };
        fs::write(&path, config.to_ron().unwrap()).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }
}
