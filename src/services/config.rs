use crate::error::{Result, ScanError};
use crate::models::config::ScanConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the platform config directory.
pub const APP_DIR: &str = "wuwa-ocr";
pub const CONFIG_FILE: &str = "config.json";

/// Reads and writes the scanner configuration file
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for `<platform config dir>/wuwa-ocr/config.json`.
    ///
    /// The directory is created on first save, not here.
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ScanError::Config("Failed to determine config directory".to_string()))?
            .join(APP_DIR);

        Ok(Self::at(config_dir.join(CONFIG_FILE)))
    }

    /// Manager for an explicit config file path.
    pub fn at<P: AsRef<Path>>(config_path: P) -> Self {
        let config_path = config_path.as_ref().to_path_buf();
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self {
            config_dir,
            config_path,
        }
    }

    pub fn save(&self, config: &ScanConfig) -> Result<()> {
        if !self.config_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.config_dir).map_err(|e| {
                ScanError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(config)
            .map_err(|e| ScanError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&self.config_path, json)
            .map_err(|e| ScanError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Load configuration from disk
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(&self) -> Result<ScanConfig> {
        if !self.config_exists() {
            return Ok(ScanConfig::default());
        }
        load_from(&self.config_path)
    }

    pub fn config_file_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn config_exists(&self) -> bool {
        self.config_path.exists()
    }
}

/// Parse a config file that must exist.
pub fn load_from<P: AsRef<Path>>(path: P) -> Result<ScanConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| ScanError::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

    serde_json::from_str(&content)
        .map_err(|e| ScanError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
}
