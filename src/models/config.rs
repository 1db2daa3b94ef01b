use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Locations of the reference data shipped next to the scanner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Directory holding `Characters.json` and `Weapons.json`.
    pub data_dir: PathBuf,
    /// Directory holding the echo set icons (`Aero.png`, `Havoc.png`, ...).
    pub icon_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("public/Data"),
            icon_dir: PathBuf::from("public/images/Sets"),
        }
    }
}

/// Recognition engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrConfig {
    pub language: String,
    /// Tesseract data directory; the system default when unset.
    #[serde(default)]
    pub datapath: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            datapath: None,
        }
    }
}

/// Intermediate crop dumps for offline inspection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DebugConfig {
    pub enabled: bool,
    /// Falls back to `<temp>/wuwa_debug` when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl DebugConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("wuwa_debug"))
    }
}

/// Limits applied by the scan service around each core call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    pub timeout_secs: u64,
    pub requests_per_minute: usize,
    pub max_workers: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            timeout_secs: 30,
            requests_per_minute: 20,
            max_workers: cpus.saturating_sub(1).max(2),
        }
    }
}

/// Complete scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScanConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}
