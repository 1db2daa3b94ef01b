use tracing::debug;

use super::Cli;
use crate::error::{Result, ScanError};
use crate::models::config::ScanConfig;
use crate::services::config::{load_from, ConfigManager};

/// Configuration for this run: the `--config` file or the per-user one,
/// then the command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<ScanConfig> {
    let mut config = match &cli.config {
        Some(path) => load_from(path)?,
        None => {
            let manager = ConfigManager::new()?;
            debug!("Using config file {:?}", manager.config_file_path());
            manager.load()?
        }
    };

    apply_overrides(&mut config, cli);
    Ok(config)
}

pub fn apply_overrides(config: &mut ScanConfig, cli: &Cli) {
    if let Some(dir) = &cli.data_dir {
        config.paths.data_dir = dir.clone();
    }
    if let Some(dir) = &cli.icon_dir {
        config.paths.icon_dir = dir.clone();
    }
    if let Some(dir) = &cli.debug_dir {
        config.debug.enabled = true;
        config.debug.dir = Some(dir.clone());
    }
}

/// Effective configuration as JSON.
pub fn render_config(config: &ScanConfig, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(config)
    } else {
        serde_json::to_string(config)
    };
    json.map_err(|e| ScanError::Config(format!("Failed to serialize config: {}", e)))
}
