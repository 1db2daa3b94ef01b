pub mod analyze;
pub mod config;

use clap::Parser;
use std::path::PathBuf;

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    /// At least one input produced a failure envelope.
    pub const SCAN_FAILED: u8 = 1;
    /// Configuration, engine or runtime could not be set up.
    pub const SETUP_FAILED: u8 = 2;
}

/// Read Wuthering Waves detail-page screenshots into JSON records
#[derive(Parser, Debug, Default)]
#[command(name = "wuwa-ocr", author, version, about, long_about = None)]
pub struct Cli {
    /// Screenshot files to analyze
    pub images: Vec<PathBuf>,

    /// Read one base64 payload (optionally a data URL) from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Config file instead of the per-user one
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Save intermediate crops below this directory
    #[arg(long, value_name = "DIR")]
    pub debug_dir: Option<PathBuf>,

    /// Directory holding Characters.json and Weapons.json
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory holding the echo set icons
    #[arg(long, value_name = "DIR")]
    pub icon_dir: Option<PathBuf>,

    /// Pretty-print each envelope
    #[arg(long)]
    pub pretty: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub print_config: bool,
}
