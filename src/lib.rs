pub mod commands;
pub mod error;
pub mod models;
pub mod services;

use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

use commands::analyze::{analyze_inputs, build_engine, build_service};
use commands::config::{render_config, resolve_config};
use commands::{exit_codes, Cli};

pub use error::{Result, ScanError};
pub use models::analysis::{AnalysisResult, ScanResponse};
pub use models::config::ScanConfig;
pub use models::screen::ScreenType;
pub use services::catalog::ReferenceCatalog;
pub use services::ocr::{IconMatcher, OcrEngine, RecognitionOptions, SegmentationMode};
pub use services::pipeline::Analyzer;
pub use services::scan_service::{ScanReply, ScanService};

/// Install the stderr log subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = installed {
        eprintln!("Logging already initialized: {}", e);
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(exit_codes::SETUP_FAILED);
        }
    };

    if cli.print_config {
        return match render_config(&config, true) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::from(exit_codes::SUCCESS)
            }
            Err(e) => {
                error!("{}", e);
                ExitCode::from(exit_codes::SETUP_FAILED)
            }
        };
    }

    let engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(exit_codes::SETUP_FAILED);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            return ExitCode::from(exit_codes::SETUP_FAILED);
        }
    };

    let service = build_service(engine, &config);
    match runtime.block_on(analyze_inputs(&service, &cli)) {
        Ok(true) => ExitCode::from(exit_codes::SUCCESS),
        Ok(false) => ExitCode::from(exit_codes::SCAN_FAILED),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(exit_codes::SETUP_FAILED)
        }
    }
}
