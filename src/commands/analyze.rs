use image::DynamicImage;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::Cli;
use crate::error::{Result, ScanError};
use crate::models::analysis::ScanResponse;
use crate::models::config::ScanConfig;
use crate::services::ocr::OcrEngine;
use crate::services::pipeline::Analyzer;
use crate::services::scan_service::{status_for, ScanReply, ScanService};

/// Client id used for payloads read from stdin.
pub const CLI_CLIENT: &str = "cli";

/// The recognition engine compiled into this build.
#[cfg(feature = "tesseract")]
pub fn build_engine(config: &ScanConfig) -> Result<Arc<dyn OcrEngine>> {
    let engine = crate::services::ocr::TesseractEngine::new(&config.ocr)?;
    Ok(Arc::new(engine))
}

#[cfg(not(feature = "tesseract"))]
pub fn build_engine(_config: &ScanConfig) -> Result<Arc<dyn OcrEngine>> {
    Err(ScanError::Config(
        "No text recognition engine compiled in; rebuild with --features tesseract".to_string(),
    ))
}

pub fn build_service(engine: Arc<dyn OcrEngine>, config: &ScanConfig) -> ScanService {
    let analyzer = Analyzer::from_config(engine, config);
    info!(
        engine = analyzer.engine_name(),
        characters = analyzer.catalog().characters().len(),
        weapons = analyzer.catalog().weapon_count(),
        "Analyzer ready"
    );
    ScanService::new(Arc::new(analyzer), &config.service)
}

fn open_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| ScanError::Decode(format!("Failed to load {:?}: {}", path, e)))
}

/// Analyze every input and print one envelope per line.
///
/// Returns whether every envelope reported success.
pub async fn analyze_inputs(service: &ScanService, cli: &Cli) -> Result<bool> {
    let mut all_ok = true;

    if cli.stdin {
        let mut payload = String::new();
        std::io::stdin().read_to_string(&mut payload)?;
        let reply = service.handle(CLI_CLIENT, &payload).await;
        all_ok &= emit(&reply, cli.pretty)?;
    }

    for path in &cli.images {
        info!("Analyzing {:?}", path);
        let reply = match open_image(path) {
            Ok(image) => service.run(image).await,
            Err(e) => ScanReply {
                status: status_for(&e),
                body: ScanResponse::failure(e.to_string()),
            },
        };
        all_ok &= emit(&reply, cli.pretty)?;
    }

    if !cli.stdin && cli.images.is_empty() {
        warn!("No input given; pass image paths or --stdin");
    }

    Ok(all_ok)
}

fn emit(reply: &ScanReply, pretty: bool) -> Result<bool> {
    println!("{}", render_response(&reply.body, pretty)?);
    if !reply.body.success {
        warn!(status = reply.status, "Scan did not succeed");
    }
    Ok(reply.body.success)
}

pub fn render_response(response: &ScanResponse, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(response)
    } else {
        serde_json::to_string(response)
    };
    json.map_err(|e| ScanError::Worker(format!("Failed to serialize response: {}", e)))
}
