use image::DynamicImage;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Result, ScanError};
use crate::models::analysis::{AnalysisResult, ScanResponse};
use crate::models::config::{DebugConfig, ScanConfig};
use crate::models::screen::ScreenType;
use crate::services::catalog::ReferenceCatalog;
use crate::services::classifier::classify_page;
use crate::services::debug_sink::DebugSink;
use crate::services::extract::{self, ScanContext};
use crate::services::ocr::{IconMatcher, OcrEngine, PreprocessingService};

/// Screenshot analyzer: classification plus the matching extractor.
///
/// Everything held here is read-only after construction, so one analyzer
/// can serve concurrent scans.
pub struct Analyzer {
    engine: Arc<dyn OcrEngine>,
    preprocessing: PreprocessingService,
    catalog: ReferenceCatalog,
    icons: IconMatcher,
    debug: DebugConfig,
}

impl Analyzer {
    pub fn new(engine: Arc<dyn OcrEngine>, catalog: ReferenceCatalog, icons: IconMatcher) -> Self {
        Self {
            engine,
            preprocessing: PreprocessingService::default(),
            catalog,
            icons,
            debug: DebugConfig::default(),
        }
    }

    /// Analyzer with reference data and icons from the configured paths.
    pub fn from_config(engine: Arc<dyn OcrEngine>, config: &ScanConfig) -> Self {
        let catalog = ReferenceCatalog::load(&config.paths.data_dir);
        if catalog.is_empty() {
            warn!(
                "No reference names loaded from {:?}; name matching is disabled",
                config.paths.data_dir
            );
        }
        let icons = IconMatcher::new(&config.paths.icon_dir);

        Self::new(engine, catalog, icons).with_debug(config.debug.clone())
    }

    pub fn with_debug(mut self, debug: DebugConfig) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_preprocessing(mut self, preprocessing: PreprocessingService) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Classify the screenshot and run the extractor for its page type.
    pub fn analyze(&self, image: &DynamicImage) -> Result<AnalysisResult> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ScanError::InvalidImage(format!(
                "empty image ({}x{})",
                image.width(),
                image.height()
            )));
        }

        let debug = DebugSink::for_scan(&self.debug);
        if let Some(dir) = debug.dir() {
            info!("Saving debug artifacts to {:?}", dir);
        }

        let ctx = ScanContext {
            image,
            engine: self.engine.as_ref(),
            preprocessing: &self.preprocessing,
            catalog: &self.catalog,
            icons: &self.icons,
            debug: &debug,
        };

        let result = match classify_page(&ctx)? {
            ScreenType::Character => AnalysisResult::Character(extract::character::extract(&ctx)?),
            ScreenType::Weapon => AnalysisResult::Weapon(extract::weapon::extract(&ctx)?),
            ScreenType::Sequences => AnalysisResult::Sequences(extract::sequences::extract(&ctx)?),
            ScreenType::Forte => AnalysisResult::Forte(extract::forte::extract(&ctx)?),
            ScreenType::Echo => AnalysisResult::Echo(extract::echo::extract(&ctx)?),
            ScreenType::Unknown => AnalysisResult::Unknown,
        };

        Ok(result)
    }

    /// [`analyze`](Self::analyze) wrapped in the success/error envelope.
    pub fn scan(&self, image: &DynamicImage) -> ScanResponse {
        assemble(self.analyze(image))
    }
}

/// Turn a core outcome into the response envelope.
pub fn assemble(outcome: Result<AnalysisResult>) -> ScanResponse {
    match outcome {
        Ok(analysis) => ScanResponse::ok(analysis),
        Err(e) => {
            warn!("Scan failed: {}", e);
            ScanResponse::failure(e.to_string())
        }
    }
}
