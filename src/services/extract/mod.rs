//! Per-page field extractors.
//!
//! Each extractor reads the regions of one page through a [`ScanContext`]
//! and returns its typed analysis. Fields that cannot be read are `None`;
//! only invalid crops and failures on a page's main text abort the scan.

pub mod character;
pub mod echo;
pub mod forte;
pub mod sequences;
pub mod weapon;

use image::{DynamicImage, RgbImage};
use tracing::debug;

use crate::error::Result;
use crate::models::region::Region;
use crate::services::catalog::ReferenceCatalog;
use crate::services::debug_sink::DebugSink;
use crate::services::ocr::{IconMatcher, OcrEngine, PreprocessingService, RecognitionOptions};
use crate::services::region_extractor::{crop_region, upscale, SMALL_TEXT_UPSCALE};

/// Everything one scan needs, borrowed for the duration of the call.
pub struct ScanContext<'a> {
    pub image: &'a DynamicImage,
    pub engine: &'a dyn OcrEngine,
    pub preprocessing: &'a PreprocessingService,
    pub catalog: &'a ReferenceCatalog,
    pub icons: &'a IconMatcher,
    pub debug: &'a DebugSink,
}

/// Which preprocessing a text region goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPipeline {
    General,
    Echo,
}

impl<'a> ScanContext<'a> {
    pub fn crop(&self, region: &Region) -> Result<DynamicImage> {
        let crop = crop_region(self.image, region)?;
        self.debug.save(&format!("{}_original", region.name), &crop);
        Ok(crop)
    }

    pub fn crop_rgb(&self, region: &Region) -> Result<RgbImage> {
        Ok(self.crop(region)?.to_rgb8())
    }

    /// Crop, preprocess and recognize one region.
    pub fn read_text(
        &self,
        region: &Region,
        pipeline: TextPipeline,
        options: &RecognitionOptions,
    ) -> Result<String> {
        let crop = self.crop(region)?;
        self.recognize(region, &crop, pipeline, options)
    }

    /// Like [`read_text`](Self::read_text) with the small-text upscale first.
    pub fn read_small_text(&self, region: &Region, options: &RecognitionOptions) -> Result<String> {
        let crop = upscale(&self.crop(region)?, SMALL_TEXT_UPSCALE);
        self.recognize(region, &crop, TextPipeline::General, options)
    }

    fn recognize(
        &self,
        region: &Region,
        crop: &DynamicImage,
        pipeline: TextPipeline,
        options: &RecognitionOptions,
    ) -> Result<String> {
        let processed = match pipeline {
            TextPipeline::General => self.preprocessing.preprocess(crop),
            TextPipeline::Echo => self.preprocessing.preprocess_echo(crop),
        };
        self.debug.save(&format!("{}_processed", region.name), &processed);

        let text = self.engine.recognize(&processed, options)?;
        debug!(region = region.name, text = %text.trim(), "recognized");
        Ok(text)
    }
}
