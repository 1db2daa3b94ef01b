use image::DynamicImage;
use tesseract::{PageSegMode, Tesseract};
use tracing::debug;

use super::engine::{OcrEngine, RecognitionOptions, SegmentationMode};
use crate::error::{Result, ScanError};
use crate::models::config::OcrConfig;

/// Tesseract OCR engine implementation
pub struct TesseractEngine {
    // Tesseract instance will be created per-call for thread safety
    language: String,
    datapath: Option<String>,
}

impl TesseractEngine {
    /// Create an engine and verify the language data can be loaded.
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let engine = Self {
            language: config.language.clone(),
            datapath: config.datapath.clone(),
        };

        // Verify Tesseract is available
        engine.open()?;

        Ok(engine)
    }

    fn open(&self) -> Result<Tesseract> {
        Tesseract::new(self.datapath.as_deref(), Some(&self.language)).map_err(|e| {
            ScanError::Recognition(format!(
                "Failed to create Tesseract instance ({}): {}",
                self.language, e
            ))
        })
    }

    fn page_seg_mode(mode: SegmentationMode) -> PageSegMode {
        match mode {
            SegmentationMode::Auto => PageSegMode::PsmAuto,
            SegmentationMode::SingleBlock => PageSegMode::PsmSingleBlock,
            SegmentationMode::SingleLine => PageSegMode::PsmSingleLine,
            SegmentationMode::SparseText => PageSegMode::PsmSparseText,
        }
    }

    /// Set character whitelist for better accuracy
    fn set_whitelist(tesseract: Tesseract, whitelist: &str) -> Result<Tesseract> {
        tesseract
            .set_variable("tessedit_char_whitelist", whitelist)
            .map_err(|e| ScanError::Recognition(format!("Failed to set whitelist: {}", e)))
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &DynamicImage, options: &RecognitionOptions) -> Result<String> {
        // Convert DynamicImage to bytes (PNG format for Tesseract)
        let mut img_bytes: Vec<u8> = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut img_bytes), image::ImageFormat::Png)
            .map_err(|e| ScanError::Recognition(format!("Failed to encode image: {}", e)))?;

        let mut tesseract = self.open()?;
        tesseract.set_page_seg_mode(Self::page_seg_mode(options.mode));

        if let Some(whitelist) = options.whitelist {
            tesseract = Self::set_whitelist(tesseract, whitelist)?;
        }

        let text = tesseract
            .set_image_from_mem(&img_bytes)
            .map_err(|e| ScanError::Recognition(format!("Failed to set image: {}", e)))?
            .get_text()
            .map_err(|e| ScanError::Recognition(format!("Failed to recognize text: {}", e)))?;

        debug!(mode = ?options.mode, chars = text.len(), "tesseract pass finished");
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}
