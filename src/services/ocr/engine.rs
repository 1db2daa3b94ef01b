use image::DynamicImage;

use crate::error::Result;

/// Page layout hint passed to the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentationMode {
    /// Fully automatic page segmentation.
    #[default]
    Auto,
    /// One uniform block of text (detail panels).
    SingleBlock,
    /// One text line (level counters, UID).
    SingleLine,
    /// Scattered text, as much as possible in no particular order.
    SparseText,
}

/// Per-call recognition settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecognitionOptions {
    pub mode: SegmentationMode,
    /// Restrict output to these characters.
    pub whitelist: Option<&'static str>,
}

impl RecognitionOptions {
    pub fn new(mode: SegmentationMode) -> Self {
        Self {
            mode,
            whitelist: None,
        }
    }

    /// Single line of digits.
    pub fn digits() -> Self {
        Self {
            mode: SegmentationMode::SingleLine,
            whitelist: Some("0123456789"),
        }
    }

    pub fn with_whitelist(mut self, whitelist: &'static str) -> Self {
        self.whitelist = Some(whitelist);
        self
    }
}

/// OCR Engine trait - abstraction over the text recognizer
///
/// Implementations must be shareable across worker threads; the pipeline
/// holds one engine per process and calls it from whichever thread runs
/// the scan.
pub trait OcrEngine: Send + Sync {
    /// Recognize text in a preprocessed crop.
    fn recognize(&self, image: &DynamicImage, options: &RecognitionOptions) -> Result<String>;

    /// Short engine name for logs.
    fn name(&self) -> &'static str {
        "ocr"
    }
}

impl<E: OcrEngine + ?Sized> OcrEngine for std::sync::Arc<E> {
    fn recognize(&self, image: &DynamicImage, options: &RecognitionOptions) -> Result<String> {
        (**self).recognize(image, options)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
