pub mod engine;
pub mod parser;
pub mod preprocessing;
pub mod template_matcher;
#[cfg(feature = "tesseract")]
pub mod tesseract;

// Re-export main types
pub use engine::{OcrEngine, RecognitionOptions, SegmentationMode};
pub use preprocessing::PreprocessingService;
pub use template_matcher::{IconMatcher, IconScore};
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractEngine;
