pub mod catalog;
pub mod classifier;
pub mod color_classifier;
pub mod config;
pub mod debug_sink;
pub mod extract;
pub mod ocr;
pub mod pipeline;
pub mod region_catalog;
pub mod region_extractor;
pub mod scan_service;
