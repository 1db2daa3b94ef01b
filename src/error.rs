use thiserror::Error;

/// Errors raised while scanning a screenshot.
///
/// Only whole-request failures live here. A field that could not be read is
/// reported as `None` by the extractors, and an unrecognized page is
/// `ScreenType::Unknown`, not an error.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Null, empty or undecodable input image.
    #[error("Invalid image input: {0}")]
    InvalidImage(String),

    /// A region resolved to a zero-area crop on this image.
    #[error("Region '{region}' produced an empty crop on a {width}x{height} image")]
    InvalidRegion {
        region: String,
        width: u32,
        height: u32,
    },

    /// The recognition engine or a template lookup failed.
    #[error("Recognition failed: {0}")]
    Recognition(String),

    /// Reference tables could not be read or parsed.
    #[error("Reference data unavailable: {0}")]
    ReferenceData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Payload could not be turned into an image.
    #[error("Image processing error: {0}")]
    Decode(String),

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Processing timeout exceeded ({0} seconds allowed)")]
    Timeout(u64),

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
