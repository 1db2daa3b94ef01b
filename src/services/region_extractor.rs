use image::{imageops::FilterType, DynamicImage, GenericImageView};

use crate::error::{Result, ScanError};
use crate::models::region::{Region, Roi};

/// Upscale factor applied to small text regions (level counters, UID digits).
pub const SMALL_TEXT_UPSCALE: u32 = 4;

/// Crop a fractional region out of the screenshot.
///
/// Fails with [`ScanError::InvalidRegion`] when the clipped crop has no area,
/// e.g. the image is far smaller than a real capture.
pub fn crop_region(image: &DynamicImage, region: &Region) -> Result<DynamicImage> {
    let (width, height) = image.dimensions();
    let roi = Roi::from_region(region, width, height);

    if !roi.is_valid() {
        return Err(ScanError::InvalidRegion {
            region: region.name.to_string(),
            width,
            height,
        });
    }

    Ok(image.crop_imm(roi.x, roi.y, roi.width, roi.height))
}

/// Uniform upscale with cubic interpolation.
pub fn upscale(image: &DynamicImage, factor: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    image.resize_exact(width * factor, height * factor, FilterType::CatmullRom)
}
