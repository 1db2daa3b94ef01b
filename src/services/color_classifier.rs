//! Color-ratio signals used for node states and set detection.
//!
//! Every function returns the matching fraction in `[0, 1]` of the pixels
//! considered (the whole crop, or only the pixels set in a mask).

use image::{GrayImage, ImageBuffer, Luma, RgbImage};

use crate::models::color::{HsvRange, RgbTarget};

/// Share of the disk radius cut out of the donut mask's center.
pub const DONUT_RIM_FRACTION: f32 = 0.47;

/// Convert RGB to HSV on the OpenCV 8-bit scale.
/// Returns (H: 0-179, S: 0-255, V: 0-255)
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    // Hue calculation
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };
    let h = ((h / 2.0).round() as u32 % 180) as u8;

    let s = if max == 0.0 { 0.0 } else { delta / max };
    let s = (s * 255.0).round() as u8;

    let v = (max * 255.0).round() as u8;

    [h, s, v]
}

/// Filled circle centered in a `width x height` canvas, radius `min(w, h) / 2`.
pub fn disk_mask(width: u32, height: u32) -> GrayImage {
    ring_mask(width, height, None)
}

/// Disk with the center glyph area removed, leaving the colored rim.
pub fn donut_mask(width: u32, height: u32) -> GrayImage {
    ring_mask(width, height, Some(DONUT_RIM_FRACTION))
}

fn ring_mask(width: u32, height: u32, rim_fraction: Option<f32>) -> GrayImage {
    let cx = (width / 2) as i64;
    let cy = (height / 2) as i64;
    let radius = (width.min(height) / 2) as i64;
    let outer = radius * radius;
    let inner = rim_fraction.map(|rim| {
        let r = (radius as f32 * (1.0 - rim)).round() as i64;
        r * r
    });

    ImageBuffer::from_fn(width, height, |x, y| {
        let dx = x as i64 - cx;
        let dy = y as i64 - cy;
        let d = dx * dx + dy * dy;
        let inside = d <= outer && inner.map_or(true, |inner| d > inner);
        if inside {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Fraction of pixels whose HSV value falls in any of `ranges`.
///
/// With a mask, only pixels where the mask is non-zero are counted; a mask of
/// a different size or an empty mask gives `0.0`.
pub fn hsv_coverage(image: &RgbImage, ranges: &[HsvRange], mask: Option<&GrayImage>) -> f32 {
    if let Some(mask) = mask {
        if mask.dimensions() != image.dimensions() {
            return 0.0;
        }
    }

    let mut considered = 0u64;
    let mut matched = 0u64;

    for (x, y, pixel) in image.enumerate_pixels() {
        if let Some(mask) = mask {
            if mask.get_pixel(x, y)[0] == 0 {
                continue;
            }
        }
        considered += 1;

        let hsv = rgb_to_hsv(pixel[0], pixel[1], pixel[2]);
        if ranges.iter().any(|range| range.contains(hsv)) {
            matched += 1;
        }
    }

    if considered == 0 {
        return 0.0;
    }
    matched as f32 / considered as f32
}

/// Fraction of pixels close to any of the reference RGB colors.
pub fn rgb_coverage(image: &RgbImage, targets: &[RgbTarget]) -> f32 {
    let total = image.width() as u64 * image.height() as u64;
    if total == 0 {
        return 0.0;
    }

    let matched = image
        .pixels()
        .filter(|p| targets.iter().any(|t| t.matches(p.0)))
        .count() as u64;

    matched as f32 / total as f32
}

/// Coverage of each labelled range set, highest first.
///
/// Ties keep the candidate order, so the result is deterministic.
pub fn rank_coverage<L: Copy>(
    image: &RgbImage,
    candidates: &[(L, &[HsvRange])],
    mask: Option<&GrayImage>,
) -> Vec<(L, f32)> {
    let mut ranked: Vec<(L, f32)> = candidates
        .iter()
        .map(|(label, ranges)| (*label, hsv_coverage(image, ranges, mask)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}
