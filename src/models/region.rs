use serde::{Deserialize, Serialize};

/// Named UI element position, as fractions of the screenshot size.
///
/// Fractions make one table work for every capture resolution. A region is
/// expected to satisfy `left + width <= 1` and `top + height <= 1`, but this
/// is not checked when the table is read: [`Roi::from_region`] clips instead.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Region {
    pub name: &'static str,
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub const fn new(name: &'static str, top: f32, left: f32, width: f32, height: f32) -> Self {
        Self {
            name,
            top,
            left,
            width,
            height,
        }
    }

    /// Whether the rectangle stays inside the unit square.
    pub fn fits_unit_square(&self) -> bool {
        let non_negative =
            self.top >= 0.0 && self.left >= 0.0 && self.width > 0.0 && self.height > 0.0;
        non_negative
            && self.left + self.width <= 1.0 + f32::EPSILON
            && self.top + self.height <= 1.0 + f32::EPSILON
    }
}

/// Pixel rectangle resolved from a [`Region`] on a concrete image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Resolve a fractional region against image dimensions.
    ///
    /// Offsets are `round(dimension * fraction)`. The rectangle is clipped to
    /// the image, so a region that falls outside yields a zero-area ROI.
    pub fn from_region(region: &Region, image_width: u32, image_height: u32) -> Self {
        let scale = |dim: u32, fraction: f32| -> u32 {
            let v = (dim as f64 * fraction.max(0.0) as f64).round();
            v.min(u32::MAX as f64) as u32
        };

        let x = scale(image_width, region.left).min(image_width);
        let y = scale(image_height, region.top).min(image_height);
        let width = scale(image_width, region.width).min(image_width - x);
        let height = scale(image_height, region.height).min(image_height - y);

        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Non-empty rectangle.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn x2(&self) -> u32 {
        self.x + self.width
    }

    pub fn y2(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}
