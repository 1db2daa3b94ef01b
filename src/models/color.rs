use serde::Serialize;

/// Inclusive HSV bounds on the OpenCV 8-bit scale (H 0-179, S/V 0-255).
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.lower[i] && hsv[i] <= self.upper[i])
    }
}

/// RGB reference color with a per-channel tolerance.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RgbTarget {
    pub rgb: [u8; 3],
    pub tolerance: u8,
}

impl RgbTarget {
    pub const fn new(rgb: [u8; 3], tolerance: u8) -> Self {
        Self { rgb, tolerance }
    }

    #[inline]
    pub fn matches(&self, rgb: [u8; 3]) -> bool {
        (0..3).all(|i| rgb[i].abs_diff(self.rgb[i]) <= self.tolerance)
    }
}
