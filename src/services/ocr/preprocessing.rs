use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::filter::{bilateral_filter, gaussian_blur_f32, median_filter};
use imageproc::morphology::close;

/// Tile-based histogram equalization settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClaheConfig {
    /// Histogram bins are clipped at `clip_limit * tile_pixels / 256`.
    pub clip_limit: f32,
    /// Tiles per axis.
    pub grid: u32,
}

/// Knobs for both preprocessing variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessingConfig {
    pub general_clahe: ClaheConfig,
    pub echo_clahe: ClaheConfig,
    /// Window size handed to the bilateral filter.
    pub bilateral_window: u32,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_space: f32,
    /// Blur applied between the two echo threshold passes.
    pub echo_blur_sigma: f32,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            general_clahe: ClaheConfig {
                clip_limit: 2.0,
                grid: 8,
            },
            echo_clahe: ClaheConfig {
                clip_limit: 3.0,
                grid: 4,
            },
            bilateral_window: 9,
            bilateral_sigma_color: 75.0,
            bilateral_sigma_space: 75.0,
            echo_blur_sigma: 0.6,
        }
    }
}

/// Image preprocessing service for OCR optimization
///
/// Both pipelines are pure functions of the input crop.
#[derive(Debug, Clone, Default)]
pub struct PreprocessingService {
    config: PreprocessingConfig,
}

impl PreprocessingService {
    /// Create a new preprocessing service with custom configuration
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    /// General text pipeline: grayscale → denoise → CLAHE → Otsu binarization.
    pub fn preprocess(&self, image: &DynamicImage) -> DynamicImage {
        let gray = image.to_luma8();
        let denoised = median_filter(&gray, 1, 1);
        let enhanced = clahe(&denoised, self.config.general_clahe);
        DynamicImage::ImageLuma8(self.threshold(&enhanced))
    }

    /// Echo panel pipeline: grayscale → bilateral → CLAHE → inverted Otsu →
    /// normal threshold → closing.
    pub fn preprocess_echo(&self, image: &DynamicImage) -> DynamicImage {
        let gray = image.to_luma8();
        let smoothed = bilateral_filter(
            &gray,
            self.config.bilateral_window,
            self.config.bilateral_sigma_color,
            self.config.bilateral_sigma_space,
        );
        let enhanced = clahe(&smoothed, self.config.echo_clahe);

        // Light text on a dark panel: the inverted pass turns glyphs black.
        let inverted = self.threshold_inverted(&enhanced);

        let softened = gaussian_blur_f32(&inverted, self.config.echo_blur_sigma);
        let binary = threshold(&softened, 128, ThresholdType::Binary);

        DynamicImage::ImageLuma8(close(&binary, Norm::LInf, 1))
    }

    /// Apply binary thresholding (Otsu's method)
    pub fn threshold(&self, gray_img: &GrayImage) -> GrayImage {
        threshold(gray_img, otsu_level(gray_img), ThresholdType::Binary)
    }

    /// Otsu thresholding with foreground and background swapped.
    pub fn threshold_inverted(&self, gray_img: &GrayImage) -> GrayImage {
        threshold(gray_img, otsu_level(gray_img), ThresholdType::BinaryInverted)
    }
}

/// Contrast-limited adaptive histogram equalization.
///
/// Each tile gets a clipped, equalized lookup table; pixels blend the tables
/// of the four nearest tile centers bilinearly so tile seams don't show.
pub fn clahe(image: &GrayImage, config: ClaheConfig) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let grid = config.grid.max(1);
    let tile_w = width.div_ceil(grid).max(1);
    let tile_h = height.div_ceil(grid).max(1);
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            luts.push(tile_lut(image, x0, y0, x1, y1, config.clip_limit));
        }
    }

    // Position of a pixel in tile-center coordinates, split into the lower
    // tile index and the blend weight toward the next one.
    let locate = |p: u32, tile: u32, tiles: u32| -> (usize, usize, f32) {
        let pos = (p as f32 + 0.5) / tile as f32 - 0.5;
        if pos <= 0.0 {
            return (0, 0, 0.0);
        }
        let lo = pos.floor() as u32;
        if lo + 1 >= tiles {
            let last = (tiles - 1) as usize;
            return (last, last, 0.0);
        }
        (lo as usize, lo as usize + 1, pos - lo as f32)
    };

    ImageBuffer::from_fn(width, height, |x, y| {
        let v = image.get_pixel(x, y)[0] as usize;
        let (x_lo, x_hi, fx) = locate(x, tile_w, tiles_x);
        let (y_lo, y_hi, fy) = locate(y, tile_h, tiles_y);
        let at = |tx: usize, ty: usize| luts[ty * tiles_x as usize + tx][v] as f32;

        let top = at(x_lo, y_lo) * (1.0 - fx) + at(x_hi, y_lo) * fx;
        let bottom = at(x_lo, y_hi) * (1.0 - fx) + at(x_hi, y_hi) * fx;
        let blended = top * (1.0 - fy) + bottom * fy;

        Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}

fn tile_lut(image: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [u8; 256] {
    let mut hist = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[image.get_pixel(x, y)[0] as usize] += 1;
        }
    }

    let area = (x1 - x0) * (y1 - y0);
    let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);

    // Clip and spread the excess evenly.
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }
    let bonus = excess / 256;
    let mut remainder = (excess % 256) as usize;
    for bin in hist.iter_mut() {
        *bin += bonus;
        if remainder > 0 {
            *bin += 1;
            remainder -= 1;
        }
    }

    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0u8; 256];
    let mut cdf = 0u32;
    for (value, count) in hist.iter().enumerate() {
        cdf += count;
        lut[value] = (cdf as f32 * scale).round().min(255.0) as u8;
    }
    lut
}
