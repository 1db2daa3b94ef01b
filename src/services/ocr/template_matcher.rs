use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, ScanError};

/// Score of one candidate icon against a crop.
#[derive(Debug, Clone, PartialEq)]
pub struct IconScore {
    pub label: String,
    /// Mean-subtracted normalized cross-correlation in `[-1, 1]`.
    pub score: f32,
}

/// Reference-icon matcher used to separate close color candidates.
///
/// Icons are read from `<icon_dir>/<label>.png` on first use and cached for
/// the life of the matcher.
pub struct IconMatcher {
    icon_dir: Option<PathBuf>,
    cache: Mutex<HashMap<String, Arc<RgbImage>>>,
}

impl IconMatcher {
    /// Matcher reading icons from a directory
    pub fn new<P: AsRef<Path>>(icon_dir: P) -> Self {
        Self {
            icon_dir: Some(icon_dir.as_ref().to_path_buf()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Matcher over a fixed in-memory icon set
    pub fn from_icons<I>(icons: I) -> Self
    where
        I: IntoIterator<Item = (String, RgbImage)>,
    {
        let cache = icons
            .into_iter()
            .map(|(label, icon)| (label, Arc::new(icon)))
            .collect();
        Self {
            icon_dir: None,
            cache: Mutex::new(cache),
        }
    }

    /// Path of a label's reference icon, when backed by a directory.
    pub fn icon_path(&self, label: &str) -> Option<PathBuf> {
        self.icon_dir.as_ref().map(|dir| dir.join(format!("{}.png", label)))
    }

    /// Load (or fetch from cache) the reference icon for a label.
    pub fn load_icon(&self, label: &str) -> Result<Arc<RgbImage>> {
        if let Some(icon) = self.cache.lock().get(label) {
            return Ok(Arc::clone(icon));
        }

        let path = self
            .icon_path(label)
            .ok_or_else(|| ScanError::Recognition(format!("No reference icon for {}", label)))?;

        if !path.exists() {
            return Err(ScanError::Recognition(format!(
                "Reference icon not found: {:?}",
                path
            )));
        }

        let icon = image::open(&path)
            .map_err(|e| ScanError::Recognition(format!("Failed to load icon {:?}: {}", path, e)))?
            .to_rgb8();
        let icon = Arc::new(icon);

        self.cache.lock().insert(label.to_string(), Arc::clone(&icon));
        Ok(icon)
    }

    /// Score every candidate; the highest correlation wins.
    ///
    /// Each icon is resized to the crop's dimensions. Ties keep candidate
    /// order. Any icon that cannot be loaded fails the whole comparison so
    /// the caller can fall back on color evidence.
    pub fn best_match(
        &self,
        crop: &RgbImage,
        mask: Option<&GrayImage>,
        candidates: &[&str],
    ) -> Result<Option<IconScore>> {
        let (width, height) = crop.dimensions();
        let mut best: Option<IconScore> = None;

        for label in candidates {
            let icon = self.load_icon(label)?;
            let resized = imageops::resize(icon.as_ref(), width, height, FilterType::Triangle);
            let score = normalized_cross_correlation(crop, &resized, mask);
            debug!(label = %label, score, "icon correlation");

            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(IconScore {
                    label: label.to_string(),
                    score,
                });
            }
        }

        Ok(best)
    }
}

/// Mean-subtracted normalized cross-correlation over RGB channels.
///
/// Only pixels where `mask` is non-zero take part. Returns `0.0` for
/// mismatched sizes or when either side has no variance.
pub fn normalized_cross_correlation(a: &RgbImage, b: &RgbImage, mask: Option<&GrayImage>) -> f32 {
    if a.dimensions() != b.dimensions() {
        return 0.0;
    }
    if let Some(mask) = mask {
        if mask.dimensions() != a.dimensions() {
            return 0.0;
        }
    }

    let included = |x: u32, y: u32| mask.map_or(true, |m| m.get_pixel(x, y)[0] > 0);

    let mut count = 0f64;
    let mut sum_a = [0f64; 3];
    let mut sum_b = [0f64; 3];
    for (x, y, pa) in a.enumerate_pixels() {
        if !included(x, y) {
            continue;
        }
        let pb = b.get_pixel(x, y);
        for c in 0..3 {
            sum_a[c] += pa[c] as f64;
            sum_b[c] += pb[c] as f64;
        }
        count += 1.0;
    }
    if count == 0.0 {
        return 0.0;
    }

    let mean_a = sum_a.map(|s| s / count);
    let mean_b = sum_b.map(|s| s / count);

    let mut cross = 0f64;
    let mut var_a = 0f64;
    let mut var_b = 0f64;
    for (x, y, pa) in a.enumerate_pixels() {
        if !included(x, y) {
            continue;
        }
        let pb = b.get_pixel(x, y);
        for c in 0..3 {
            let da = pa[c] as f64 - mean_a[c];
            let db = pb[c] as f64 - mean_b[c];
            cross += da * db;
            var_a += da * da;
            var_b += db * db;
        }
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (cross / denom) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Ring icon: colored band around a dark center.
    fn ring_icon(size: u32, color: [u8; 3]) -> RgbImage {
        let c = size as i32 / 2;
        RgbImage::from_fn(size, size, |x, y| {
            let d = (x as i32 - c).pow(2) + (y as i32 - c).pow(2);
            if d > (c / 2).pow(2) && d <= c.pow(2) {
                Rgb(color)
            } else {
                Rgb([20, 20, 20])
            }
        })
    }

    /// Split icon: left half colored, right half dark.
    fn split_icon(size: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_fn(size, size, |x, _| {
            if x < size / 2 {
                Rgb(color)
            } else {
                Rgb([20, 20, 20])
            }
        })
    }

    #[test]
    fn test_ncc_identical_is_one() {
        let icon = ring_icon(32, [200, 60, 200]);
        let score = normalized_cross_correlation(&icon, &icon, None);
        assert!((score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ncc_inverted_is_negative() {
        let a = split_icon(16, [220, 220, 220]);
        let b = RgbImage::from_fn(16, 16, |x, y| {
            let p = a.get_pixel(x, y);
            Rgb([255 - p[0], 255 - p[1], 255 - p[2]])
        });
        assert!(normalized_cross_correlation(&a, &b, None) < -0.99);
    }

    #[test]
    fn test_ncc_flat_image_is_zero() {
        let flat = RgbImage::from_pixel(8, 8, Rgb([100, 100, 100]));
        let icon = ring_icon(8, [255, 0, 0]);
        assert_eq!(normalized_cross_correlation(&flat, &icon, None), 0.0);
    }

    #[test]
    fn test_ncc_size_mismatch_is_zero() {
        let a = ring_icon(8, [255, 0, 0]);
        let b = ring_icon(9, [255, 0, 0]);
        assert_eq!(normalized_cross_correlation(&a, &b, None), 0.0);
    }

    #[test]
    fn test_best_match_picks_highest_correlation() {
        // The crop is a ring; the ring icon is the more similar reference
        // and must win over the split icon.
        let crop = ring_icon(40, [190, 70, 190]);
        let matcher = IconMatcher::from_icons(vec![
            ("Havoc".to_string(), ring_icon(64, [200, 60, 200])),
            ("Electro".to_string(), split_icon(64, [200, 60, 200])),
        ]);

        let ring_score = normalized_cross_correlation(
            &crop,
            &imageops::resize(&ring_icon(64, [200, 60, 200]), 40, 40, FilterType::Triangle),
            None,
        );
        let split_score = normalized_cross_correlation(
            &crop,
            &imageops::resize(&split_icon(64, [200, 60, 200]), 40, 40, FilterType::Triangle),
            None,
        );
        assert!(ring_score > split_score);

        // Candidate order must not matter.
        let best = matcher.best_match(&crop, None, &["Electro", "Havoc"]).unwrap().unwrap();
        assert_eq!(best.label, "Havoc");
        let best = matcher.best_match(&crop, None, &["Havoc", "Electro"]).unwrap().unwrap();
        assert_eq!(best.label, "Havoc");
    }

    #[test]
    fn test_missing_icon_is_recognition_error() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = IconMatcher::new(dir.path());
        let crop = ring_icon(16, [255, 0, 0]);

        let result = matcher.best_match(&crop, None, &["Aero", "Havoc"]);
        assert!(matches!(result, Err(ScanError::Recognition(_))));
    }

    #[test]
    fn test_icons_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        ring_icon(24, [60, 200, 90]).save(dir.path().join("Aero.png")).unwrap();

        let matcher = IconMatcher::new(dir.path());
        assert_eq!(matcher.icon_path("Aero"), Some(dir.path().join("Aero.png")));

        let icon = matcher.load_icon("Aero").unwrap();
        assert_eq!(icon.dimensions(), (24, 24));

        // Second load comes from the cache even if the file is gone.
        std::fs::remove_file(dir.path().join("Aero.png")).unwrap();
        assert!(matcher.load_icon("Aero").is_ok());
    }

    #[test]
    fn test_best_match_empty_candidates() {
        let matcher = IconMatcher::from_icons(Vec::new());
        let crop = ring_icon(16, [255, 0, 0]);
        assert_eq!(matcher.best_match(&crop, None, &[]).unwrap(), None);
    }
}
