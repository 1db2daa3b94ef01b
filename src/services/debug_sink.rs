use chrono::Local;
use image::{DynamicImage, GrayImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::models::config::DebugConfig;

static SCAN_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Writes intermediate crops and masks for offline inspection.
///
/// Each scan gets its own timestamped directory. Nothing written here feeds
/// back into a result, and every I/O failure is swallowed.
#[derive(Debug, Default)]
pub struct DebugSink {
    dir: Option<PathBuf>,
    warned: AtomicBool,
}

impl DebugSink {
    /// Sink that drops everything.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Sink writing below `base/<timestamp>-<n>/`.
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        let seq = SCAN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self {
            dir: Some(base.as_ref().join(format!("{}-{}", stamp, seq))),
            warned: AtomicBool::new(false),
        }
    }

    /// Per-scan sink as configured.
    pub fn for_scan(config: &DebugConfig) -> Self {
        if config.enabled {
            Self::new(config.resolved_dir())
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Save an image as `<name>.png`.
    pub fn save(&self, name: &str, image: &DynamicImage) {
        let Some(dir) = &self.dir else { return };

        let result = fs::create_dir_all(dir)
            .map_err(|e| e.to_string())
            .and_then(|_| {
                image
                    .save(dir.join(format!("{}.png", name)))
                    .map_err(|e| e.to_string())
            });

        if let Err(e) = result {
            if !self.warned.swap(true, Ordering::Relaxed) {
                warn!("Debug artifacts disabled for this scan ({:?}): {}", dir, e);
            } else {
                debug!("Skipped debug artifact {}: {}", name, e);
            }
        }
    }

    pub fn save_gray(&self, name: &str, image: &GrayImage) {
        if self.is_enabled() {
            self.save(name, &DynamicImage::ImageLuma8(image.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn test_disabled_sink_writes_nothing() {
        let sink = DebugSink::disabled();
        assert!(!sink.is_enabled());
        sink.save("info", &DynamicImage::ImageRgb8(RgbImage::new(4, 4)));
    }

    #[test]
    fn test_sink_writes_png_into_scan_dir() {
        let base = tempfile::tempdir().unwrap();
        let sink = DebugSink::new(base.path());

        sink.save("info_original", &DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]))));
        sink.save_gray("info_processed", &GrayImage::from_pixel(4, 4, Luma([255])));

        let dir = sink.dir().unwrap();
        assert!(dir.starts_with(base.path()));
        assert!(dir.join("info_original.png").exists());
        assert!(dir.join("info_processed.png").exists());
    }

    #[test]
    fn test_each_scan_gets_its_own_dir() {
        let base = tempfile::tempdir().unwrap();
        let a = DebugSink::new(base.path());
        let b = DebugSink::new(base.path());
        assert_ne!(a.dir(), b.dir());
    }

    #[test]
    fn test_unwritable_dir_fails_silently() {
        let base = tempfile::tempdir().unwrap();
        // A regular file where the directory should go.
        let blocker = base.path().join("blocked");
        fs::write(&blocker, b"x").unwrap();

        let sink = DebugSink::new(&blocker);
        sink.save("a", &DynamicImage::ImageRgb8(RgbImage::new(2, 2)));
        sink.save("b", &DynamicImage::ImageRgb8(RgbImage::new(2, 2)));
        assert!(sink.warned.load(Ordering::Relaxed));
    }

    #[test]
    fn test_for_scan_respects_enabled_flag() {
        assert!(!DebugSink::for_scan(&DebugConfig::default()).is_enabled());

        let base = tempfile::tempdir().unwrap();
        let config = DebugConfig {
            enabled: true,
            dir: Some(base.path().to_path_buf()),
        };
        assert!(DebugSink::for_scan(&config).is_enabled());
    }
}
