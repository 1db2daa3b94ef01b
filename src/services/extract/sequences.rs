use image::RgbImage;
use tracing::debug;

use super::ScanContext;
use crate::error::Result;
use crate::models::analysis::SequenceAnalysis;
use crate::models::color::HsvRange;
use crate::services::color_classifier::hsv_coverage;
use crate::services::region_catalog::SEQUENCE_SLOTS;

/// Unlocked node glow on slots 1-5.
pub const ACTIVE_YELLOW: HsvRange = HsvRange::new([45, 100, 150], [65, 255, 255]);
/// Slots 1-5 are active above this yellow fraction (0.1 %).
pub const ACTIVE_THRESHOLD: f32 = 0.001;

/// Slot 6 glows in a wider yellow band.
pub const SLOT6_YELLOW: HsvRange = HsvRange::new([30, 50, 100], [75, 255, 255]);
pub const SLOT6_LOCKED_BLUE: HsvRange = HsvRange::new([100, 30, 30], [130, 255, 255]);

/// Active state of one slot crop; `index` is 0-based.
pub fn slot_active(index: usize, slot: &RgbImage) -> bool {
    if index == 5 {
        let yellow = hsv_coverage(slot, &[SLOT6_YELLOW], None);
        let blue = hsv_coverage(slot, &[SLOT6_LOCKED_BLUE], None);
        debug!(slot = index + 1, yellow, blue, "sequence slot ratios");
        yellow > blue
    } else {
        let yellow = hsv_coverage(slot, &[ACTIVE_YELLOW], None);
        debug!(slot = index + 1, yellow, "sequence slot ratio");
        yellow > ACTIVE_THRESHOLD
    }
}

/// Sequences unlock strictly in order, so only the leading run of active
/// slots counts; a stray active slot after a gap is ignored.
pub fn count_sequence(states: &[bool]) -> u8 {
    states.iter().take_while(|active| **active).count() as u8
}

pub fn extract(ctx: &ScanContext<'_>) -> Result<SequenceAnalysis> {
    let mut states = Vec::with_capacity(SEQUENCE_SLOTS.len());
    for (index, region) in SEQUENCE_SLOTS.iter().enumerate() {
        let slot = ctx.crop_rgb(region)?;
        states.push(slot_active(index, &slot));
    }

    Ok(SequenceAnalysis {
        sequence: count_sequence(&states),
    })
}
