use image::RgbImage;
use tracing::debug;

use super::ScanContext;
use crate::error::{Result, ScanError};
use crate::models::analysis::{ForteAnalysis, ForteBranchArray};
use crate::models::color::HsvRange;
use crate::services::color_classifier::{disk_mask, hsv_coverage};
use crate::services::ocr::parser::parse_forte_level;
use crate::services::ocr::RecognitionOptions;
use crate::services::region_catalog::{ForteBranch, ForteSlots, NodeRule, FORTE_SLOTS};

/// Red accent ring of an unlocked node; red wraps around hue 0.
pub const RED_ACCENT: [HsvRange; 2] = [
    HsvRange::new([0, 70, 90], [10, 255, 255]),
    HsvRange::new([170, 70, 90], [179, 255, 255]),
];
pub const RED_ACCENT_MIN: f32 = 0.15;

/// Locked tint of the circuit nodes.
pub const DARK_BLUE: HsvRange = HsvRange::new([100, 30, 30], [130, 255, 255]);
pub const DARK_BLUE_MAX: f32 = 0.60;

/// Node state from the crop pixels inside the icon disk.
pub fn node_active(node: &RgbImage, rule: NodeRule) -> bool {
    let mask = disk_mask(node.width(), node.height());
    match rule {
        NodeRule::RedAccent => {
            let red = hsv_coverage(node, &RED_ACCENT, Some(&mask));
            debug!(red, "forte node red coverage");
            red > RED_ACCENT_MIN
        }
        NodeRule::DarkBlueAbsent => {
            let blue = hsv_coverage(node, &[DARK_BLUE], Some(&mask));
            debug!(blue, "forte node dark-blue coverage");
            blue < DARK_BLUE_MAX
        }
    }
}

fn read_branch(ctx: &ScanContext<'_>, slots: &ForteSlots) -> Result<ForteBranchArray> {
    let level = match ctx.read_small_text(&slots.base, &RecognitionOptions::default()) {
        Ok(text) => parse_forte_level(&text),
        Err(ScanError::Recognition(e)) => {
            debug!(branch = ?slots.branch, "forte level unreadable: {}", e);
            1
        }
        Err(e) => return Err(e),
    };

    let rule = slots.branch.node_rule();
    let mid = node_active(&ctx.crop_rgb(&slots.mid)?, rule);
    let top = node_active(&ctx.crop_rgb(&slots.top)?, rule);

    Ok([level, mid as u8, top as u8])
}

pub fn extract(ctx: &ScanContext<'_>) -> Result<ForteAnalysis> {
    let mut analysis = ForteAnalysis::default();

    for slots in &FORTE_SLOTS {
        let branch = read_branch(ctx, slots)?;
        debug!(branch = ?slots.branch, levels = ?branch, "forte branch");

        match slots.branch {
            ForteBranch::NormalAttack => analysis.normal = branch,
            ForteBranch::Skill => analysis.skill = branch,
            ForteBranch::Circuit => analysis.circuit = branch,
            ForteBranch::Liberation => analysis.liberation = branch,
            ForteBranch::Intro => analysis.intro = branch,
        }
    }

    Ok(analysis)
}
