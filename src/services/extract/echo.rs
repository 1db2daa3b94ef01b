use image::RgbImage;
use tracing::{debug, info, warn};

use super::{ScanContext, TextPipeline};
use crate::error::Result;
use crate::models::analysis::EchoAnalysis;
use crate::models::color::HsvRange;
use crate::services::color_classifier::{disk_mask, donut_mask, rank_coverage};
use crate::services::ocr::parser::{parse_echo_cost, parse_echo_level, parse_stat_line};
use crate::services::ocr::{IconMatcher, RecognitionOptions, SegmentationMode};
use crate::services::region_catalog::{echo, ECHO_PAGE};

/// Set colors of the echo element icon, keyed by icon label.
pub static ELEMENT_RANGES: [(&str, HsvRange); 9] = [
    ("Healing", HsvRange::new([40, 0, 0], [94, 255, 255])),
    ("Attack", HsvRange::new([0, 36, 139], [5, 225, 221])),
    ("Electro", HsvRange::new([130, 40, 150], [145, 255, 255])),
    ("ER", HsvRange::new([0, 0, 180], [180, 30, 255])),
    ("Fusion", HsvRange::new([0, 62, 123], [68, 175, 255])),
    ("Glacio", HsvRange::new([85, 40, 150], [115, 255, 255])),
    ("Havoc", HsvRange::new([150, 0, 150], [180, 255, 255])),
    ("Aero", HsvRange::new([68, 120, 52], [88, 220, 152])),
    ("Spectro", HsvRange::new([10, 101, 86], [33, 173, 255])),
];

/// The leader alone decides unless it passes this fraction...
pub const AMBIGUOUS_TOP: f32 = 0.224;
/// ...and the runner-up passes this one too.
pub const AMBIGUOUS_SECOND: f32 = 0.230;

/// Sub-stat lines shown under the main stat.
pub const MAX_SUB_STATS: usize = 5;

/// Coverage of every set color over the icon rim, highest first.
pub fn rank_elements(crop: &RgbImage) -> Vec<(&'static str, f32)> {
    let candidates: Vec<(&'static str, &[HsvRange])> = ELEMENT_RANGES
        .iter()
        .map(|(label, range)| (*label, std::slice::from_ref(range)))
        .collect();
    let donut = donut_mask(crop.width(), crop.height());
    rank_coverage(crop, &candidates, Some(&donut))
}

/// One candidate, or two when both leaders are strong enough to be
/// confused with each other.
pub fn narrow_candidates(ranked: &[(&'static str, f32)]) -> Vec<&'static str> {
    match ranked {
        [] => Vec::new(),
        [(_, top), ..] if *top <= 0.0 => Vec::new(),
        [(first, top), (second, runner_up), ..]
            if *top > AMBIGUOUS_TOP && *runner_up > AMBIGUOUS_SECOND =>
        {
            vec![*first, *second]
        }
        [(first, _), ..] => vec![*first],
    }
}

/// Resolve the set label from ranked color evidence, using the reference
/// icons only when two candidates remain.
pub fn choose_element(
    ranked: &[(&'static str, f32)],
    crop: &RgbImage,
    icons: &IconMatcher,
) -> Option<&'static str> {
    let candidates = narrow_candidates(ranked);
    debug!(?candidates, "echo element candidates");

    match candidates.as_slice() {
        [] => None,
        [only] => Some(*only),
        [top, ..] => {
            let disk = disk_mask(crop.width(), crop.height());
            match icons.best_match(crop, Some(&disk), &candidates) {
                Ok(Some(best)) => candidates
                    .iter()
                    .copied()
                    .find(|label| *label == best.label)
                    .or(Some(*top)),
                Ok(None) => Some(*top),
                Err(e) => {
                    warn!("Icon comparison unavailable, using color ranking: {}", e);
                    Some(*top)
                }
            }
        }
    }
}

/// Name, cost, level and stat lines from the detail panel text.
pub fn parse_echo_text(text: &str) -> EchoAnalysis {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let mut analysis = EchoAnalysis {
        name: lines
            .next()
            .map(|line| line.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .filter(|name| !name.is_empty()),
        ..Default::default()
    };

    for line in lines {
        if analysis.cost.is_none() {
            if let Some(cost) = parse_echo_cost(line) {
                analysis.cost = Some(cost);
                continue;
            }
        }
        if analysis.level.is_none() {
            if let Some(level) = parse_echo_level(line) {
                analysis.level = Some(level);
                continue;
            }
        }

        let Some(stat) = parse_stat_line(line) else {
            continue;
        };
        if analysis.main_stat.is_none() {
            analysis.main_stat = Some(stat);
        } else if analysis.sub_stats.len() < MAX_SUB_STATS {
            analysis.sub_stats.push(stat);
        }
    }

    analysis
}

pub fn extract(ctx: &ScanContext<'_>) -> Result<EchoAnalysis> {
    let crop = ctx.crop_rgb(&echo::ELEMENT)?;
    if ctx.debug.is_enabled() {
        ctx.debug.save_gray("element_donut", &donut_mask(crop.width(), crop.height()));
    }

    let ranked = rank_elements(&crop);
    for (label, coverage) in &ranked {
        debug!(element = label, coverage, "echo element coverage");
    }
    let element = choose_element(&ranked, &crop, ctx.icons);
    info!(?element, "echo element resolved");

    let text = ctx.read_text(
        &ECHO_PAGE,
        TextPipeline::Echo,
        &RecognitionOptions::new(SegmentationMode::SingleBlock),
    )?;

    let mut analysis = parse_echo_text(&text);
    analysis.element = element.map(str::to_string);
    Ok(analysis)
}
