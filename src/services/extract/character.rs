use image::RgbImage;
use tracing::{debug, info};

use super::{ScanContext, TextPipeline};
use crate::error::{Result, ScanError};
use crate::models::analysis::CharacterAnalysis;
use crate::models::color::RgbTarget;
use crate::services::catalog::ReferenceCatalog;
use crate::services::color_classifier::rgb_coverage;
use crate::services::ocr::parser::{parse_character_element, parse_character_level, parse_uid};
use crate::services::ocr::RecognitionOptions;
use crate::services::region_catalog::{AVATAR_SAMPLES, CHARACTER_PAGE, UID};

/// Elements the customizable avatar can carry.
pub const AVATAR_ELEMENTS: [&str; 2] = ["Havoc", "Spectro"];

/// Dark clothing colors of the male avatar variant.
pub const DARK_CLOTHING: [RgbTarget; 2] = [
    RgbTarget::new([38, 34, 34], 25),
    RgbTarget::new([36, 48, 46], 25),
];

/// A sample region votes male above this dark-pixel fraction.
pub const MALE_VOTE_FRACTION: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarVariant {
    Male,
    Female,
}

impl AvatarVariant {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Male => "Rover (M)",
            Self::Female => "Rover (F)",
        }
    }
}

/// Majority vote over the clothing samples: two male votes make it male.
pub fn resolve_avatar_variant(samples: &[RgbImage]) -> AvatarVariant {
    let votes = samples
        .iter()
        .filter(|sample| {
            let fraction = rgb_coverage(sample, &DARK_CLOTHING);
            debug!(fraction, "avatar sample dark fraction");
            fraction > MALE_VOTE_FRACTION
        })
        .count();

    if votes >= 2 {
        AvatarVariant::Male
    } else {
        AvatarVariant::Female
    }
}

/// Name, level and element from the overview text.
pub fn parse_character_text(text: &str, catalog: &ReferenceCatalog) -> CharacterAnalysis {
    CharacterAnalysis {
        name: catalog.match_character(text).map(str::to_string),
        level: parse_character_level(text),
        element: parse_character_element(text).map(str::to_string),
        uid: None,
    }
}

/// The avatar fallback applies when a level and an avatar element were read
/// but no catalog name matched.
pub fn needs_avatar_variant(analysis: &CharacterAnalysis) -> bool {
    analysis.name.is_none()
        && analysis.level.is_some()
        && analysis
            .element
            .as_deref()
            .is_some_and(|element| AVATAR_ELEMENTS.contains(&element))
}

pub fn extract(ctx: &ScanContext<'_>) -> Result<CharacterAnalysis> {
    let text = ctx.read_text(&CHARACTER_PAGE, TextPipeline::General, &RecognitionOptions::default())?;
    let mut analysis = parse_character_text(&text, ctx.catalog);

    if needs_avatar_variant(&analysis) {
        let samples = AVATAR_SAMPLES
            .iter()
            .map(|region| ctx.crop_rgb(region))
            .collect::<Result<Vec<_>>>()?;
        let variant = resolve_avatar_variant(&samples);
        info!(?variant, "avatar variant resolved");
        analysis.name = Some(variant.display_name().to_string());
    }

    analysis.uid = read_uid(ctx)?;
    Ok(analysis)
}

/// UID digits; an engine failure leaves the field empty.
fn read_uid(ctx: &ScanContext<'_>) -> Result<Option<String>> {
    match ctx.read_small_text(&UID, &RecognitionOptions::digits()) {
        Ok(text) => Ok(parse_uid(&text)),
        Err(ScanError::Recognition(e)) => {
            debug!("UID recognition failed: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
