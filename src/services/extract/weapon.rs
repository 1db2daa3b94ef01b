use super::{ScanContext, TextPipeline};
use crate::error::Result;
use crate::models::analysis::WeaponAnalysis;
use crate::services::catalog::ReferenceCatalog;
use crate::services::ocr::parser::{clean_weapon_line, parse_weapon_level, parse_weapon_rank};
use crate::services::ocr::RecognitionOptions;
use crate::services::region_catalog::WEAPON_PAGE;

/// Name and category come from the first text line only; level and rank
/// are searched in the whole text.
pub fn parse_weapon_text(text: &str, catalog: &ReferenceCatalog) -> WeaponAnalysis {
    let first_line = clean_weapon_line(text);
    let matched = catalog.match_weapon(&first_line);

    WeaponAnalysis {
        name: matched.map(|(name, _)| name.to_string()),
        weapon_type: matched.map(|(_, category)| category.to_string()),
        level: parse_weapon_level(text),
        rank: parse_weapon_rank(text),
    }
}

pub fn extract(ctx: &ScanContext<'_>) -> Result<WeaponAnalysis> {
    let text = ctx.read_text(&WEAPON_PAGE, TextPipeline::General, &RecognitionOptions::default())?;
    Ok(parse_weapon_text(&text, ctx.catalog))
}
