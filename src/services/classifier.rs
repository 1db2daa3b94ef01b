use tracing::{debug, info};

use crate::error::Result;
use crate::models::screen::ScreenType;
use crate::services::extract::{ScanContext, TextPipeline};
use crate::services::ocr::parser::normalize_page_text;
use crate::services::ocr::RecognitionOptions;
use crate::services::region_catalog::INFO;

/// Misread variants of the echo page's "COST" label.
const COST_KEYWORDS: &[&str] = &[
    "cost", "ost", "cst", "cos", "c0st", "co5t", "c05t", "-cost", "cost-", "(cost", "cost)",
];

/// Variants of the "/12" total-cost counter.
const COST_NUMBERS: &[&str] = &["/12", "112", "|12", "(12"];

/// Whole-word variants of the "All" filter tab.
const ALL_WORDS: &[&str] = &["all", "al", "ail", "ali", "at", "(all", "all)"];

/// Single header keywords, checked in this order.
const PAGE_KEYWORDS: [(&str, ScreenType); 4] = [
    ("overview", ScreenType::Character),
    ("weapon", ScreenType::Weapon),
    ("forte", ScreenType::Forte),
    ("resonance", ScreenType::Sequences),
];

/// Echo-page evidence found in the header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EchoSignals {
    pub cost_keyword: bool,
    pub cost_number: bool,
    pub all_word: bool,
}

impl EchoSignals {
    pub fn from_text(normalized: &str) -> Self {
        Self {
            cost_keyword: COST_KEYWORDS.iter().any(|k| normalized.contains(k)),
            cost_number: COST_NUMBERS.iter().any(|k| normalized.contains(k)),
            all_word: normalized
                .split_whitespace()
                .any(|word| ALL_WORDS.contains(&word)),
        }
    }

    pub fn count(&self) -> usize {
        [self.cost_keyword, self.cost_number, self.all_word]
            .iter()
            .filter(|s| **s)
            .count()
    }
}

/// Page type from the header text alone.
///
/// Two or more echo signals win outright; otherwise the first header
/// keyword present decides.
pub fn classify_text(text: &str) -> ScreenType {
    let normalized = normalize_page_text(text);

    let signals = EchoSignals::from_text(&normalized);
    debug!(?signals, "echo signals");
    if signals.count() >= 2 {
        return ScreenType::Echo;
    }

    PAGE_KEYWORDS
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|(_, screen)| *screen)
        .unwrap_or(ScreenType::Unknown)
}

/// Read the info region and classify the page.
pub fn classify_page(ctx: &ScanContext<'_>) -> Result<ScreenType> {
    let text = ctx.read_text(&INFO, TextPipeline::General, &RecognitionOptions::default())?;
    let screen = classify_text(&text);
    info!(screen = %screen, "page classified");
    Ok(screen)
}
