//! Text parsers for recognized page text.
//!
//! Every parser is a pure function of its input string. Absent or
//! out-of-range values come back as `None`; nothing here fails a scan.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::analysis::EchoStat;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex pattern")
}

/// Level patterns tolerant of a noisy "Lv"/"Level" prefix and separator.
static LEVEL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(r"Lv[\.|\s]*(\d+)[\s/]+(\d+)"),
        compile(r"v[\.]?(\d+)[\s/]+(\d+)"),
        compile(r"Level[\s]*(\d+)[\s/]+(\d+)"),
    ]
});

/// Extra weapon patterns for the "Lv" read as "Iyv"/"lyv" family.
static WEAPON_LEVEL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(r"[X\s]*[LlI1]yv\.?\s*(\d+)[\s/]+\d+"),
        compile(r"(?i)[X\s]*[LlI1]y?v\.?\s*(\d+)[\s/]+\d+"),
    ]
});

static RANK: LazyLock<Regex> = LazyLock::new(|| compile(r"rank\s*(\d+)"));

static CHARACTER_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)aero|electro|fusion|glacio|havoc|spectro"));

static FORTE_LEVEL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(r"(\d+)/[\s]*(?:10|110)"),
        compile(r"Lv[:\.]\s*(\d+)/"),
        compile(r"v[:\.]\s*(\d+)/"),
        compile(r"Lv[:\.]\s*(\d+)"),
        compile(r"v[:\.]\s*(\d+)"),
    ]
});

static ECHO_COST: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\bCOST\s*(\d+)"));
static ECHO_LEVEL: LazyLock<Regex> = LazyLock::new(|| compile(r"\+\s*(\d{1,2})\b"));

/// Trailing "value with optional %" after a stat name.
static STAT_LINE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^(?P<name>.*?)\s*(?P<value>\d+(?:[.,]\d+)?)\s*(?P<pct>%)?\s*$"));

pub const CHARACTER_LEVEL_RANGE: std::ops::RangeInclusive<u32> = 1..=90;
pub const WEAPON_RANK_RANGE: std::ops::RangeInclusive<u32> = 1..=5;
pub const FORTE_LEVEL_RANGE: std::ops::RangeInclusive<u32> = 1..=10;
pub const ECHO_LEVEL_RANGE: std::ops::RangeInclusive<u32> = 0..=25;
pub const ECHO_COSTS: [u32; 3] = [1, 3, 4];

/// Stat name shown when the name part of a line is unreadable.
pub const UNKNOWN_STAT: &str = "Unknown";

/// Known misreads in stat names, applied in order.
pub const STAT_CORRECTIONS: &[(&str, &str)] = &[
    ("Crlt", "Crit"),
    ("Cnit", "Crit"),
    ("Grit", "Crit"),
    ("DMC", "DMG"),
    ("DNG", "DMG"),
    ("OMG", "DMG"),
    ("ATX", "ATK"),
    ("AIK", "ATK"),
    ("Enerqy", "Energy"),
    ("Reqen", "Regen"),
    ("Bonns", "Bonus"),
    ("Resonanee", "Resonance"),
    ("Liberatlon", "Liberation"),
    ("Crit.Rate", "Crit. Rate"),
    ("Crit.DMG", "Crit. DMG"),
    ("Crit Rate", "Crit. Rate"),
    ("Crit DMG", "Crit. DMG"),
];

/// Lowercase the header text and drop the glyphs the recognizer invents
/// around the page icon.
pub fn normalize_page_text(text: &str) -> String {
    text.to_lowercase().replace(['©', '€'], "")
}

/// Drop colons, turn dots into spaces and fold double spaces.
pub fn clean_level_text(text: &str) -> String {
    text.replace(':', "").replace('.', " ").replace("  ", " ")
}

fn first_in_range(
    text: &str,
    patterns: &[Regex],
    range: &std::ops::RangeInclusive<u32>,
) -> Option<u32> {
    patterns.iter().find_map(|pattern| {
        let captures = pattern.captures(text)?;
        let value: u32 = captures.get(1)?.as_str().parse().ok()?;
        range.contains(&value).then_some(value)
    })
}

/// Current level from a "Lv. 45/90"-style counter.
///
/// Patterns are tried in order; the first one whose current level lies in
/// 1-90 wins.
pub fn parse_character_level(text: &str) -> Option<u32> {
    let cleaned = clean_level_text(text);
    first_in_range(&cleaned, &LEVEL_PATTERNS, &CHARACTER_LEVEL_RANGE)
}

/// Character patterns followed by the weapon-page misread variants.
pub fn parse_weapon_level(text: &str) -> Option<u32> {
    let cleaned = clean_level_text(text);
    first_in_range(&cleaned, &LEVEL_PATTERNS, &CHARACTER_LEVEL_RANGE)
        .or_else(|| first_in_range(&cleaned, &WEAPON_LEVEL_PATTERNS, &CHARACTER_LEVEL_RANGE))
}

pub fn parse_weapon_rank(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    let value: u32 = RANK.captures(&lower)?.get(1)?.as_str().parse().ok()?;
    WEAPON_RANK_RANGE.contains(&value).then_some(value)
}

/// First non-empty line, stripped of stray glyphs, with `q` read as `g`.
pub fn clean_weapon_line(text: &str) -> String {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    let stripped = line.replace(['©', '\\', '%', ':'], "");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace('q', "g")
}

/// Canonical element name from the first element word in the overview text.
pub fn parse_character_element(text: &str) -> Option<&'static str> {
    let found = CHARACTER_ELEMENT.find(text)?;

    match found.as_str().to_lowercase().as_str() {
        "aero" => Some("Aero"),
        "electro" => Some("Electro"),
        "fusion" => Some("Fusion"),
        "glacio" => Some("Glacio"),
        "havoc" => Some("Havoc"),
        "spectro" => Some("Spectro"),
        _ => None,
    }
}

/// First name that appears in the text, case-insensitively.
///
/// Catalog order decides: an earlier short name shadows a later name that
/// contains it.
pub fn first_catalog_match<'a, I>(text: &str, names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let haystack = text.to_lowercase();
    names
        .into_iter()
        .filter(|name| !name.is_empty())
        .find(|name| haystack.contains(&name.to_lowercase()))
}

/// Last nine digits of the recognized UID string.
pub fn parse_uid(text: &str) -> Option<String> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 9 {
        return None;
    }
    Some(digits[digits.len() - 9..].to_string())
}

/// Forte branch level in 1-10; 1 when nothing readable is found.
pub fn parse_forte_level(text: &str) -> u8 {
    let cleaned = text.replace(['\\', '"', '\''], "");
    first_in_range(&cleaned, &FORTE_LEVEL_PATTERNS, &FORTE_LEVEL_RANGE)
        .map(|level| level as u8)
        .unwrap_or(1)
}

pub fn parse_echo_cost(text: &str) -> Option<u32> {
    let value: u32 = ECHO_COST.captures(text)?.get(1)?.as_str().parse().ok()?;
    ECHO_COSTS.contains(&value).then_some(value)
}

/// Echo enhancement level from a "+25" line.
pub fn parse_echo_level(text: &str) -> Option<u32> {
    let value: u32 = ECHO_LEVEL.captures(text)?.get(1)?.as_str().parse().ok()?;
    ECHO_LEVEL_RANGE.contains(&value).then_some(value)
}

/// Rewrite known misreads, then tidy the name.
pub fn correct_stat_name(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_alphabetic() || *c == ' ' || *c == '.')
        .collect();
    let mut name = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    name = name.trim_matches(|c: char| c == '.' || c == ' ').to_string();

    for (wrong, right) in STAT_CORRECTIONS {
        if name.contains(wrong) {
            name = name.replace(wrong, right);
        }
    }

    if name.is_empty() {
        UNKNOWN_STAT.to_string()
    } else {
        name
    }
}

/// Parse "<name> <number>[%]".
pub fn parse_stat_line(line: &str) -> Option<EchoStat> {
    let captures = STAT_LINE.captures(line.trim())?;
    let value: f64 = captures
        .name("value")?
        .as_str()
        .replace(',', ".")
        .parse()
        .ok()?;

    Some(EchoStat {
        name: correct_stat_name(captures.name("name").map_or("", |m| m.as_str())),
        value,
        percent: captures.name("pct").is_some(),
    })
}
