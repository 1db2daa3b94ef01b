//! End-to-end scans of synthetic screenshots with a scripted text engine.

use image::{DynamicImage, Rgb, RgbImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use wuwa_ocr_lib::models::analysis::{AnalysisResult, ForteAnalysis, SequenceAnalysis};
use wuwa_ocr_lib::models::region::{Region, Roi};
use wuwa_ocr_lib::services::region_catalog::{
    echo, AVATAR_SAMPLES, FORTE_SLOTS, SEQUENCE_SLOTS,
};
use wuwa_ocr_lib::{
    Analyzer, IconMatcher, OcrEngine, RecognitionOptions, ReferenceCatalog, Result, ScanError,
    ScanResponse,
};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

const BACKGROUND: Rgb<u8> = Rgb([30, 30, 40]);
const GLOW: Rgb<u8> = Rgb([100, 230, 20]);
const LOCKED: Rgb<u8> = Rgb([30, 50, 120]);
const RED: Rgb<u8> = Rgb([220, 40, 40]);
const WHITE: Rgb<u8> = Rgb([235, 235, 235]);
const GLACIO: Rgb<u8> = Rgb([60, 170, 230]);
const DARK_CLOTH: Rgb<u8> = Rgb([40, 36, 36]);

/// Replays recognized texts in call order, wrapping around so the same
/// scan can be repeated.
struct ScriptedEngine {
    script: Vec<String>,
    next: AtomicUsize,
}

impl ScriptedEngine {
    fn new(script: &[&str]) -> Self {
        Self {
            script: script.iter().map(|s| s.to_string()).collect(),
            next: AtomicUsize::new(0),
        }
    }
}

impl OcrEngine for ScriptedEngine {
    fn recognize(&self, _image: &DynamicImage, _options: &RecognitionOptions) -> Result<String> {
        let index = self.next.fetch_add(1, Ordering::SeqCst) % self.script.len();
        Ok(self.script[index].clone())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Scripted engine whose digit-only reads always fail.
struct NoDigitsEngine(ScriptedEngine);

impl OcrEngine for NoDigitsEngine {
    fn recognize(&self, image: &DynamicImage, options: &RecognitionOptions) -> Result<String> {
        if options.whitelist.is_some() {
            return Err(ScanError::Recognition("digits unreadable".to_string()));
        }
        self.0.recognize(image, options)
    }
}

fn catalog() -> ReferenceCatalog {
    ReferenceCatalog::from_parts(
        vec!["Jinhsi".to_string(), "Changli".to_string()],
        vec![(
            "Broadblade".to_string(),
            vec!["Verdant Summit".to_string(), "Ages of Harvest".to_string()],
        )],
    )
}

fn analyzer(script: &[&str]) -> Analyzer {
    Analyzer::new(
        Arc::new(ScriptedEngine::new(script)),
        catalog(),
        IconMatcher::from_icons(Vec::new()),
    )
}

fn blank() -> RgbImage {
    RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND)
}

fn paint(image: &mut RgbImage, region: &Region, color: Rgb<u8>) {
    let roi = Roi::from_region(region, WIDTH, HEIGHT);
    for y in roi.y..roi.y2() {
        for x in roi.x..roi.x2() {
            image.put_pixel(x, y, color);
        }
    }
}

fn scan(analyzer: &Analyzer, image: RgbImage) -> ScanResponse {
    analyzer.scan(&DynamicImage::ImageRgb8(image))
}

#[test]
fn test_character_page() {
    let analyzer = analyzer(&["Overview", "Jinhsi\nSpectro\nLv. 90/90", "UID: 700123456"]);
    let response = scan(&analyzer, blank());

    assert!(response.success);
    let Some(AnalysisResult::Character(character)) = response.analysis else {
        panic!("expected a character record");
    };
    assert_eq!(character.name.as_deref(), Some("Jinhsi"));
    assert_eq!(character.level, Some(90));
    assert_eq!(character.element.as_deref(), Some("Spectro"));
    assert_eq!(character.uid.as_deref(), Some("700123456"));
}

#[test]
fn test_character_uid_failure_leaves_field_empty() {
    let engine = NoDigitsEngine(ScriptedEngine::new(&["Overview", "Jinhsi\nSpectro\nLv. 90/90"]));
    let analyzer = Analyzer::new(Arc::new(engine), catalog(), IconMatcher::from_icons(Vec::new()));
    let response = scan(&analyzer, blank());

    assert!(response.success);
    assert!(response.error.is_none());
    let Some(AnalysisResult::Character(character)) = &response.analysis else {
        panic!("expected a character record");
    };
    assert_eq!(character.name.as_deref(), Some("Jinhsi"));
    assert_eq!(character.level, Some(90));
    assert_eq!(character.uid, None);

    let json = serde_json::to_value(&response).unwrap();
    assert!(json["analysis"].get("uid").is_none());
}

#[test]
fn test_character_avatar_variant() {
    let mut image = blank();
    paint(&mut image, &AVATAR_SAMPLES[0], DARK_CLOTH);
    paint(&mut image, &AVATAR_SAMPLES[1], DARK_CLOTH);

    let analyzer = analyzer(&["Overview", "Rover\nHavoc\nLv. 50/60", "UID 12"]);
    let response = scan(&analyzer, image);

    let Some(AnalysisResult::Character(character)) = response.analysis else {
        panic!("expected a character record");
    };
    assert_eq!(character.name.as_deref(), Some("Rover (M)"));
    assert_eq!(character.level, Some(50));
    assert_eq!(character.uid, None);
}

#[test]
fn test_weapon_page() {
    let analyzer = analyzer(&["Weapon", "Ages of Harvest\nBroadblade\nLv. 80/90\nRank 5"]);
    let json = serde_json::to_value(scan(&analyzer, blank())).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["analysis"]["type"], "Weapon");
    assert_eq!(json["analysis"]["name"], "Ages of Harvest");
    assert_eq!(json["analysis"]["weaponType"], "Broadblade");
    assert_eq!(json["analysis"]["level"], 80);
    assert_eq!(json["analysis"]["rank"], 5);
}

#[test]
fn test_sequences_leading_run() {
    let mut image = blank();
    for (index, slot) in SEQUENCE_SLOTS.iter().enumerate() {
        let color = if index == 3 { LOCKED } else { GLOW };
        paint(&mut image, slot, color);
    }

    let response = scan(&analyzer(&["Resonance Chain"]), image);
    assert_eq!(
        response.analysis,
        Some(AnalysisResult::Sequences(SequenceAnalysis { sequence: 3 }))
    );
}

#[test]
fn test_forte_page() {
    let mut image = blank();
    // Normal attack: middle node lit.
    paint(&mut image, &FORTE_SLOTS[0].mid, RED);
    // Circuit: middle node unlocked (no dark blue), top still locked.
    paint(&mut image, &FORTE_SLOTS[2].mid, WHITE);
    // Intro: both nodes lit.
    paint(&mut image, &FORTE_SLOTS[4].mid, RED);
    paint(&mut image, &FORTE_SLOTS[4].top, RED);

    let analyzer = analyzer(&["Forte", "Lv. 7/10", "Lv. 10/10", "4/10", "garbage", "Lv. 2/10"]);
    let response = scan(&analyzer, image);

    assert_eq!(
        response.analysis,
        Some(AnalysisResult::Forte(ForteAnalysis {
            normal: [7, 1, 0],
            skill: [10, 0, 0],
            circuit: [4, 1, 0],
            liberation: [1, 0, 0],
            intro: [2, 1, 1],
        }))
    );
}

fn echo_screenshot() -> RgbImage {
    let mut image = blank();
    paint(&mut image, &echo::ELEMENT, GLACIO);
    image
}

const ECHO_SCRIPT: [&str; 2] = [
    "COST 10/12 All",
    "Lampylumen Myriad\nCOST 4\n+25\nGlacio DMG Bonus 30.0%\nCrit. Rate 8.1%\nCrlt. DMG 16.2%\nATK 40\n",
];

#[test]
fn test_echo_page() {
    let response = scan(&analyzer(&ECHO_SCRIPT), echo_screenshot());

    let Some(AnalysisResult::Echo(echo)) = response.analysis else {
        panic!("expected an echo record");
    };
    assert_eq!(echo.element.as_deref(), Some("Glacio"));
    assert_eq!(echo.name.as_deref(), Some("Lampylumen Myriad"));
    assert_eq!(echo.cost, Some(4));
    assert_eq!(echo.level, Some(25));

    let main = echo.main_stat.unwrap();
    assert_eq!(main.name, "Glacio DMG Bonus");
    assert_eq!(main.value, 30.0);
    assert!(main.percent);

    let names: Vec<_> = echo.sub_stats.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Crit. Rate", "Crit. DMG", "ATK"]);
}

#[test]
fn test_same_image_gives_identical_json() {
    let analyzer = analyzer(&ECHO_SCRIPT);

    let first = serde_json::to_string(&scan(&analyzer, echo_screenshot())).unwrap();
    let second = serde_json::to_string(&scan(&analyzer, echo_screenshot())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unknown_page() {
    let response = scan(&analyzer(&["Inventory"]), blank());
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"success":true,"analysis":{"type":"unknown"}}"#
    );
}

#[test]
fn test_empty_image_fails_envelope() {
    let response = analyzer(&["Overview"]).scan(&DynamicImage::ImageRgb8(RgbImage::new(0, 0)));
    assert!(!response.success);
    assert!(response.analysis.is_none());
    assert!(response
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("Invalid image input")));
}

#[test]
fn test_tiny_image_fails_on_region() {
    let response = analyzer(&["Overview"]).scan(&DynamicImage::ImageRgb8(RgbImage::new(4, 4)));
    assert!(!response.success);
    assert!(response.error.as_deref().is_some_and(|e| e.contains("empty crop")));
}
