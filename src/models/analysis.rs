use serde::{Deserialize, Serialize};

use super::screen::ScreenType;

/// Fields read from the character overview page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CharacterAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// Fields read from the weapon page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeaponAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

/// Number of unlocked resonance-chain slots (0-6).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SequenceAnalysis {
    pub sequence: u8,
}

/// Per-branch `[level, middleNodeActive, topNodeActive]`, nodes as 0/1.
pub type ForteBranchArray = [u8; 3];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForteAnalysis {
    pub normal: ForteBranchArray,
    pub skill: ForteBranchArray,
    pub circuit: ForteBranchArray,
    pub liberation: ForteBranchArray,
    pub intro: ForteBranchArray,
}

impl Default for ForteAnalysis {
    fn default() -> Self {
        Self {
            normal: [1, 0, 0],
            skill: [1, 0, 0],
            circuit: [1, 0, 0],
            liberation: [1, 0, 0],
            intro: [1, 0, 0],
        }
    }
}

/// One recognized stat line of an echo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EchoStat {
    pub name: String,
    pub value: f64,
    pub percent: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EchoAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_stat: Option<EchoStat>,
    pub sub_stats: Vec<EchoStat>,
}

/// Extraction output, tagged by the page it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum AnalysisResult {
    Character(CharacterAnalysis),
    Weapon(WeaponAnalysis),
    Sequences(SequenceAnalysis),
    Forte(ForteAnalysis),
    Echo(EchoAnalysis),
    #[serde(rename = "unknown")]
    Unknown,
}

impl AnalysisResult {
    pub fn screen_type(&self) -> ScreenType {
        match self {
            Self::Character(_) => ScreenType::Character,
            Self::Weapon(_) => ScreenType::Weapon,
            Self::Sequences(_) => ScreenType::Sequences,
            Self::Forte(_) => ScreenType::Forte,
            Self::Echo(_) => ScreenType::Echo,
            Self::Unknown => ScreenType::Unknown,
        }
    }
}

/// Uniform envelope returned for every scan.
///
/// Exactly one of `analysis` / `error` is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResponse {
    pub fn ok(analysis: AnalysisResult) -> Self {
        Self {
            success: true,
            analysis: Some(analysis),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            analysis: None,
            error: Some(error.into()),
        }
    }
}
