//! Fixed UI element positions for the supported detail pages.
//!
//! All values are fractions of the screenshot size, calibrated on 16:9
//! captures of the in-game resonator screens.

use crate::models::region::Region;

/// Page header used to classify the screenshot.
pub const INFO: Region = Region::new("info", 0.0, 0.0, 0.13, 0.11);

// ============================================================
// Character overview
// ============================================================

pub const CHARACTER_PAGE: Region = Region::new("characterPage", 0.09, 0.09, 0.22, 0.18);
pub const UID: Region = Region::new("uid", 0.975, 0.915, 0.07, 0.025);

/// Clothing samples used to tell the two avatar variants apart.
pub const AVATAR_SAMPLES: [Region; 3] = [
    Region::new("shoulders_left", 0.4, 0.45, 0.02, 0.04),
    Region::new("shoulders_right", 0.4, 0.555, 0.02, 0.04),
    Region::new("right_thigh", 0.87, 0.54, 0.04, 0.095),
];

// ============================================================
// Weapon
// ============================================================

pub const WEAPON_PAGE: Region = Region::new("weaponPage", 0.11, 0.09, 0.215, 0.25);

// ============================================================
// Resonance chain
// ============================================================

/// Sequence nodes in unlock order.
pub const SEQUENCE_SLOTS: [Region; 6] = [
    Region::new("s1", 0.1047, 0.647, 0.0234, 0.0454),
    Region::new("s2", 0.259, 0.733, 0.028, 0.047),
    Region::new("s3", 0.473, 0.765, 0.0234, 0.0454),
    Region::new("s4", 0.682, 0.734, 0.025, 0.0454),
    Region::new("s5", 0.8364, 0.645, 0.029, 0.046),
    Region::new("s6", 0.895, 0.527, 0.025, 0.047),
];

// ============================================================
// Forte
// ============================================================

/// Skill-progression track on the forte page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForteBranch {
    NormalAttack,
    Skill,
    Circuit,
    Liberation,
    Intro,
}

/// How a branch's mid/top node shows its unlocked state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRule {
    /// Unlocked nodes carry a red accent ring.
    RedAccent,
    /// Locked nodes are tinted dark blue; unlocked ones lose the tint.
    DarkBlueAbsent,
}

impl ForteBranch {
    pub fn node_rule(&self) -> NodeRule {
        match self {
            Self::Circuit => NodeRule::DarkBlueAbsent,
            _ => NodeRule::RedAccent,
        }
    }
}

/// The three slots of one forte branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForteSlots {
    pub branch: ForteBranch,
    /// Level counter under the branch.
    pub base: Region,
    pub mid: Region,
    pub top: Region,
}

pub const FORTE_SLOTS: [ForteSlots; 5] = [
    ForteSlots {
        branch: ForteBranch::NormalAttack,
        base: Region::new("normal-base", 0.88, 0.2, 0.074, 0.1),
        mid: Region::new("normal-mid", 0.568, 0.22, 0.038, 0.067),
        top: Region::new("normal-top", 0.36, 0.22, 0.038, 0.067),
    },
    ForteSlots {
        branch: ForteBranch::Skill,
        base: Region::new("skill-base", 0.75, 0.323, 0.074, 0.1),
        mid: Region::new("skill-mid", 0.438, 0.343, 0.038, 0.067),
        top: Region::new("skill-top", 0.23, 0.343, 0.038, 0.067),
    },
    ForteSlots {
        branch: ForteBranch::Circuit,
        base: Region::new("circuit-base", 0.683, 0.463, 0.074, 0.1),
        mid: Region::new("circuit-mid", 0.37, 0.477, 0.05, 0.09),
        top: Region::new("circuit-top", 0.16, 0.477, 0.05, 0.09),
    },
    ForteSlots {
        branch: ForteBranch::Liberation,
        base: Region::new("liberation-base", 0.754, 0.6067, 0.074, 0.1),
        mid: Region::new("liberation-mid", 0.438, 0.6267, 0.038, 0.067),
        top: Region::new("liberation-top", 0.23, 0.6267, 0.038, 0.067),
    },
    ForteSlots {
        branch: ForteBranch::Intro,
        base: Region::new("intro-base", 0.88, 0.727, 0.074, 0.07),
        mid: Region::new("intro-mid", 0.568, 0.747, 0.038, 0.067),
        top: Region::new("intro-top", 0.36, 0.747, 0.038, 0.067),
    },
];

// ============================================================
// Echo
// ============================================================

/// Main detail panel with name, level and stat lines.
pub const ECHO_PAGE: Region = Region::new("echoPage", 0.11, 0.71, 0.27, 0.35);

/// Echo sub-fields.
pub mod echo {
    use super::Region;

    /// Round set icon next to the echo name.
    pub const ELEMENT: Region = Region::new("element", 0.138, 0.933, 0.021, 0.036);
}

/// Every region, for table-wide checks.
pub fn all_regions() -> Vec<Region> {
    let mut regions = vec![INFO, CHARACTER_PAGE, UID, WEAPON_PAGE, ECHO_PAGE, echo::ELEMENT];
    regions.extend(AVATAR_SAMPLES);
    regions.extend(SEQUENCE_SLOTS);
    for slots in FORTE_SLOTS {
        regions.extend([slots.base, slots.mid, slots.top]);
    }
    regions
}
