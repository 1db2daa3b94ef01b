use serde::{Deserialize, Serialize};
use std::fmt;

/// The detail pages a screenshot can be classified as.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScreenType {
    Character,
    Weapon,
    Echo,
    Sequences,
    Forte,
    #[serde(rename = "unknown")]
    Unknown,
}

impl ScreenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Character => "Character",
            Self::Weapon => "Weapon",
            Self::Echo => "Echo",
            Self::Sequences => "Sequences",
            Self::Forte => "Forte",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ScreenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
