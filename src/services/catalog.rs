//! Read-only name tables for characters and weapons.
//!
//! Built once per process and shared by reference; a missing or malformed
//! file leaves its table empty so name matching simply finds nothing.

use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Result, ScanError};
use crate::services::ocr::parser::first_catalog_match;

pub const CHARACTERS_FILE: &str = "Characters.json";
pub const WEAPONS_FILE: &str = "Weapons.json";

/// Weapons of one category, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponCategory {
    pub name: String,
    pub weapons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceCatalog {
    characters: Vec<String>,
    weapons: Vec<WeaponCategory>,
}

impl ReferenceCatalog {
    /// Catalog with no entries; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_parts(characters: Vec<String>, weapons: Vec<(String, Vec<String>)>) -> Self {
        Self {
            characters,
            weapons: weapons
                .into_iter()
                .map(|(name, weapons)| WeaponCategory { name, weapons })
                .collect(),
        }
    }

    /// Load both tables from `data_dir`, degrading each to empty on failure.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Self {
        let data_dir = data_dir.as_ref();

        let characters = read_table(&data_dir.join(CHARACTERS_FILE), parse_characters)
            .unwrap_or_else(|e| {
                warn!("Reference data unavailable, character names disabled: {}", e);
                Vec::new()
            });
        let weapons = read_table(&data_dir.join(WEAPONS_FILE), parse_weapons).unwrap_or_else(|e| {
            warn!("Reference data unavailable, weapon names disabled: {}", e);
            Vec::new()
        });

        let catalog = Self { characters, weapons };
        info!(
            characters = catalog.characters.len(),
            weapons = catalog.weapon_count(),
            "reference catalog loaded"
        );
        catalog
    }

    pub fn characters(&self) -> &[String] {
        &self.characters
    }

    pub fn weapon_categories(&self) -> &[WeaponCategory] {
        &self.weapons
    }

    pub fn weapon_count(&self) -> usize {
        self.weapons.iter().map(|c| c.weapons.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.weapon_count() == 0
    }

    /// First character name contained in the text.
    pub fn match_character(&self, text: &str) -> Option<&str> {
        first_catalog_match(text, self.characters.iter().map(String::as_str))
    }

    /// First weapon name contained in the text, with its category.
    pub fn match_weapon(&self, text: &str) -> Option<(&str, &str)> {
        self.weapons.iter().find_map(|category| {
            first_catalog_match(text, category.weapons.iter().map(String::as_str))
                .map(|name| (name, category.name.as_str()))
        })
    }
}

fn read_table<T>(path: &Path, parse: fn(&str) -> Result<T>) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| ScanError::ReferenceData(format!("Failed to read {:?}: {}", path, e)))?;
    parse(&content)
}

/// A plain name or a localized `{ "en": ... }` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocalizedName {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl LocalizedName {
    /// English text, else the first translation by language code.
    fn into_display(self) -> Option<String> {
        match self {
            LocalizedName::Plain(name) => Some(name),
            LocalizedName::Localized(mut names) => {
                names.remove("en").or_else(|| names.into_values().next())
            }
        }
    }
}

/// One entry of a name list: a record with a `name`, a bare name, or
/// anything else, which is skipped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NameEntry {
    Record { name: LocalizedName },
    Name(LocalizedName),
    Other(IgnoredAny),
}

impl NameEntry {
    fn into_name(self) -> Option<String> {
        match self {
            NameEntry::Record { name } | NameEntry::Name(name) => name.into_display(),
            NameEntry::Other(_) => None,
        }
        .filter(|name| !name.is_empty())
    }
}

/// Category of a weapon record: `{ "name": ... }` or the name itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WeaponType {
    Named { name: LocalizedName },
    Name(LocalizedName),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WeaponRecord {
    Weapon {
        name: LocalizedName,
        #[serde(rename = "type", default)]
        kind: Option<WeaponType>,
    },
    Other(IgnoredAny),
}

/// `{category: [names]}` with categories kept in file order.
#[derive(Debug)]
struct CategoryMap(Vec<WeaponCategory>);

impl<'de> Deserialize<'de> for CategoryMap {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CategoryVisitor;

        impl<'de> Visitor<'de> for CategoryVisitor {
            type Value = CategoryMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from weapon category to weapon names")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<CategoryMap, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut categories = Vec::new();
                while let Some((name, entries)) = access.next_entry::<String, Vec<NameEntry>>()? {
                    categories.push(WeaponCategory {
                        name,
                        weapons: entries.into_iter().filter_map(NameEntry::into_name).collect(),
                    });
                }
                Ok(CategoryMap(categories))
            }
        }

        deserializer.deserialize_map(CategoryVisitor)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WeaponTable {
    ByCategory(CategoryMap),
    Records(Vec<WeaponRecord>),
}

/// Character list: records with a `name`, or bare strings.
pub fn parse_characters(json: &str) -> Result<Vec<String>> {
    let entries: Vec<NameEntry> = serde_json::from_str(json)
        .map_err(|e| ScanError::ReferenceData(format!("Invalid {}: {}", CHARACTERS_FILE, e)))?;

    Ok(entries.into_iter().filter_map(NameEntry::into_name).collect())
}

/// Weapon table: `{category: [names]}` or an array of `{name, type}` records.
pub fn parse_weapons(json: &str) -> Result<Vec<WeaponCategory>> {
    let table: WeaponTable = serde_json::from_str(json)
        .map_err(|e| ScanError::ReferenceData(format!("Invalid {}: {}", WEAPONS_FILE, e)))?;

    let records = match table {
        WeaponTable::ByCategory(CategoryMap(categories)) => return Ok(categories),
        WeaponTable::Records(records) => records,
    };

    let mut categories: Vec<WeaponCategory> = Vec::new();
    for record in records {
        let WeaponRecord::Weapon { name, kind } = record else {
            continue;
        };
        let Some(name) = name.into_display() else {
            continue;
        };
        let category = kind
            .and_then(|kind| match kind {
                WeaponType::Named { name } | WeaponType::Name(name) => name.into_display(),
            })
            .unwrap_or_default();

        match categories.iter_mut().find(|c| c.name == category) {
            Some(existing) => existing.weapons.push(name),
            None => categories.push(WeaponCategory {
                name: category,
                weapons: vec![name],
            }),
        }
    }
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_characters_plain_and_localized() {
        let json = r#"[
            {"name": "Jinhsi", "id": 1},
            {"name": {"en": "Changli", "ko": "장리"}},
            {"id": 3},
            "Calcharo"
        ]"#;
        assert_eq!(
            parse_characters(json).unwrap(),
            vec!["Jinhsi", "Changli", "Calcharo"]
        );
    }

    #[test]
    fn test_parse_weapons_map_keeps_file_order() {
        let json = r#"{
            "Sword": ["Emerald of Genesis", "Blazing Brilliance"],
            "Broadblade": ["Verdant Summit"],
            "Gauntlets": ["Abyss Surges"]
        }"#;
        let categories = parse_weapons(json).unwrap();
        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Sword", "Broadblade", "Gauntlets"]);
        assert_eq!(categories[0].weapons.len(), 2);
    }

    #[test]
    fn test_parse_weapons_record_array_groups_by_type() {
        let json = r#"[
            {"name": "Verdant Summit", "type": {"name": "Broadblade"}},
            {"name": {"en": "Emerald of Genesis"}, "type": "Sword"},
            {"name": "Lustrous Razor", "type": {"name": {"en": "Broadblade"}}}
        ]"#;
        let categories = parse_weapons(json).unwrap();
        assert_eq!(
            categories,
            vec![
                WeaponCategory {
                    name: "Broadblade".to_string(),
                    weapons: vec!["Verdant Summit".to_string(), "Lustrous Razor".to_string()],
                },
                WeaponCategory {
                    name: "Sword".to_string(),
                    weapons: vec!["Emerald of Genesis".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_parse_skips_unreadable_entries() {
        let characters = r#"[
            {"name": 7},
            {"en": "Yinlin"},
            {"name": ""},
            {"name": {"ko": "금희"}}
        ]"#;
        assert_eq!(parse_characters(characters).unwrap(), vec!["Yinlin", "금희"]);

        let weapons = r#"{"Pistols": ["Static Mist", 3, {"name": "Cadenza"}]}"#;
        let categories = parse_weapons(weapons).unwrap();
        assert_eq!(categories[0].weapons, vec!["Static Mist", "Cadenza"]);
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        assert!(matches!(parse_characters("{}"), Err(ScanError::ReferenceData(_))));
        assert!(matches!(parse_weapons("42"), Err(ScanError::ReferenceData(_))));
        assert!(matches!(parse_weapons("not json"), Err(ScanError::ReferenceData(_))));
    }

    #[test]
    fn test_load_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let catalog = ReferenceCatalog::load(dir.path().join("missing"));
        assert!(catalog.is_empty());
        assert_eq!(catalog.match_character("Jinhsi"), None);
        assert_eq!(catalog.match_weapon("Verdant Summit"), None);
    }

    #[test]
    fn test_load_malformed_file_degrades_only_that_table() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CHARACTERS_FILE), "[{\"name\": \"Jinhsi\"}]").unwrap();
        fs::write(dir.path().join(WEAPONS_FILE), "{ broken").unwrap();

        let catalog = ReferenceCatalog::load(dir.path());
        assert_eq!(catalog.characters(), &["Jinhsi".to_string()]);
        assert_eq!(catalog.weapon_count(), 0);
    }

    #[test]
    fn test_match_weapon_first_category_first_name() {
        let catalog = ReferenceCatalog::from_parts(
            vec![],
            vec![
                ("Rectifier".to_string(), vec!["Aero".to_string()]),
                ("Sword".to_string(), vec!["Aerolith".to_string()]),
            ],
        );
        assert_eq!(catalog.match_weapon("Aerolith"), Some(("Aero", "Rectifier")));
    }

    #[test]
    fn test_match_character_first_wins() {
        let catalog = ReferenceCatalog::from_parts(
            vec!["Aero".to_string(), "Aerolith".to_string()],
            vec![],
        );
        assert_eq!(catalog.match_character("aerolith lv 90"), Some("Aero"));
    }
}
