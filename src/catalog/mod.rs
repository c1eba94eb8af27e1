//! Static game content.
//!
//! The catalog is immutable once built: character classes with their skills,
//! enemy types and the skill upgrade table. The built-in content can be
//! replaced by a RON or JSON file with the same shape.

pub(crate) mod builtin;
pub mod skills;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, GameError, GameResult};

pub use skills::{
    EffectiveSkill, Poison, Skill, SkillEffect, UpgradeRule, UpgradeRules, UpgradeStat,
};

/// A selectable character and its skill kit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterClass {
    pub max_hp: u32,
    pub attack: u32,
    pub archetype: String,
    pub skills: Vec<Skill>,
}

impl CharacterClass {
    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.name == name)
    }
}

/// An enemy template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyType {
    pub name: String,
    pub max_hp: u32,
    pub attack: u32,
    pub xp_reward: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub characters: BTreeMap<String, CharacterClass>,
    pub enemies: BTreeMap<String, EnemyType>,
    pub upgrades: UpgradeRules,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            characters: builtin::characters(),
            enemies: builtin::enemies(),
            upgrades: builtin::upgrade_rules(),
        }
    }

    pub fn character(&self, class: &str) -> GameResult<&CharacterClass> {
        self.characters
            .get(class)
            .ok_or_else(|| GameError::InvalidCharacterClass(class.into()))
    }

    pub fn enemy(&self, enemy_type: &str) -> GameResult<&EnemyType> {
        self.enemies
            .get(enemy_type)
            .ok_or_else(|| GameError::InvalidEnemyType(enemy_type.into()))
    }

    /// Skill lookup scoped to a character class
    pub fn skill(&self, class: &str, skill_name: &str) -> GameResult<&Skill> {
        self.characters
            .get(class)
            .and_then(|c| c.skill(skill_name))
            .ok_or_else(|| GameError::SkillNotFound {
                skill: skill_name.into(),
            })
    }

    pub fn enemy_types(&self) -> impl Iterator<Item = &str> {
        self.enemies.keys().map(String::as_str)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let catalog: Catalog = ron::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let catalog: Catalog = serde_json::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file; the format follows the extension (`.ron` or `.json`)
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Self::from_ron_str(&text),
            Some("json") => Self::from_json_str(&text),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.characters.is_empty() {
            return Err(ConfigError::Invalid("catalog has no characters".into()));
        }
        if self.enemies.is_empty() {
            return Err(ConfigError::Invalid("catalog has no enemies".into()));
        }
        for (name, class) in &self.characters {
            if class.max_hp == 0 {
                return Err(ConfigError::Invalid(format!("character {name} has zero hp")));
            }
            if class.skills.is_empty() {
                return Err(ConfigError::Invalid(format!("character {name} has no skills")));
            }
        }
        for (id, enemy) in &self.enemies {
            if enemy.max_hp == 0 {
                return Err(ConfigError::Invalid(format!("enemy {id} has zero hp")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_content() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.characters.len(), 5);
        assert_eq!(catalog.enemies.len(), 3);
        for class in catalog.characters.values() {
            assert_eq!(class.skills.len(), 3);
        }
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_lookup_errors() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.character("Bard").unwrap_err(),
            GameError::InvalidCharacterClass("Bard".into())
        );
        assert_eq!(
            catalog.enemy("class9").unwrap_err(),
            GameError::InvalidEnemyType("class9".into())
        );
        // Fireball belongs to Pedro Penduko, not Volta
        assert!(matches!(
            catalog.skill("Volta", "Fireball"),
            Err(GameError::SkillNotFound { .. })
        ));
        assert!(catalog.skill("Pedro Penduko", "Fireball").is_ok());
    }

    #[test]
    fn test_goblin_stats() {
        let catalog = Catalog::builtin();
        let goblin = catalog.enemy("class1").unwrap();
        assert_eq!(goblin.name, "Goblin");
        assert_eq!(goblin.max_hp, 30);
        assert_eq!(goblin.attack, 5);
        assert_eq!(goblin.xp_reward, 10);
    }

    #[test]
    fn test_from_ron_str() {
        let text = r#"(
            characters: {
                "Scout": (
                    max_hp: 60,
                    attack: 9,
                    archetype: "ranger",
                    skills: [
                        (name: "Volley", cooldown_secs: 6.0, description: "Arrows", effect: DamageMultiplier(multiplier: 1.5)),
                        (name: "Vanish", cooldown_secs: 30.0, description: "Leave combat", effect: Escape),
                    ],
                ),
            },
            enemies: {
                "slime": (name: "Slime", max_hp: 12, attack: 2, xp_reward: 4),
            },
            upgrades: {
                damage_multiplier: (increment_per_level: 0.25, max_level: 2),
            },
        )"#;
        let catalog = Catalog::from_ron_str(text).unwrap();
        let scout = catalog.character("Scout").unwrap();
        assert_eq!(scout.skills[1].effect, SkillEffect::Escape);
        assert_eq!(catalog.enemy("slime").unwrap().max_hp, 12);
        assert_eq!(scout.skills[0].max_level(&catalog.upgrades), Some(2));
    }

    #[test]
    fn test_invalid_catalog_rejected() {
        let mut catalog = Catalog::builtin();
        catalog.enemies.clear();
        let json = serde_json::to_string(&catalog).unwrap();
        assert!(matches!(
            Catalog::from_json_str(&json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("catalog.json");
        std::fs::write(&json_path, serde_json::to_string(&Catalog::builtin()).unwrap()).unwrap();
        assert_eq!(Catalog::load(&json_path).unwrap(), Catalog::builtin());

        let yaml_path = dir.path().join("catalog.yaml");
        std::fs::write(&yaml_path, "characters: {}").unwrap();
        assert!(matches!(
            Catalog::load(&yaml_path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
