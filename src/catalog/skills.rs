//! Skill definitions and upgrade rules.
//!
//! A skill carries exactly one effect, chosen when the catalog is built. The
//! numeric parameters of that effect are the stats that skill upgrades act
//! on; an upgraded skill is the base effect with `level * increment` added to
//! every present stat that has an upgrade rule.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{DEFAULT_BOOST_DURATION, DEFAULT_REDUCTION_DURATION};

/// Stats that skill upgrades can raise, in priority order.
///
/// The first stat in this order that a skill carries is its primary stat;
/// the primary stat's rule caps the skill's level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeStat {
    DamageMultiplier,
    Damage,
    HealAmount,
    DamageReduction,
    DamageBoost,
    PoisonDamage,
    Duration,
}

impl UpgradeStat {
    pub const ALL: [UpgradeStat; 7] = [
        UpgradeStat::DamageMultiplier,
        UpgradeStat::Damage,
        UpgradeStat::HealAmount,
        UpgradeStat::DamageReduction,
        UpgradeStat::DamageBoost,
        UpgradeStat::PoisonDamage,
        UpgradeStat::Duration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DamageMultiplier => "damage_multiplier",
            Self::Damage => "damage",
            Self::HealAmount => "heal_amount",
            Self::DamageReduction => "damage_reduction",
            Self::DamageBoost => "damage_boost",
            Self::PoisonDamage => "poison_damage",
            Self::Duration => "duration",
        }
    }
}

/// How much one skill level adds to a stat, and how many levels it allows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeRule {
    pub increment_per_level: f64,
    pub max_level: u32,
}

pub type UpgradeRules = BTreeMap<UpgradeStat, UpgradeRule>;

/// Damage-over-time rider on a flat damage skill
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Poison {
    /// Damage per turn
    pub damage: f64,
    /// Number of turns
    pub duration: f64,
}

impl Poison {
    pub fn total(&self) -> f64 {
        self.damage * self.duration
    }
}

/// The single effect a skill produces when used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkillEffect {
    /// Scales the caster's attack
    DamageMultiplier { multiplier: f64 },
    /// Fixed damage, optionally with a poison rider
    Damage {
        amount: f64,
        #[serde(default)]
        poison: Option<Poison>,
    },
    Heal { amount: f64 },
    /// Fraction of incoming damage removed while active
    DamageReduction {
        reduction: f64,
        #[serde(default)]
        duration: Option<f64>,
    },
    /// Multiplier on outgoing damage while active
    DamageBoost {
        boost: f64,
        #[serde(default)]
        duration: Option<f64>,
    },
    Escape,
}

impl SkillEffect {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DamageMultiplier { .. } => "damage_multiplier",
            Self::Damage { .. } => "damage",
            Self::Heal { .. } => "heal",
            Self::DamageReduction { .. } => "damage_reduction",
            Self::DamageBoost { .. } => "damage_boost",
            Self::Escape => "escape",
        }
    }

    /// Stats present on this effect, in priority order
    pub fn stats(&self) -> Vec<UpgradeStat> {
        match self {
            Self::DamageMultiplier { .. } => vec![UpgradeStat::DamageMultiplier],
            Self::Damage { poison: None, .. } => vec![UpgradeStat::Damage],
            Self::Damage { poison: Some(_), .. } => vec![
                UpgradeStat::Damage,
                UpgradeStat::PoisonDamage,
                UpgradeStat::Duration,
            ],
            Self::Heal { .. } => vec![UpgradeStat::HealAmount],
            Self::DamageReduction { duration, .. } => {
                let mut stats = vec![UpgradeStat::DamageReduction];
                if duration.is_some() {
                    stats.push(UpgradeStat::Duration);
                }
                stats
            }
            Self::DamageBoost { duration, .. } => {
                let mut stats = vec![UpgradeStat::DamageBoost];
                if duration.is_some() {
                    stats.push(UpgradeStat::Duration);
                }
                stats
            }
            Self::Escape => vec![],
        }
    }

    /// First present stat that has an upgrade rule
    pub fn primary_stat(&self, rules: &UpgradeRules) -> Option<UpgradeStat> {
        self.stats().into_iter().find(|stat| rules.contains_key(stat))
    }

    /// Effect with `level` upgrades applied to every ruled stat
    pub fn upgraded(&self, level: u32, rules: &UpgradeRules) -> SkillEffect {
        let bump = |stat: UpgradeStat, base: f64| -> f64 {
            rules
                .get(&stat)
                .map_or(base, |rule| base + rule.increment_per_level * level as f64)
        };

        match self {
            Self::DamageMultiplier { multiplier } => Self::DamageMultiplier {
                multiplier: bump(UpgradeStat::DamageMultiplier, *multiplier),
            },
            Self::Damage { amount, poison } => Self::Damage {
                amount: bump(UpgradeStat::Damage, *amount),
                poison: poison.map(|p| Poison {
                    damage: bump(UpgradeStat::PoisonDamage, p.damage),
                    duration: bump(UpgradeStat::Duration, p.duration),
                }),
            },
            Self::Heal { amount } => Self::Heal {
                amount: bump(UpgradeStat::HealAmount, *amount),
            },
            Self::DamageReduction {
                reduction,
                duration,
            } => Self::DamageReduction {
                reduction: bump(UpgradeStat::DamageReduction, *reduction),
                duration: duration.map(|d| bump(UpgradeStat::Duration, d)),
            },
            Self::DamageBoost { boost, duration } => Self::DamageBoost {
                boost: bump(UpgradeStat::DamageBoost, *boost),
                duration: duration.map(|d| bump(UpgradeStat::Duration, d)),
            },
            Self::Escape => Self::Escape,
        }
    }

    /// Buff duration in seconds, falling back to the per-buff default
    pub fn buff_duration(&self) -> Option<f64> {
        match self {
            Self::DamageReduction { duration, .. } => {
                Some(duration.unwrap_or(DEFAULT_REDUCTION_DURATION))
            }
            Self::DamageBoost { duration, .. } => Some(duration.unwrap_or(DEFAULT_BOOST_DURATION)),
            _ => None,
        }
    }
}

/// A skill as defined in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub cooldown_secs: f64,
    pub description: String,
    pub effect: SkillEffect,
}

impl Skill {
    pub fn new(name: &str, cooldown_secs: f64, description: &str, effect: SkillEffect) -> Self {
        Self {
            name: name.into(),
            cooldown_secs,
            description: description.into(),
            effect,
        }
    }

    /// Highest level this skill can reach, or `None` if it cannot be upgraded
    pub fn max_level(&self, rules: &UpgradeRules) -> Option<u32> {
        self.effect
            .primary_stat(rules)
            .and_then(|stat| rules.get(&stat))
            .map(|rule| rule.max_level)
    }
}

/// A skill resolved against a player's upgrade level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveSkill {
    pub name: String,
    pub description: String,
    pub cooldown_secs: f64,
    pub effect: SkillEffect,
    pub current_level: u32,
    pub max_level: Option<u32>,
}

impl EffectiveSkill {
    pub fn resolve(skill: &Skill, level: u32, rules: &UpgradeRules) -> Self {
        Self {
            name: skill.name.clone(),
            description: skill.description.clone(),
            cooldown_secs: skill.cooldown_secs,
            effect: skill.effect.upgraded(level, rules),
            current_level: level,
            max_level: skill.max_level(rules),
        }
    }
}
