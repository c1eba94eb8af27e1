//! XP, levels, skill upgrades and level-up rewards.
//!
//! Level is `1 + xp / 100` and is never stored. Crossing into a higher level
//! sets the pending level-up flag and grants skill points; the flag gates a
//! single reward choice.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, EffectiveSkill};
use crate::constants::SKILL_POINTS_PER_LEVEL_UP;
use crate::error::{GameError, GameResult};
use crate::player::Player;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionRules {
    /// Grant a point for every level crossed instead of one per level-up event
    pub point_per_level_crossed: bool,
}

/// Reward picked after a level-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    FullHeal,
    PartialHeal,
    SkillUpgrade,
}

impl RewardType {
    pub const ALL: [RewardType; 3] = [
        RewardType::FullHeal,
        RewardType::PartialHeal,
        RewardType::SkillUpgrade,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullHeal => "full_heal",
            Self::PartialHeal => "partial_heal",
            Self::SkillUpgrade => "skill_upgrade",
        }
    }

    /// Fraction of max HP restored
    pub fn heal_fraction(&self) -> f64 {
        match self {
            Self::FullHeal => 1.0,
            Self::PartialHeal => 0.5,
            Self::SkillUpgrade => 0.0,
        }
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewardType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| GameError::InvalidRewardType(s.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpResult {
    pub xp_gained: u64,
    pub total_xp: u64,
    pub level: u32,
    pub leveled_up: bool,
    pub pending_level_up: bool,
    pub skill_points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeResult {
    pub skill_name: String,
    pub new_level: u32,
    pub max_level: u32,
    pub skill_points_remaining: u32,
    pub skill: EffectiveSkill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardResult {
    pub reward: RewardType,
    pub hp_restored: u32,
    pub current_hp: u32,
    pub max_hp: u32,
    pub skill_points: u32,
    pub message: String,
}

/// Applies progression rules to player records it is handed
#[derive(Debug, Clone)]
pub struct ProgressionEngine {
    catalog: Arc<Catalog>,
    rules: ProgressionRules,
}

impl ProgressionEngine {
    pub fn new(catalog: Arc<Catalog>, rules: ProgressionRules) -> Self {
        Self { catalog, rules }
    }

    pub fn rules(&self) -> &ProgressionRules {
        &self.rules
    }

    /// Add XP; awards past the XP cap are truncated and `xp_gained` reports
    /// what was actually added
    pub fn award_xp(&self, player: &mut Player, amount: u64) -> XpResult {
        let xp_before = player.xp();
        let (old_level, new_level) = player.gain_xp(amount);
        let leveled_up = new_level > old_level;

        if leveled_up {
            let points = if self.rules.point_per_level_crossed {
                (new_level - old_level) * SKILL_POINTS_PER_LEVEL_UP
            } else {
                SKILL_POINTS_PER_LEVEL_UP
            };
            player.pending_level_up = true;
            player.skill_points += points;
            info!(
                player_id = %player.id,
                old_level,
                new_level,
                points,
                "Level up"
            );
        } else {
            debug!(player_id = %player.id, amount, total = player.xp(), "XP awarded");
        }

        XpResult {
            xp_gained: player.xp() - xp_before,
            total_xp: player.xp(),
            level: new_level,
            leveled_up,
            pending_level_up: player.pending_level_up,
            skill_points: player.skill_points,
        }
    }

    /// Skill with the player's upgrades applied
    pub fn skill_with_upgrades(&self, player: &Player, skill_name: &str) -> GameResult<EffectiveSkill> {
        let skill = self.catalog.skill(&player.character_class, skill_name)?;
        Ok(EffectiveSkill::resolve(
            skill,
            player.skill_level(skill_name),
            &self.catalog.upgrades,
        ))
    }

    pub fn upgrade_skill(&self, player: &mut Player, skill_name: &str) -> GameResult<UpgradeResult> {
        if player.skill_points == 0 {
            warn!(player_id = %player.id, skill = skill_name, "Upgrade without skill points");
            return Err(GameError::NoSkillPoints);
        }
        let skill = self.catalog.skill(&player.character_class, skill_name)?;
        let max_level = skill
            .max_level(&self.catalog.upgrades)
            .ok_or_else(|| GameError::NotUpgradeable {
                skill: skill_name.into(),
            })?;
        let current = player.skill_level(skill_name);
        if current >= max_level {
            return Err(GameError::MaxLevelReached {
                skill: skill_name.into(),
                max_level,
            });
        }

        let new_level = current + 1;
        player.skill_levels.insert(skill_name.to_string(), new_level);
        player.skill_points -= 1;
        info!(
            player_id = %player.id,
            skill = skill_name,
            new_level,
            max_level,
            "Skill upgraded"
        );

        Ok(UpgradeResult {
            skill_name: skill_name.into(),
            new_level,
            max_level,
            skill_points_remaining: player.skill_points,
            skill: EffectiveSkill::resolve(skill, new_level, &self.catalog.upgrades),
        })
    }

    pub fn apply_level_up_reward(&self, player: &mut Player, reward: &str) -> GameResult<RewardResult> {
        if !player.pending_level_up {
            return Err(GameError::NoPendingLevelUp);
        }
        let reward: RewardType = reward.parse()?;

        let heal = (player.max_hp as f64 * reward.heal_fraction()) as u32;
        let hp_restored = player.heal(heal);
        player.pending_level_up = false;

        let message = match reward {
            RewardType::FullHeal => "Fully healed!".to_string(),
            RewardType::PartialHeal => format!("Healed {hp_restored} HP!"),
            RewardType::SkillUpgrade => "Skill point ready to spend!".to_string(),
        };
        info!(player_id = %player.id, reward = %reward, hp_restored, "Level-up reward applied");

        Ok(RewardResult {
            reward,
            hp_restored,
            current_hp: player.current_hp,
            max_hp: player.max_hp,
            skill_points: player.skill_points,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Skill, SkillEffect};
    use crate::clock::{Clock, ManualClock};

    fn setup(class: &str) -> (ProgressionEngine, Player) {
        let mut catalog = Catalog::builtin();
        if let Some(rogue) = catalog.characters.get_mut("WanPakMan") {
            rogue
                .skills
                .push(Skill::new("Smoke Bomb", 30.0, "Flee combat", SkillEffect::Escape));
        }
        let catalog = Arc::new(catalog);
        let clock = ManualClock::at_epoch();
        let player = Player::new(
            "p1",
            class,
            catalog.character(class).unwrap(),
            catalog.enemy_types(),
            clock.now(),
        );
        (ProgressionEngine::new(catalog, ProgressionRules::default()), player)
    }

    #[test]
    fn test_one_point_per_level_up_event() {
        let (engine, mut player) = setup("Volta");
        let result = engine.award_xp(&mut player, 250);
        assert_eq!(result.level, 3);
        assert!(result.leveled_up);
        assert!(result.pending_level_up);
        assert_eq!(result.skill_points, 1);
    }

    #[test]
    fn test_point_per_level_crossed_rule() {
        let catalog = Arc::new(Catalog::builtin());
        let clock = ManualClock::at_epoch();
        let engine = ProgressionEngine::new(
            Arc::clone(&catalog),
            ProgressionRules {
                point_per_level_crossed: true,
            },
        );
        let mut player = Player::new(
            "p1",
            "Volta",
            catalog.character("Volta").unwrap(),
            catalog.enemy_types(),
            clock.now(),
        );
        assert_eq!(engine.award_xp(&mut player, 250).skill_points, 2);
    }

    #[test]
    fn test_xp_without_level_up() {
        let (engine, mut player) = setup("Volta");
        let result = engine.award_xp(&mut player, 40);
        assert!(!result.leveled_up);
        assert!(!player.pending_level_up);
        assert_eq!(player.skill_points, 0);
        assert_eq!(result.total_xp, 40);
    }

    #[test]
    fn test_upgrade_check_order() {
        let (engine, mut player) = setup("WanPakMan");
        assert_eq!(
            engine.upgrade_skill(&mut player, "Nope").unwrap_err(),
            GameError::NoSkillPoints
        );

        player.skill_points = 1;
        assert!(matches!(
            engine.upgrade_skill(&mut player, "Nope"),
            Err(GameError::SkillNotFound { .. })
        ));
        assert_eq!(
            engine.upgrade_skill(&mut player, "Smoke Bomb").unwrap_err(),
            GameError::NotUpgradeable {
                skill: "Smoke Bomb".into()
            }
        );
        assert_eq!(player.skill_points, 1);
    }

    #[test]
    fn test_upgrade_until_max() {
        let (engine, mut player) = setup("Victor Magtanggol");
        player.skill_points = 10;

        for level in 1..=3 {
            let result = engine.upgrade_skill(&mut player, "Pabebe Wave").unwrap();
            assert_eq!(result.new_level, level);
            assert_eq!(result.max_level, 3);
        }
        let err = engine.upgrade_skill(&mut player, "Pabebe Wave").unwrap_err();
        assert_eq!(
            err,
            GameError::MaxLevelReached {
                skill: "Pabebe Wave".into(),
                max_level: 3
            }
        );
        assert_eq!(player.skill_level("Pabebe Wave"), 3);
        assert_eq!(player.skill_points, 7);
    }

    #[test]
    fn test_effective_skill_reflects_level() {
        let (engine, mut player) = setup("Pedro Penduko");
        player.skill_points = 2;
        engine.upgrade_skill(&mut player, "Fireball").unwrap();
        engine.upgrade_skill(&mut player, "Fireball").unwrap();

        let skill = engine.skill_with_upgrades(&player, "Fireball").unwrap();
        assert_eq!(skill.current_level, 2);
        match skill.effect {
            SkillEffect::DamageMultiplier { multiplier } => {
                assert!((multiplier - 3.1).abs() < 1e-9)
            }
            other => panic!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn test_rewards() {
        let (engine, mut player) = setup("Volta");
        assert_eq!(
            engine.apply_level_up_reward(&mut player, "full_heal").unwrap_err(),
            GameError::NoPendingLevelUp
        );

        engine.award_xp(&mut player, 100);
        player.take_damage(100);
        assert_eq!(
            engine.apply_level_up_reward(&mut player, "mega_heal").unwrap_err(),
            GameError::InvalidRewardType("mega_heal".into())
        );
        assert!(player.pending_level_up, "failed reward keeps the flag");

        let result = engine.apply_level_up_reward(&mut player, "partial_heal").unwrap();
        assert_eq!(result.hp_restored, 60);
        assert_eq!(player.current_hp, 80);
        assert!(!player.pending_level_up);
    }

    #[test]
    fn test_reward_type_parse() {
        assert_eq!("skill_upgrade".parse::<RewardType>(), Ok(RewardType::SkillUpgrade));
        assert!("".parse::<RewardType>().is_err());
    }
}
