//! Turn-based combat: basic attacks, skills, buffs and the turn loop.
//!
//! The engine never owns player or enemy state. It is handed a locked
//! player record and mutates it in place, returning an outcome value that
//! describes what happened.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod dice;
pub mod enemy;
pub mod session;

pub use dice::{Dice, FixedDice, SeededDice};
pub use enemy::Enemy;
pub use session::{CombatSession, CombatStartPolicy, CombatStatus};

use crate::catalog::{Catalog, SkillEffect};
use crate::clock::{secs_to_duration, secs_until, Timestamp};
use crate::constants::*;
use crate::error::{ConfigError, GameError, GameResult};
use crate::player::{ActiveBuff, BuffKind, Player};
use crate::progression::{ProgressionEngine, XpResult};

/// Tunable combat numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    pub dodge_chance: f64,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub damage_jitter: i32,
    /// Refuse skills whose cooldown has not elapsed. Expiry is recorded either way.
    pub enforce_cooldowns: bool,
    /// Subtract reported poison from the enemy at cast time
    pub apply_poison: bool,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            dodge_chance: DODGE_CHANCE,
            crit_chance: CRIT_CHANCE,
            crit_multiplier: CRIT_MULTIPLIER,
            damage_jitter: DAMAGE_JITTER,
            enforce_cooldowns: false,
            apply_poison: false,
        }
    }
}

impl CombatRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, p) in [("dodge_chance", self.dodge_chance), ("crit_chance", self.crit_chance)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!("{name} must be in [0, 1], got {p}")));
            }
        }
        if self.crit_multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "crit_multiplier must be >= 1, got {}",
                self.crit_multiplier
            )));
        }
        if self.damage_jitter < 0 {
            return Err(ConfigError::Invalid("damage_jitter must not be negative".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub hit: bool,
    pub damage: u32,
    pub is_critical: bool,
}

impl AttackOutcome {
    pub fn dodged() -> Self {
        Self {
            hit: false,
            damage: 0,
            is_critical: false,
        }
    }
}

/// Result of using a skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillOutcome {
    pub skill_name: String,
    pub description: String,
    pub skill_level: u32,
    pub effect: String,
    pub damage: Option<u32>,
    pub is_critical: bool,
    pub enemy_hp: Option<u32>,
    pub enemy_defeated: bool,
    pub enemy_health_percent: Option<f64>,
    pub healed: Option<u32>,
    pub current_hp: u32,
    pub buff_applied: Option<BuffKind>,
    pub buff_value: Option<f64>,
    pub buff_duration: Option<f64>,
    /// Total poison (damage per turn x turns); reported, applied only when configured
    pub poison_damage: Option<f64>,
    pub poison_duration: Option<f64>,
    pub poison_applied: bool,
    pub escaped: bool,
    pub cooldown_until: Timestamp,
    pub messages: Vec<String>,
}

/// Result of one attack-and-counter round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub turn: u32,
    pub status: CombatStatus,
    pub player_attack: AttackOutcome,
    pub enemy_attack: Option<AttackOutcome>,
    pub player_hp: u32,
    pub enemy_hp: u32,
    pub enemy_health_percent: f64,
    pub active_buffs: BTreeMap<BuffKind, ActiveBuff>,
    pub xp: Option<XpResult>,
    pub messages: Vec<String>,
}

pub struct CombatEngine {
    catalog: Arc<Catalog>,
    rules: CombatRules,
    progression: ProgressionEngine,
    dice: Mutex<Box<dyn Dice>>,
}

impl CombatEngine {
    pub fn new(
        catalog: Arc<Catalog>,
        rules: CombatRules,
        progression: ProgressionEngine,
        dice: Box<dyn Dice>,
    ) -> Self {
        Self {
            catalog,
            rules,
            progression,
            dice: Mutex::new(dice),
        }
    }

    pub fn rules(&self) -> &CombatRules {
        &self.rules
    }

    /// Swap the dice, e.g. to pin rolls in a test or reseed a replay
    pub fn set_dice(&self, dice: Box<dyn Dice>) {
        *self.dice.lock() = dice;
    }

    /// Jitter, floor and crit on a landed hit
    fn strike(&self, dice: &mut dyn Dice, base: u32) -> AttackOutcome {
        let is_critical = dice.chance(self.rules.crit_chance);
        let jittered = base as i64 + dice.jitter(self.rules.damage_jitter) as i64;
        let mut damage = jittered.max(MIN_HIT_DAMAGE as i64) as u32;
        if is_critical {
            damage = (damage as f64 * self.rules.crit_multiplier) as u32;
        }
        AttackOutcome {
            hit: true,
            damage,
            is_critical,
        }
    }

    /// Dodge roll, then crit roll, then jitter on `attack`
    pub fn resolve_basic_attack(&self, attack: u32) -> AttackOutcome {
        let mut dice = self.dice.lock();
        if dice.chance(self.rules.dodge_chance) {
            debug!(attack, "Attack dodged");
            return AttackOutcome::dodged();
        }
        let outcome = self.strike(&mut **dice, attack);
        debug!(attack, damage = outcome.damage, crit = outcome.is_critical, "Attack landed");
        outcome
    }

    /// Scale outgoing damage by an active damage boost
    pub fn apply_outgoing_buffs(&self, player: &mut Player, base_damage: u32, now: Timestamp) -> u32 {
        match player.buffs.get(BuffKind::DamageBoost, now) {
            Some(boost) => (base_damage as f64 * boost) as u32,
            None => base_damage,
        }
    }

    /// Reduce incoming damage by an active damage reduction, floored at zero
    pub fn apply_incoming_buffs(&self, player: &mut Player, incoming: u32, now: Timestamp) -> u32 {
        match player.buffs.get(BuffKind::DamageReduction, now) {
            Some(reduction) => (incoming as f64 * (1.0 - reduction)).max(0.0) as u32,
            None => incoming,
        }
    }

    pub fn use_skill(
        &self,
        player: &mut Player,
        skill_name: &str,
        enemy: Option<&mut Enemy>,
        now: Timestamp,
    ) -> GameResult<SkillOutcome> {
        let skill = self.progression.skill_with_upgrades(player, skill_name)?;

        if let Some(ready_at) = player.skill_cooldowns.get(skill_name) {
            if self.rules.enforce_cooldowns && now < *ready_at {
                let remaining_secs = secs_until(now, *ready_at);
                warn!(player_id = %player.id, skill = skill_name, remaining_secs, "Skill on cooldown");
                return Err(GameError::SkillOnCooldown {
                    skill: skill_name.into(),
                    remaining_secs,
                });
            }
        }

        let cooldown_until = now + secs_to_duration(skill.cooldown_secs);
        player
            .skill_cooldowns
            .insert(skill_name.to_string(), cooldown_until);

        let mut outcome = SkillOutcome {
            skill_name: skill.name.clone(),
            description: skill.description.clone(),
            skill_level: skill.current_level,
            effect: skill.effect.kind().to_string(),
            damage: None,
            is_critical: false,
            enemy_hp: None,
            enemy_defeated: false,
            enemy_health_percent: None,
            healed: None,
            current_hp: player.current_hp,
            buff_applied: None,
            buff_value: None,
            buff_duration: None,
            poison_damage: None,
            poison_duration: None,
            poison_applied: false,
            escaped: false,
            cooldown_until,
            messages: vec![format!("{skill_name} used!")],
        };

        match &skill.effect {
            SkillEffect::DamageMultiplier { multiplier } => {
                let boost = player.buffs.get(BuffKind::DamageBoost, now).unwrap_or(1.0);
                let base = (player.attack as f64 * multiplier * boost) as u32;
                if let Some(enemy) = enemy {
                    self.hit_enemy(&mut outcome, enemy, base);
                }
            }
            SkillEffect::Damage { amount, poison } => {
                let base = self.apply_outgoing_buffs(player, *amount as u32, now);
                if let Some(enemy) = enemy {
                    self.hit_enemy(&mut outcome, enemy, base);
                    if let Some(poison) = poison {
                        let total = poison.total();
                        outcome.poison_damage = Some(total);
                        outcome.poison_duration = Some(poison.duration);
                        outcome.messages.push(format!(
                            "Poison applied! {total} damage over {} turns",
                            poison.duration
                        ));
                        if self.rules.apply_poison {
                            enemy.take_damage(total as u32);
                            outcome.poison_applied = true;
                            outcome.enemy_hp = Some(enemy.current_hp);
                            outcome.enemy_defeated = enemy.is_defeated();
                            outcome.enemy_health_percent = Some(enemy.health_percent());
                        }
                    }
                }
            }
            SkillEffect::Heal { amount } => {
                let healed = player.heal(*amount as u32);
                outcome.healed = Some(healed);
                outcome.messages.push(format!("Healed for {healed} HP!"));
            }
            SkillEffect::DamageReduction { reduction, .. } => {
                let duration = skill.effect.buff_duration().unwrap_or(DEFAULT_REDUCTION_DURATION);
                player
                    .buffs
                    .insert(BuffKind::DamageReduction, *reduction, duration, now);
                outcome.buff_applied = Some(BuffKind::DamageReduction);
                outcome.buff_value = Some(*reduction);
                outcome.buff_duration = Some(duration);
                outcome.messages.push(format!(
                    "Damage reduction activated! {}% less damage for {duration} turns",
                    (reduction * 100.0).round() as i64
                ));
            }
            SkillEffect::DamageBoost { boost, .. } => {
                let duration = skill.effect.buff_duration().unwrap_or(DEFAULT_BOOST_DURATION);
                player.buffs.insert(BuffKind::DamageBoost, *boost, duration, now);
                outcome.buff_applied = Some(BuffKind::DamageBoost);
                outcome.buff_value = Some(*boost);
                outcome.buff_duration = Some(duration);
                outcome.messages.push(format!(
                    "Damage boost activated! +{}% damage for {duration} turns",
                    ((boost - 1.0) * 100.0).round() as i64
                ));
            }
            SkillEffect::Escape => {
                outcome.escaped = true;
                outcome
                    .messages
                    .push("Successfully escaped from combat!".to_string());
            }
        }

        outcome.current_hp = player.current_hp;
        info!(
            player_id = %player.id,
            skill = skill_name,
            level = skill.current_level,
            damage = ?outcome.damage,
            escaped = outcome.escaped,
            "Skill used"
        );
        Ok(outcome)
    }

    fn hit_enemy(&self, outcome: &mut SkillOutcome, enemy: &mut Enemy, base: u32) {
        let hit = {
            let mut dice = self.dice.lock();
            self.strike(&mut **dice, base)
        };
        enemy.take_damage(hit.damage);

        outcome.damage = Some(hit.damage);
        outcome.is_critical = hit.is_critical;
        outcome.enemy_hp = Some(enemy.current_hp);
        outcome.enemy_defeated = enemy.is_defeated();
        outcome.enemy_health_percent = Some(enemy.health_percent());
        if hit.is_critical {
            outcome.messages.push(format!(
                "CRITICAL! {} deals {} damage!",
                outcome.skill_name, hit.damage
            ));
        } else {
            outcome
                .messages
                .push(format!("{} deals {} damage!", outcome.skill_name, hit.damage));
        }
    }

    /// Kill bookkeeping shared by the turn loop and finishing skills
    pub fn award_victory(&self, player: &mut Player, enemy: &Enemy) -> XpResult {
        player.record_kill(&enemy.enemy_type);
        let xp = self.progression.award_xp(player, enemy.xp_reward);
        info!(
            player_id = %player.id,
            enemy = %enemy.name,
            xp = enemy.xp_reward,
            level = xp.level,
            "Enemy defeated"
        );
        xp
    }

    /// One round: the player attacks, and a surviving enemy counter-attacks.
    ///
    /// The returned status is terminal on victory or defeat; the caller drops
    /// the session in that case.
    pub fn process_turn(
        &self,
        session: &mut CombatSession,
        player: &mut Player,
        now: Timestamp,
    ) -> TurnOutcome {
        session.turn_count += 1;
        let mut messages = Vec::new();

        let player_attack = self.resolve_basic_attack(player.attack);
        if player_attack.hit {
            session.enemy.take_damage(player_attack.damage);
            if player_attack.is_critical {
                messages.push(format!("CRITICAL HIT! {} damage!", player_attack.damage));
            } else {
                messages.push(format!("Hit for {} damage!", player_attack.damage));
            }
        } else {
            messages.push("Missed!".to_string());
        }

        let mut status = CombatStatus::Active;
        let mut enemy_attack = None;
        let mut xp = None;

        if session.enemy.is_defeated() {
            status = CombatStatus::Victory;
            messages.push(format!("{} defeated!", session.enemy.name));
            let result = self.award_victory(player, &session.enemy);
            if result.leveled_up {
                messages.push(format!("LEVEL UP! You are now level {}!", result.level));
            }
            xp = Some(result);
        } else {
            let counter = self.resolve_basic_attack(session.enemy.attack);
            if counter.hit {
                let damage = self.apply_incoming_buffs(player, counter.damage, now);
                player.take_damage(damage);
                messages.push(format!("Enemy hits for {damage} damage!"));
                enemy_attack = Some(AttackOutcome { damage, ..counter });
            } else {
                messages.push("Dodged enemy attack!".to_string());
                enemy_attack = Some(counter);
            }

            if player.is_defeated() {
                status = CombatStatus::Defeat;
                messages.push("You have been defeated!".to_string());
                info!(player_id = %player.id, enemy = %session.enemy.name, "Player defeated");
            }
        }

        debug!(
            player_id = %player.id,
            turn = session.turn_count,
            status = ?status,
            player_hp = player.current_hp,
            enemy_hp = session.enemy.current_hp,
            "Turn processed"
        );

        TurnOutcome {
            turn: session.turn_count,
            status,
            player_attack,
            enemy_attack,
            player_hp: player.current_hp,
            enemy_hp: session.enemy.current_hp,
            enemy_health_percent: session.enemy.health_percent(),
            active_buffs: player.buffs.active(now),
            xp,
            messages,
        }
    }
}
