use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::clock::{secs_until, Timestamp};
use crate::combat::{CombatStatus, Enemy, SkillOutcome, TurnOutcome};
use crate::constants::XP_PER_LEVEL;
use crate::movement::{GeoPoint, LocationUpdate};
use crate::player::{BuffKind, Player};
use crate::progression::XpResult;
use crate::spawn::AreaCheck;

// =====================================================
// Player views
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffMsg {
    pub kind: BuffKind,
    pub value: f64,
    pub remaining_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillStateMsg {
    pub name: String,
    pub effect: String,
    pub level: u32,
    pub max_level: Option<u32>,
    pub cooldown_secs: f64,
    pub cooldown_remaining_secs: f64,
}

/// Read-only snapshot of a player for clients and leaderboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStateMsg {
    pub player_id: String,
    pub character_class: String,
    pub level: u32,
    pub xp: u64,
    pub xp_to_next_level: u64,
    pub current_hp: u32,
    pub max_hp: u32,
    pub health_percent: f64,
    pub attack: u32,
    pub skill_points: u32,
    pub pending_level_up: bool,
    pub kills: BTreeMap<String, u32>,
    pub total_kills: u32,
    pub skills: Vec<SkillStateMsg>,
    pub active_buffs: Vec<BuffMsg>,
    pub last_location: Option<GeoPoint>,
    pub in_combat: bool,
}

impl PlayerStateMsg {
    pub fn from_player(player: &Player, catalog: &Catalog, in_combat: bool, now: Timestamp) -> Self {
        let skills = catalog
            .character(&player.character_class)
            .map(|class| {
                class
                    .skills
                    .iter()
                    .map(|skill| SkillStateMsg {
                        name: skill.name.clone(),
                        effect: skill.effect.kind().to_string(),
                        level: player.skill_level(&skill.name),
                        max_level: skill.max_level(&catalog.upgrades),
                        cooldown_secs: skill.cooldown_secs,
                        cooldown_remaining_secs: player
                            .skill_cooldowns
                            .get(&skill.name)
                            .map_or(0.0, |ready_at| secs_until(now, *ready_at)),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let active_buffs = player
            .buffs
            .snapshot(now)
            .into_iter()
            .map(|(kind, buff)| BuffMsg {
                kind,
                value: buff.value,
                remaining_secs: secs_until(now, buff.expires_at),
            })
            .collect();

        Self {
            player_id: player.id.clone(),
            character_class: player.character_class.clone(),
            level: player.level(),
            xp: player.xp(),
            xp_to_next_level: XP_PER_LEVEL - player.xp() % XP_PER_LEVEL,
            current_hp: player.current_hp,
            max_hp: player.max_hp,
            health_percent: player.health_percent(),
            attack: player.attack,
            skill_points: player.skill_points,
            pending_level_up: player.pending_level_up,
            kills: player.kills.clone(),
            total_kills: player.total_kills(),
            skills,
            active_buffs,
            last_location: player.last_location,
            in_combat,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

// =====================================================
// Movement
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResultMsg {
    pub update: LocationUpdate,
    pub spawned_enemy: Option<Enemy>,
    pub combat_started: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealResultMsg {
    pub healed: u32,
    pub current_hp: u32,
    pub max_hp: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaStatusMsg {
    pub check: AreaCheck,
    pub reason: String,
    pub enemies_nearby: usize,
}

// =====================================================
// Combat
// =====================================================

/// What the player does on their turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "skill", rename_all = "snake_case")]
pub enum CombatAction {
    Attack,
    Skill(String),
}

/// One combat action as seen by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReportMsg {
    pub action: CombatAction,
    pub status: CombatStatus,
    pub turn: u32,
    pub attack: Option<TurnOutcome>,
    pub skill: Option<SkillOutcome>,
    pub xp: Option<XpResult>,
    pub player_hp: u32,
    pub enemy_hp: u32,
    pub enemy_health_percent: f64,
    pub messages: Vec<String>,
}

impl TurnReportMsg {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{secs_to_duration, Clock, ManualClock};

    #[test]
    fn test_player_state_view() {
        let catalog = Catalog::builtin();
        let clock = ManualClock::at_epoch();
        let mut player = Player::new(
            "p1",
            "Pedro Penduko",
            catalog.character("Pedro Penduko").unwrap(),
            catalog.enemy_types(),
            clock.now(),
        );
        player.gain_xp(130);
        player.take_damage(20);
        player
            .skill_cooldowns
            .insert("Fireball".into(), clock.now() + secs_to_duration(12.0));
        player.buffs.insert(BuffKind::DamageReduction, 0.5, 3.0, clock.now());
        clock.advance_secs(2.0);

        let msg = PlayerStateMsg::from_player(&player, &catalog, false, clock.now());
        assert_eq!(msg.level, 2);
        assert_eq!(msg.xp_to_next_level, 70);
        assert_eq!(msg.current_hp, 60);
        assert_eq!(msg.health_percent, 75.0);
        assert_eq!(msg.skills.len(), 3);
        let fireball = msg.skills.iter().find(|s| s.name == "Fireball").unwrap();
        assert_eq!(fireball.cooldown_remaining_secs, 10.0);
        assert_eq!(fireball.max_level, Some(5));
        assert_eq!(msg.active_buffs.len(), 1);
        assert_eq!(msg.active_buffs[0].remaining_secs, 1.0);
        assert!(msg.to_json().contains("\"damage_reduction\""));
    }

    #[test]
    fn test_combat_action_json() {
        assert_eq!(
            serde_json::to_string(&CombatAction::Attack).unwrap(),
            r#"{"action":"attack"}"#
        );
        let skill: CombatAction =
            serde_json::from_str(r#"{"action":"skill","skill":"Fireball"}"#).unwrap();
        assert_eq!(skill, CombatAction::Skill("Fireball".into()));
    }
}
