//! Player records and the store that owns them.
//!
//! A player is created when a character is selected and lives for the
//! process lifetime. Level is never stored: it is derived from XP on every
//! read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::CharacterClass;
use crate::clock::Timestamp;
use crate::constants::{MAX_XP, XP_PER_LEVEL};
use crate::movement::{GeoPoint, LocationUpdate};

pub mod buffs;
pub mod store;

pub use buffs::{ActiveBuff, ActiveBuffs, BuffKind};
pub use store::{PlayerRecord, PlayerStore};

/// Level for a given XP total: 1 + xp / 100, for xp up to `MAX_XP`
pub fn level_for_xp(xp: u64) -> u32 {
    (1 + xp.min(MAX_XP) / XP_PER_LEVEL) as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub character_class: String,
    pub max_hp: u32,
    pub current_hp: u32,
    pub attack: u32,
    xp: u64,
    pub skill_points: u32,
    /// enemy type -> kills
    pub kills: BTreeMap<String, u32>,
    pub last_location: Option<GeoPoint>,
    pub distance_since_last_spawn: f64,
    pub last_spawn_at: Option<Timestamp>,
    /// skill name -> upgrade level (absent = 0)
    pub skill_levels: BTreeMap<String, u32>,
    /// skill name -> time the skill is ready again
    pub skill_cooldowns: BTreeMap<String, Timestamp>,
    pub buffs: ActiveBuffs,
    pub pending_level_up: bool,
    pub created_at: Timestamp,
}

impl Player {
    pub fn new<'a>(
        id: &str,
        class_name: &str,
        class: &CharacterClass,
        enemy_types: impl IntoIterator<Item = &'a str>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            character_class: class_name.into(),
            max_hp: class.max_hp,
            current_hp: class.max_hp,
            attack: class.attack,
            xp: 0,
            skill_points: 0,
            kills: enemy_types.into_iter().map(|t| (t.to_string(), 0)).collect(),
            last_location: None,
            distance_since_last_spawn: 0.0,
            last_spawn_at: None,
            skill_levels: BTreeMap::new(),
            skill_cooldowns: BTreeMap::new(),
            buffs: ActiveBuffs::default(),
            pending_level_up: false,
            created_at: now,
        }
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    pub fn level(&self) -> u32 {
        level_for_xp(self.xp)
    }

    /// Add XP, saturating at `MAX_XP`, returning (old level, new level)
    pub(crate) fn gain_xp(&mut self, amount: u64) -> (u32, u32) {
        let old_level = self.level();
        self.xp = self.xp.saturating_add(amount).min(MAX_XP);
        (old_level, self.level())
    }

    pub fn skill_level(&self, skill_name: &str) -> u32 {
        self.skill_levels.get(skill_name).copied().unwrap_or(0)
    }

    pub fn total_kills(&self) -> u32 {
        self.kills.values().sum()
    }

    pub fn record_kill(&mut self, enemy_type: &str) {
        *self.kills.entry(enemy_type.to_string()).or_insert(0) += 1;
    }

    /// Restore HP without exceeding max, returning the amount restored
    pub fn heal(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.max_hp - self.current_hp);
        self.current_hp += restored;
        restored
    }

    /// Remove HP without going below zero, returning the amount removed
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.current_hp);
        self.current_hp -= removed;
        removed
    }

    pub fn is_defeated(&self) -> bool {
        self.current_hp == 0
    }

    pub fn health_percent(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.current_hp as f64 / self.max_hp as f64 * 100.0
    }

    /// Store a new location and accumulate travel since the last spawn
    pub fn record_location(&mut self, location: GeoPoint) -> LocationUpdate {
        let distance_traveled = self
            .last_location
            .map_or(0.0, |last| last.distance_to(&location));
        self.last_location = Some(location);
        self.distance_since_last_spawn += distance_traveled;

        LocationUpdate {
            location,
            distance_traveled,
            distance_since_last_spawn: self.distance_since_last_spawn,
        }
    }

    pub fn reset_spawn_tracking(&mut self, now: Timestamp) {
        self.distance_since_last_spawn = 0.0;
        self.last_spawn_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::clock::{Clock, ManualClock};

    fn volta() -> Player {
        let catalog = Catalog::builtin();
        let clock = ManualClock::at_epoch();
        Player::new(
            "p1",
            "Volta",
            catalog.character("Volta").unwrap(),
            catalog.enemy_types(),
            clock.now(),
        )
    }

    #[test]
    fn test_new_player_from_class() {
        let player = volta();
        assert_eq!(player.max_hp, 120);
        assert_eq!(player.current_hp, 120);
        assert_eq!(player.attack, 15);
        assert_eq!(player.level(), 1);
        assert_eq!(player.kills.len(), 3);
        assert_eq!(player.total_kills(), 0);
    }

    #[test]
    fn test_level_derived_from_xp() {
        let mut player = volta();
        assert_eq!(player.gain_xp(99), (1, 1));
        assert_eq!(player.gain_xp(1), (1, 2));
        assert_eq!(player.gain_xp(250), (2, 4));
        assert_eq!(player.xp(), 350);
    }

    #[test]
    fn test_xp_saturates_at_cap() {
        let mut player = volta();
        player.gain_xp(u64::MAX);
        assert_eq!(player.xp(), MAX_XP);
        assert_eq!(player.level(), u32::MAX);
        assert_eq!(player.level() as u64, 1 + player.xp() / XP_PER_LEVEL);

        assert_eq!(player.gain_xp(u64::MAX), (u32::MAX, u32::MAX));
        assert_eq!(player.xp(), MAX_XP);
    }

    #[test]
    fn test_hp_clamps() {
        let mut player = volta();
        assert_eq!(player.take_damage(500), 120);
        assert_eq!(player.current_hp, 0);
        assert!(player.is_defeated());
        assert_eq!(player.heal(500), 120);
        assert_eq!(player.current_hp, 120);
        assert_eq!(player.heal(10), 0);
    }

    #[test]
    fn test_location_accumulates_distance() {
        let mut player = volta();
        let first = player.record_location(GeoPoint::new(14.5995, 120.9842));
        assert_eq!(first.distance_traveled, 0.0);

        let second = player.record_location(GeoPoint::new(14.6000, 120.9842));
        assert!(second.distance_traveled > 50.0);
        assert_eq!(second.distance_since_last_spawn, second.distance_traveled);

        player.reset_spawn_tracking(player.created_at);
        assert_eq!(player.distance_since_last_spawn, 0.0);
        assert!(player.last_spawn_at.is_some());
    }
}
