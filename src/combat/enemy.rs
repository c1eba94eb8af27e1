use serde::{Deserialize, Serialize};

use crate::catalog::EnemyType;
use crate::clock::Timestamp;
use crate::movement::GeoPoint;

/// A spawned enemy; lives until its combat session ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub enemy_type: String,
    pub name: String,
    pub max_hp: u32,
    pub current_hp: u32,
    pub attack: u32,
    pub xp_reward: u64,
    pub spawned_at: Timestamp,
    pub location: Option<GeoPoint>,
}

impl Enemy {
    /// Full-HP instance of a catalog enemy type
    pub fn from_type(
        enemy_type: &str,
        template: &EnemyType,
        now: Timestamp,
        location: Option<GeoPoint>,
    ) -> Self {
        Self {
            enemy_type: enemy_type.into(),
            name: template.name.clone(),
            max_hp: template.max_hp,
            current_hp: template.max_hp,
            attack: template.attack,
            xp_reward: template.xp_reward,
            spawned_at: now,
            location,
        }
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

    /// Remaining HP as a percentage rounded to one decimal
    pub fn health_percent(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        let pct = self.current_hp as f64 / self.max_hp as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    }
}
