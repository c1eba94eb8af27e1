//! Enemy spawn decisions.
//!
//! A spawn needs a real step (not GPS noise), enough travel since the last
//! spawn, room in the surrounding area and a passing probability roll. The
//! enemy type is then drawn from the configured weights.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::Catalog;
use crate::clock::{secs_until, secs_to_duration, Timestamp};
use crate::combat::{Dice, Enemy};
use crate::constants::*;
use crate::error::{ConfigError, GameResult};
use crate::movement::GeoPoint;
use crate::player::Player;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub min_step_meters: f64,
    pub min_travel_meters: f64,
    pub spawn_probability: f64,
    /// enemy type -> relative weight
    pub enemy_weights: BTreeMap<String, f64>,
    pub max_enemies_per_area: usize,
    pub area_radius_meters: f64,
    pub spawn_cooldown_secs: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            min_step_meters: SPAWN_MIN_STEP_METERS,
            min_travel_meters: SPAWN_MIN_TRAVEL_METERS,
            spawn_probability: SPAWN_PROBABILITY,
            enemy_weights: BTreeMap::from([
                ("class1".to_string(), 70.0),
                ("class2".to_string(), 25.0),
                ("class3".to_string(), 5.0),
            ]),
            max_enemies_per_area: MAX_ENEMIES_PER_AREA,
            area_radius_meters: SPAWN_AREA_RADIUS_METERS,
            spawn_cooldown_secs: SPAWN_COOLDOWN_SECS,
        }
    }
}

impl SpawnConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(ConfigError::Invalid(format!(
                "spawn_probability must be in [0, 1], got {}",
                self.spawn_probability
            )));
        }
        for (name, value) in [
            ("min_step_meters", self.min_step_meters),
            ("min_travel_meters", self.min_travel_meters),
            ("area_radius_meters", self.area_radius_meters),
            ("spawn_cooldown_secs", self.spawn_cooldown_secs),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must not be negative")));
            }
        }
        if self.enemy_weights.is_empty() {
            return Err(ConfigError::Invalid("enemy_weights is empty".into()));
        }
        if self.enemy_weights.values().any(|w| *w < 0.0) {
            return Err(ConfigError::Invalid("enemy weights must not be negative".into()));
        }
        if self.enemy_weights.values().sum::<f64>() <= 0.0 {
            return Err(ConfigError::Invalid("enemy weights sum to zero".into()));
        }
        Ok(())
    }

    /// Every weighted enemy type must exist in the catalog
    pub fn validate_against(&self, catalog: &Catalog) -> Result<(), ConfigError> {
        match self
            .enemy_weights
            .keys()
            .find(|t| !catalog.enemies.contains_key(*t))
        {
            Some(unknown) => Err(ConfigError::Invalid(format!(
                "enemy_weights names unknown enemy type {unknown}"
            ))),
            None => Ok(()),
        }
    }
}

/// Enemies already present in the world around a location
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaState {
    pub enemies: Vec<Enemy>,
}

impl AreaState {
    pub fn new(enemies: Vec<Enemy>) -> Self {
        Self { enemies }
    }

    /// Enemies with a location within `radius` meters of `center`
    pub fn nearby<'a>(&'a self, center: &'a GeoPoint, radius: f64) -> impl Iterator<Item = &'a Enemy> {
        self.enemies.iter().filter(move |e| {
            e.location
                .is_some_and(|loc| loc.distance_to(center) <= radius)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AreaCheck {
    Allowed,
    AreaFull { count: usize, max: usize },
    Cooldown { remaining_secs: f64 },
}

impl AreaCheck {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

impl fmt::Display for AreaCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allowed => write!(f, "Spawning allowed"),
            Self::AreaFull { count, max } => {
                write!(f, "Area limit reached ({count}/{max} enemies)")
            }
            Self::Cooldown { remaining_secs } => {
                write!(f, "Cooldown active ({remaining_secs:.1}s remaining)")
            }
        }
    }
}

/// Area occupancy and per-area spawn cooldown around `location`
pub fn check_area_limits(
    location: &GeoPoint,
    area: &AreaState,
    config: &SpawnConfig,
    now: Timestamp,
) -> AreaCheck {
    let mut count = 0;
    let mut last_spawn: Option<Timestamp> = None;
    for enemy in area.nearby(location, config.area_radius_meters) {
        count += 1;
        if last_spawn.map_or(true, |t| enemy.spawned_at > t) {
            last_spawn = Some(enemy.spawned_at);
        }
    }

    if count >= config.max_enemies_per_area {
        return AreaCheck::AreaFull {
            count,
            max: config.max_enemies_per_area,
        };
    }
    if let Some(last) = last_spawn {
        let ready_at = last + secs_to_duration(config.spawn_cooldown_secs);
        if now < ready_at {
            return AreaCheck::Cooldown {
                remaining_secs: secs_until(now, ready_at),
            };
        }
    }
    AreaCheck::Allowed
}

/// Full-HP enemy of a catalog type
pub fn spawn_enemy(
    catalog: &Catalog,
    enemy_type: &str,
    now: Timestamp,
    location: Option<GeoPoint>,
) -> GameResult<Enemy> {
    let template = catalog.enemy(enemy_type)?;
    Ok(Enemy::from_type(enemy_type, template, now, location))
}

/// Weighted draw; `roll` is uniform in [0, 1)
pub fn pick_weighted(weights: &BTreeMap<String, f64>, roll: f64) -> Option<&str> {
    let total: f64 = weights.values().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }
    let target = roll * total;
    let mut cumulative = 0.0;
    let mut last = None;
    for (name, weight) in weights.iter().filter(|(_, w)| **w > 0.0) {
        cumulative += weight;
        last = Some(name.as_str());
        if target < cumulative {
            return last;
        }
    }
    last
}

/// Decides whether movement produces an enemy.
///
/// Point-of-interest spawners plug in here; the built-in one is
/// [`WeightedSpawner`].
pub trait SpawnDecider: Send + Sync {
    fn decide_spawn(
        &self,
        player: &Player,
        distance_traveled: f64,
        area: &AreaState,
        now: Timestamp,
    ) -> Option<Enemy>;
}

pub struct WeightedSpawner {
    catalog: Arc<Catalog>,
    config: SpawnConfig,
    dice: Mutex<Box<dyn Dice>>,
}

impl WeightedSpawner {
    pub fn new(catalog: Arc<Catalog>, config: SpawnConfig, dice: Box<dyn Dice>) -> Self {
        Self {
            catalog,
            config,
            dice: Mutex::new(dice),
        }
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }
}

impl SpawnDecider for WeightedSpawner {
    fn decide_spawn(
        &self,
        player: &Player,
        distance_traveled: f64,
        area: &AreaState,
        now: Timestamp,
    ) -> Option<Enemy> {
        if distance_traveled < self.config.min_step_meters {
            return None;
        }
        if player.distance_since_last_spawn < self.config.min_travel_meters {
            return None;
        }
        let location = player.last_location?;

        let check = check_area_limits(&location, area, &self.config, now);
        if !check.is_allowed() {
            debug!(player_id = %player.id, reason = %check, "Spawn blocked");
            return None;
        }

        let (passed, roll) = {
            let mut dice = self.dice.lock();
            (dice.chance(self.config.spawn_probability), dice.unit())
        };
        if !passed {
            return None;
        }

        let enemy_type = pick_weighted(&self.config.enemy_weights, roll)?;
        let enemy = spawn_enemy(&self.catalog, enemy_type, now, Some(location)).ok()?;
        debug!(player_id = %player.id, enemy = %enemy.name, "Enemy spawned");
        Some(enemy)
    }
}
