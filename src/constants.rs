//! Centralized game constants for the geoquest core.
//!
//! Defaults for the tunable rule sets in `engine::config` live here so the
//! combat, progression and spawn services agree on a single source of truth.
//! Catalog data (character stats, skills, enemies) lives in `catalog`.

// =====================================================
// Combat
// =====================================================

/// Chance that an attack is dodged outright (5%)
pub const DODGE_CHANCE: f64 = 0.05;

/// Chance that a landed attack is a critical hit (10%)
pub const CRIT_CHANCE: f64 = 0.10;

/// Critical damage multiplier (2.0x)
pub const CRIT_MULTIPLIER: f64 = 2.0;

/// Uniform integer jitter applied to every damage roll: base +/- DAMAGE_JITTER
pub const DAMAGE_JITTER: i32 = 3;

/// Floor for any landed hit, applied after jitter and before crit
pub const MIN_HIT_DAMAGE: u32 = 1;

/// Duration used by a damage-reduction buff that does not name one
pub const DEFAULT_REDUCTION_DURATION: f64 = 3.0;

/// Duration used by a damage-boost buff that does not name one
pub const DEFAULT_BOOST_DURATION: f64 = 4.0;

// =====================================================
// Progression
// =====================================================

/// XP per level: level = 1 + xp / XP_PER_LEVEL
pub const XP_PER_LEVEL: u64 = 100;

/// XP ceiling; awards saturate here so the derived level fits a `u32`
pub const MAX_XP: u64 = (u32::MAX as u64 - 1) * XP_PER_LEVEL;

/// Skill points granted per level-up event
pub const SKILL_POINTS_PER_LEVEL_UP: u32 = 1;

// =====================================================
// Out-of-combat healing
// =====================================================

/// HP restored by the basic heal action
pub const BASIC_HEAL_AMOUNT: u32 = 25;

// =====================================================
// Movement & Spawning
// =====================================================

/// Mean Earth radius used by the haversine distance (meters)
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A single location report must move at least this far to be considered
pub const SPAWN_MIN_STEP_METERS: f64 = 1.0;

/// Accumulated travel since the last spawn required before another spawn
pub const SPAWN_MIN_TRAVEL_METERS: f64 = 5.0;

/// Probability of a spawn once the travel thresholds are met
pub const SPAWN_PROBABILITY: f64 = 1.0;

/// Maximum enemies allowed within `SPAWN_AREA_RADIUS_METERS` of the player
pub const MAX_ENEMIES_PER_AREA: usize = 3;

/// Radius used when counting enemies around the player (meters)
pub const SPAWN_AREA_RADIUS_METERS: f64 = 1.0;

/// Minimum seconds between spawns inside one area
pub const SPAWN_COOLDOWN_SECS: f64 = 10.0;
