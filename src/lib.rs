//! GeoQuest - Combat & Progression Core
//!
//! Game logic for a location-based RPG backend:
//! - Static catalogs (characters, skills, enemies, upgrade rules)
//! - Player store with per-player locking and combat session ownership
//! - Turn-based combat (dodge/crit rolls, skills, timed buffs)
//! - Progression (XP, levels, skill upgrades, level-up rewards)
//! - Movement tracking and enemy spawn decisions
//! - Monte-Carlo balance simulation
//!
//! The request layer constructs a [`engine::GameEngine`] and calls into it;
//! every response is a serde value ready to be sent as JSON.

pub mod balance;
pub mod catalog;
pub mod clock;
pub mod combat;
pub mod constants;
pub mod engine;
pub mod error;
pub mod logging;
pub mod movement;
pub mod player;
pub mod progression;
pub mod spawn;

pub use engine::{EngineConfig, GameEngine};
pub use error::{ConfigError, GameError, GameResult};
