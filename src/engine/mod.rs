//! Game Engine: Integration Layer
//!
//! Explicitly constructed service object that the request layer holds and
//! calls into. It owns the player store and combat sessions and wires the
//! services together:
//!
//!   1. CombatEngine      : attacks, skills, buffs, turn loop
//!   2. ProgressionEngine : XP, levels, skill upgrades, rewards
//!   3. SpawnDecider      : enemies appearing as players move
//!
//! Responses are plain serde structs the boundary serializes to JSON.

pub mod config;
pub mod game;
pub mod messages;

pub use config::EngineConfig;
pub use game::GameEngine;
pub use messages::*;

// =====================================================
// Tests
// =====================================================
