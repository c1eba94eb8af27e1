//! Combat session state machine.
//!
//! ```text
//! Active ──► Victory
//!   │  └───► Defeat
//!   └──────► Escaped
//! ```
//! Every exit is terminal; the store drops the session as soon as a turn or
//! skill reports a terminal status.

use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use crate::clock::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatStatus {
    Active,
    Victory,
    Defeat,
    Escaped,
}

impl CombatStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// What to do when combat starts while a session is already active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatStartPolicy {
    /// Drop the running session and start the new one
    #[default]
    Replace,
    /// Refuse with `CombatAlreadyActive`
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSession {
    pub player_id: String,
    pub enemy: Enemy,
    pub started_at: Timestamp,
    pub turn_count: u32,
}

impl CombatSession {
    pub fn new(player_id: &str, enemy: Enemy, now: Timestamp) -> Self {
        Self {
            player_id: player_id.into(),
            enemy,
            started_at: now,
            turn_count: 0,
        }
    }
}
