//! Error kinds returned by the combat and progression services.
//!
//! Every variant is recoverable: services validate first and return one of
//! these before touching any state, so a failed call leaves the player and
//! the combat session exactly as they were.

/// Errors produced by engine operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("Invalid character class: {0}")]
    InvalidCharacterClass(String),
    #[error("Player {0} not found")]
    PlayerNotFound(String),
    #[error("Skill {skill} not found for this character")]
    SkillNotFound { skill: String },
    #[error("Skill {skill} on cooldown: {remaining_secs:.1}s remaining")]
    SkillOnCooldown { skill: String, remaining_secs: f64 },
    #[error("Skill {skill} cannot be upgraded")]
    NotUpgradeable { skill: String },
    #[error("Skill {skill} already at max level {max_level}")]
    MaxLevelReached { skill: String, max_level: u32 },
    #[error("No skill points available")]
    NoSkillPoints,
    #[error("No pending level up")]
    NoPendingLevelUp,
    #[error("Invalid reward type: {0}")]
    InvalidRewardType(String),
    #[error("Invalid enemy type: {0}")]
    InvalidEnemyType(String),
    #[error("No active combat for player {0}")]
    NoActiveCombat(String),
    #[error("Player {0} is already in combat")]
    CombatAlreadyActive(String),
    #[error("Already at full health")]
    AlreadyAtFullHealth,
}

impl GameError {
    /// Stable machine-readable code for the boundary layer
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCharacterClass(_) => "invalid_character_class",
            Self::PlayerNotFound(_) => "player_not_found",
            Self::SkillNotFound { .. } => "skill_not_found",
            Self::SkillOnCooldown { .. } => "skill_on_cooldown",
            Self::NotUpgradeable { .. } => "not_upgradeable",
            Self::MaxLevelReached { .. } => "max_level_reached",
            Self::NoSkillPoints => "no_skill_points",
            Self::NoPendingLevelUp => "no_pending_level_up",
            Self::InvalidRewardType(_) => "invalid_reward_type",
            Self::InvalidEnemyType(_) => "invalid_enemy_type",
            Self::NoActiveCombat(_) => "no_active_combat",
            Self::CombatAlreadyActive(_) => "combat_already_active",
            Self::AlreadyAtFullHealth => "already_at_full_health",
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;

/// Errors raised while loading or validating configuration and catalog files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_identifiers() {
        let err = GameError::SkillOnCooldown {
            skill: "Fireball".into(),
            remaining_secs: 4.21,
        };
        assert_eq!(err.to_string(), "Skill Fireball on cooldown: 4.2s remaining");

        let err = GameError::PlayerNotFound("p-7".into());
        assert!(err.to_string().contains("p-7"));
    }

    #[test]
    fn test_codes_are_snake_case() {
        let errors = [
            GameError::NoSkillPoints,
            GameError::NoPendingLevelUp,
            GameError::InvalidRewardType("gold".into()),
            GameError::MaxLevelReached {
                skill: "Fireball".into(),
                max_level: 5,
            },
        ];
        for err in errors {
            let code = err.code();
            assert!(code.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
