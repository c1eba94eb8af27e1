use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::{Catalog, EffectiveSkill};
use crate::clock::{Clock, SystemClock, Timestamp};
use crate::combat::{CombatEngine, CombatSession, CombatStatus, Dice, Enemy, SeededDice, SkillOutcome};
use crate::constants::BASIC_HEAL_AMOUNT;
use crate::engine::config::EngineConfig;
use crate::engine::messages::{
    AreaStatusMsg, CombatAction, HealResultMsg, LocationResultMsg, PlayerStateMsg, TurnReportMsg,
};
use crate::error::{ConfigError, GameError, GameResult};
use crate::movement::GeoPoint;
use crate::player::store::start_session;
use crate::player::{Player, PlayerRecord, PlayerStore};
use crate::progression::{ProgressionEngine, RewardResult, UpgradeResult, XpResult};
use crate::spawn::{self, check_area_limits, AreaCheck, AreaState, SpawnDecider, WeightedSpawner};

/// The game engine: owns the player store and wires the services together.
///
/// Every player-scoped operation locks that player's record for its whole
/// duration, so requests for one player are applied one at a time.
pub struct GameEngine {
    config: EngineConfig,
    catalog: Arc<Catalog>,
    clock: Arc<dyn Clock>,
    store: PlayerStore,
    combat: CombatEngine,
    progression: ProgressionEngine,
    spawner: Box<dyn SpawnDecider>,
}

impl GameEngine {
    pub fn new(config: EngineConfig, catalog: Catalog) -> Self {
        let catalog = Arc::new(catalog);
        let progression = ProgressionEngine::new(Arc::clone(&catalog), config.progression.clone());
        let combat = CombatEngine::new(
            Arc::clone(&catalog),
            config.combat.clone(),
            progression.clone(),
            Box::new(SeededDice::from_seed_opt(config.rng_seed)),
        );
        let spawner = WeightedSpawner::new(
            Arc::clone(&catalog),
            config.spawn.clone(),
            Box::new(SeededDice::from_seed_opt(
                config.rng_seed.map(|s| s.wrapping_add(1)),
            )),
        );
        info!(
            characters = catalog.characters.len(),
            enemies = catalog.enemies.len(),
            seeded = config.rng_seed.is_some(),
            "Game engine created"
        );

        Self {
            config,
            catalog,
            clock: Arc::new(SystemClock),
            store: PlayerStore::new(),
            combat,
            progression,
            spawner: Box::new(spawner),
        }
    }

    /// Validate the config, load its catalog and build the engine
    pub fn from_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = config.load_catalog()?;
        Ok(Self::new(config, catalog))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_spawner(mut self, spawner: Box<dyn SpawnDecider>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn with_dice(self, dice: Box<dyn Dice>) -> Self {
        self.combat.set_dice(dice);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn combat(&self) -> &CombatEngine {
        &self.combat
    }

    pub fn progression(&self) -> &ProgressionEngine {
        &self.progression
    }

    pub fn store(&self) -> &PlayerStore {
        &self.store
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // --- Players ---

    pub fn create_player(&self, id: &str, class_name: &str) -> GameResult<Player> {
        self.store.create_player(id, class_name, &self.catalog, self.now())
    }

    pub fn get_player(&self, id: &str) -> Option<Player> {
        self.store.get_player(id)
    }

    pub fn player_state(&self, id: &str) -> GameResult<PlayerStateMsg> {
        let now = self.now();
        self.store.with_record(id, |record| {
            PlayerStateMsg::from_player(&record.player, &self.catalog, record.combat.is_some(), now)
        })
    }

    /// Players ranked by level, then XP, then kills
    pub fn leaderboard(&self, limit: usize) -> Vec<PlayerStateMsg> {
        let now = self.now();
        let mut players = self.store.players();
        players.sort_by(|a, b| {
            b.level()
                .cmp(&a.level())
                .then(b.xp().cmp(&a.xp()))
                .then(b.total_kills().cmp(&a.total_kills()))
                .then(a.id.cmp(&b.id))
        });
        players
            .iter()
            .take(limit)
            .map(|p| {
                let in_combat = self.store.get_combat(&p.id).is_some();
                PlayerStateMsg::from_player(p, &self.catalog, in_combat, now)
            })
            .collect()
    }

    /// Out-of-combat basic heal
    pub fn heal_player(&self, id: &str) -> GameResult<HealResultMsg> {
        self.store.with_player(id, |player| {
            if player.current_hp >= player.max_hp {
                return Err(GameError::AlreadyAtFullHealth);
            }
            let healed = player.heal(BASIC_HEAL_AMOUNT);
            info!(player_id = id, healed, "Player healed");
            Ok(HealResultMsg {
                healed,
                current_hp: player.current_hp,
                max_hp: player.max_hp,
            })
        })?
    }

    // --- Movement & spawning ---

    /// Record a GPS report; may spawn an enemy and engage it when the
    /// player is not already fighting.
    pub fn update_location(&self, id: &str, lat: f64, lon: f64) -> GameResult<LocationResultMsg> {
        let now = self.now();
        let area = AreaState::new(self.store.engaged_enemies(Some(id)));

        self.store.with_record(id, |record| {
            let update = record.player.record_location(GeoPoint::new(lat, lon));
            let mut result = LocationResultMsg {
                update,
                spawned_enemy: None,
                combat_started: false,
            };
            if record.combat.is_some() {
                return Ok(result);
            }

            let spawned =
                self.spawner
                    .decide_spawn(&record.player, result.update.distance_traveled, &area, now);
            if let Some(enemy) = spawned {
                record.player.reset_spawn_tracking(now);
                start_session(record, enemy.clone(), now, self.config.combat_start_policy)?;
                result.spawned_enemy = Some(enemy);
                result.combat_started = true;
            }
            Ok(result)
        })?
    }

    pub fn area_status(&self, id: &str) -> GameResult<AreaStatusMsg> {
        let now = self.now();
        let player = self
            .store
            .get_player(id)
            .ok_or_else(|| GameError::PlayerNotFound(id.into()))?;
        let area = AreaState::new(self.store.engaged_enemies(None));

        let (check, enemies_nearby) = match player.last_location {
            Some(location) => (
                check_area_limits(&location, &area, &self.config.spawn, now),
                area.nearby(&location, self.config.spawn.area_radius_meters)
                    .count(),
            ),
            None => (AreaCheck::Allowed, 0),
        };
        Ok(AreaStatusMsg {
            reason: check.to_string(),
            check,
            enemies_nearby,
        })
    }

    pub fn spawn_enemy(&self, enemy_type: &str, location: Option<GeoPoint>) -> GameResult<Enemy> {
        spawn::spawn_enemy(&self.catalog, enemy_type, self.now(), location)
    }

    // --- Combat sessions ---

    pub fn start_combat(&self, id: &str, enemy: Enemy) -> GameResult<CombatSession> {
        self.store
            .start_combat(id, enemy, self.now(), self.config.combat_start_policy)
    }

    /// Spawn an enemy of `enemy_type` at the player's location and engage it
    pub fn engage(&self, id: &str, enemy_type: &str) -> GameResult<CombatSession> {
        let now = self.now();
        self.store.with_record(id, |record| {
            let enemy = spawn::spawn_enemy(
                &self.catalog,
                enemy_type,
                now,
                record.player.last_location,
            )?;
            start_session(record, enemy, now, self.config.combat_start_policy)
        })?
    }

    pub fn end_combat(&self, id: &str) -> GameResult<Option<CombatSession>> {
        self.store.end_combat(id)
    }

    pub fn get_combat(&self, id: &str) -> Option<CombatSession> {
        self.store.get_combat(id)
    }

    /// One player action against the active session's enemy
    pub fn combat_turn(&self, id: &str, action: CombatAction) -> GameResult<TurnReportMsg> {
        let now = self.now();
        self.store
            .with_record(id, |record| self.run_action(record, action, now))?
    }

    fn run_action(
        &self,
        record: &mut PlayerRecord,
        action: CombatAction,
        now: Timestamp,
    ) -> GameResult<TurnReportMsg> {
        match action {
            CombatAction::Attack => self.attack_turn(record, now),
            CombatAction::Skill(name) => {
                let turn = self.skill_turn(record, &name, now)?;
                Ok(TurnReportMsg {
                    action: CombatAction::Skill(name),
                    status: turn.status,
                    turn: turn.turn,
                    attack: None,
                    xp: turn.xp,
                    player_hp: turn.outcome.current_hp,
                    enemy_hp: turn.enemy_hp,
                    enemy_health_percent: turn.enemy_health_percent,
                    messages: turn.outcome.messages.clone(),
                    skill: Some(turn.outcome),
                })
            }
        }
    }

    fn attack_turn(&self, record: &mut PlayerRecord, now: Timestamp) -> GameResult<TurnReportMsg> {
        let player = &mut record.player;
        let Some(session) = record.combat.as_mut() else {
            warn!(player_id = %player.id, "Attack without active combat");
            return Err(GameError::NoActiveCombat(player.id.clone()));
        };

        let outcome = self.combat.process_turn(session, player, now);
        end_if_terminal(record, outcome.status);
        Ok(TurnReportMsg {
            action: CombatAction::Attack,
            status: outcome.status,
            turn: outcome.turn,
            xp: outcome.xp.clone(),
            player_hp: outcome.player_hp,
            enemy_hp: outcome.enemy_hp,
            enemy_health_percent: outcome.enemy_health_percent,
            messages: outcome.messages.clone(),
            attack: Some(outcome),
            skill: None,
        })
    }

    /// A skill aimed at the session enemy. A kill is a victory with the usual
    /// XP and kill accounting; an escape ends the session.
    fn skill_turn(
        &self,
        record: &mut PlayerRecord,
        skill_name: &str,
        now: Timestamp,
    ) -> GameResult<SkillTurn> {
        let player = &mut record.player;
        let Some(session) = record.combat.as_mut() else {
            warn!(player_id = %player.id, skill = skill_name, "Skill without active combat");
            return Err(GameError::NoActiveCombat(player.id.clone()));
        };

        let mut outcome = self
            .combat
            .use_skill(player, skill_name, Some(&mut session.enemy), now)?;
        let mut xp = None;
        let status = if outcome.escaped {
            CombatStatus::Escaped
        } else if session.enemy.is_defeated() {
            outcome
                .messages
                .push(format!("{} defeated!", session.enemy.name));
            let result = self.combat.award_victory(player, &session.enemy);
            if result.leveled_up {
                outcome
                    .messages
                    .push(format!("LEVEL UP! You are now level {}!", result.level));
            }
            xp = Some(result);
            CombatStatus::Victory
        } else {
            CombatStatus::Active
        };

        let turn = SkillTurn {
            status,
            turn: session.turn_count,
            xp,
            enemy_hp: session.enemy.current_hp,
            enemy_health_percent: session.enemy.health_percent(),
            outcome,
        };
        end_if_terminal(record, status);
        Ok(turn)
    }

    /// Use a skill; in combat it targets the session enemy like a combat turn
    pub fn use_skill(&self, id: &str, skill_name: &str) -> GameResult<SkillOutcome> {
        let now = self.now();
        self.store.with_record(id, |record| {
            if record.combat.is_some() {
                self.skill_turn(record, skill_name, now).map(|turn| turn.outcome)
            } else {
                self.combat.use_skill(&mut record.player, skill_name, None, now)
            }
        })?
    }

    // --- Progression ---

    pub fn award_xp(&self, id: &str, amount: u64) -> GameResult<XpResult> {
        self.store
            .with_player(id, |player| self.progression.award_xp(player, amount))
    }

    pub fn upgrade_skill(&self, id: &str, skill_name: &str) -> GameResult<UpgradeResult> {
        self.store
            .with_player(id, |player| self.progression.upgrade_skill(player, skill_name))?
    }

    pub fn apply_level_up_reward(&self, id: &str, reward: &str) -> GameResult<RewardResult> {
        self.store
            .with_player(id, |player| self.progression.apply_level_up_reward(player, reward))?
    }

    pub fn skill_with_upgrades(&self, id: &str, skill_name: &str) -> GameResult<EffectiveSkill> {
        self.store
            .with_player(id, |player| self.progression.skill_with_upgrades(player, skill_name))?
    }

    /// Drop every player and session
    pub fn reset(&self) {
        self.store.clear();
        info!("Game engine reset");
    }
}

/// A skill cast inside a session, with the session state after it
struct SkillTurn {
    outcome: SkillOutcome,
    status: CombatStatus,
    turn: u32,
    xp: Option<XpResult>,
    enemy_hp: u32,
    enemy_health_percent: f64,
}

fn end_if_terminal(record: &mut PlayerRecord, status: CombatStatus) {
    if status.is_terminal() {
        record.combat = None;
        info!(player_id = %record.player.id, status = ?status, "Combat ended");
    }
}
