//! In-memory player store.
//!
//! Each player record sits behind its own mutex, so one request on a player
//! runs to completion before the next one on the same player starts, while
//! requests for different players proceed independently. The outer map lock
//! is only held long enough to find or insert a record.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::Player;
use crate::catalog::Catalog;
use crate::clock::Timestamp;
use crate::combat::{CombatSession, CombatStartPolicy, Enemy};
use crate::error::{GameError, GameResult};

/// A player and the combat session it owns, if any
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub player: Player,
    pub combat: Option<CombatSession>,
}

#[derive(Debug, Default)]
pub struct PlayerStore {
    records: RwLock<HashMap<String, Arc<Mutex<PlayerRecord>>>>,
}

impl PlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a player for a character class, replacing any earlier record
    /// with the same id (character re-selection starts over).
    pub fn create_player(
        &self,
        id: &str,
        class_name: &str,
        catalog: &Catalog,
        now: Timestamp,
    ) -> GameResult<Player> {
        let class = catalog.character(class_name)?;
        let player = Player::new(id, class_name, class, catalog.enemy_types(), now);
        let record = PlayerRecord {
            player: player.clone(),
            combat: None,
        };

        let mut records = self.records.write();
        match records.get(id) {
            Some(existing) => {
                *existing.lock() = record;
                info!(player_id = id, class = class_name, "Player re-created");
            }
            None => {
                records.insert(id.to_string(), Arc::new(Mutex::new(record)));
                info!(player_id = id, class = class_name, "Player created");
            }
        }
        Ok(player)
    }

    fn record(&self, id: &str) -> GameResult<Arc<Mutex<PlayerRecord>>> {
        self.records
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::PlayerNotFound(id.into()))
    }

    /// Snapshot of a player
    pub fn get_player(&self, id: &str) -> Option<Player> {
        self.record(id).ok().map(|r| r.lock().player.clone())
    }

    /// Run `f` with exclusive access to one player's record
    pub fn with_record<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut PlayerRecord) -> R,
    ) -> GameResult<R> {
        let record = self.record(id)?;
        let mut guard = record.lock();
        Ok(f(&mut guard))
    }

    pub fn with_player<R>(&self, id: &str, f: impl FnOnce(&mut Player) -> R) -> GameResult<R> {
        self.with_record(id, |record| f(&mut record.player))
    }

    pub fn start_combat(
        &self,
        id: &str,
        enemy: Enemy,
        now: Timestamp,
        policy: CombatStartPolicy,
    ) -> GameResult<CombatSession> {
        self.with_record(id, |record| start_session(record, enemy, now, policy))?
    }

    /// End a player's combat, returning the session that was running
    pub fn end_combat(&self, id: &str) -> GameResult<Option<CombatSession>> {
        self.with_record(id, |record| {
            let ended = record.combat.take();
            if let Some(session) = &ended {
                info!(
                    player_id = id,
                    enemy = %session.enemy.name,
                    turns = session.turn_count,
                    "Combat ended"
                );
            }
            ended
        })
    }

    pub fn get_combat(&self, id: &str) -> Option<CombatSession> {
        self.record(id).ok().and_then(|r| r.lock().combat.clone())
    }

    /// Enemies currently engaged in any session, optionally skipping one player
    pub fn engaged_enemies(&self, except: Option<&str>) -> Vec<Enemy> {
        let records: Vec<(String, Arc<Mutex<PlayerRecord>>)> = self
            .records
            .read()
            .iter()
            .filter(|(id, _)| Some(id.as_str()) != except)
            .map(|(id, r)| (id.clone(), Arc::clone(r)))
            .collect();
        records
            .iter()
            .filter_map(|(_, r)| r.lock().combat.as_ref().map(|s| s.enemy.clone()))
            .collect()
    }

    pub fn player_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Snapshot of every player, ordered by id
    pub fn players(&self) -> Vec<Player> {
        let records: Vec<Arc<Mutex<PlayerRecord>>> =
            self.records.read().values().cloned().collect();
        let mut players: Vec<Player> = records.iter().map(|r| r.lock().player.clone()).collect();
        players.sort_by(|a, b| a.id.cmp(&b.id));
        players
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Drop every player and session
    pub fn clear(&self) {
        let mut records = self.records.write();
        debug!(count = records.len(), "Clearing player store");
        records.clear();
    }
}

/// Attach a new session to a locked record, honoring the start policy
pub(crate) fn start_session(
    record: &mut PlayerRecord,
    enemy: Enemy,
    now: Timestamp,
    policy: CombatStartPolicy,
) -> GameResult<CombatSession> {
    let id = record.player.id.clone();
    if let Some(existing) = &record.combat {
        match policy {
            CombatStartPolicy::Reject => {
                warn!(player_id = %id, enemy = %existing.enemy.name, "Combat already active");
                return Err(GameError::CombatAlreadyActive(id));
            }
            CombatStartPolicy::Replace => {
                info!(
                    player_id = %id,
                    replaced = %existing.enemy.name,
                    "Replacing active combat"
                );
            }
        }
    }

    let session = CombatSession::new(&id, enemy, now);
    info!(player_id = %id, enemy = %session.enemy.name, "Combat started");
    record.combat = Some(session.clone());
    Ok(session)
}
