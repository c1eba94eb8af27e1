//! Monte-Carlo Balance Simulation
//!
//! Fights every character against every enemy type many times with seeded
//! dice and reports win rates, fight length and leftover HP per pairing.
//! Fights are independent, so they run in parallel with rayon.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::clock::{Clock, ManualClock};
use crate::combat::{CombatEngine, CombatRules, CombatSession, CombatStatus, Enemy, SeededDice};
use crate::player::Player;
use crate::progression::{ProgressionEngine, ProgressionRules};

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub fights_per_pairing: u32,
    pub base_seed: u64,
    /// Fights still running after this many turns count as losses
    pub max_turns: u32,
    pub rules: CombatRules,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fights_per_pairing: 1_000,
            base_seed: 42,
            max_turns: 100,
            rules: CombatRules::default(),
        }
    }
}

/// Outcome of one simulated fight
#[derive(Debug, Clone, Copy, PartialEq)]
struct FightResult {
    won: bool,
    turns: u32,
    remaining_hp: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingReport {
    pub character: String,
    pub enemy_type: String,
    pub fights: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub avg_turns: f64,
    /// Average HP left on wins
    pub avg_remaining_hp: f64,
}

/// Overall balance assessment from the spread of win rates against each enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceGrade {
    Excellent, // spread < 0.10
    Good,      // spread < 0.20
    Fair,      // spread < 0.35
    Poor,      // spread >= 0.35
}

impl BalanceGrade {
    pub fn from_spread(spread: f64) -> Self {
        if spread < 0.10 {
            Self::Excellent
        } else if spread < 0.20 {
            Self::Good
        } else if spread < 0.35 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReport {
    pub total_fights: u64,
    pub pairings: Vec<PairingReport>,
    /// Mean over enemy types of (best - worst) character win rate
    pub win_rate_spread: f64,
    pub balance_grade: BalanceGrade,
}

/// Deterministic per-fight seed
pub fn fight_seed(base_seed: u64, character: &str, enemy_type: &str, index: u32) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(character.as_bytes());
    hasher.update(enemy_type.as_bytes());
    hasher.update(index.to_le_bytes());
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[0..8]);
    u64::from_le_bytes(bytes)
}

fn simulate_fight(
    catalog: &Arc<Catalog>,
    config: &SimConfig,
    character: &str,
    enemy_type: &str,
    seed: u64,
) -> FightResult {
    let lost = FightResult {
        won: false,
        turns: 0,
        remaining_hp: 0,
    };
    let (Ok(class), Ok(template)) = (catalog.character(character), catalog.enemy(enemy_type))
    else {
        return lost;
    };

    let clock = ManualClock::at_epoch();
    let now = clock.now();
    let progression = ProgressionEngine::new(Arc::clone(catalog), ProgressionRules::default());
    let engine = CombatEngine::new(
        Arc::clone(catalog),
        config.rules.clone(),
        progression,
        Box::new(SeededDice::new(seed)),
    );

    let mut player = Player::new("sim", character, class, catalog.enemy_types(), now);
    let enemy = Enemy::from_type(enemy_type, template, now, None);
    let mut session = CombatSession::new("sim", enemy, now);

    while session.turn_count < config.max_turns {
        let outcome = engine.process_turn(&mut session, &mut player, now);
        match outcome.status {
            CombatStatus::Active => continue,
            status => {
                return FightResult {
                    won: status == CombatStatus::Victory,
                    turns: outcome.turn,
                    remaining_hp: player.current_hp,
                }
            }
        }
    }
    FightResult {
        turns: session.turn_count,
        ..lost
    }
}

/// Run Monte-Carlo balance simulation with rayon parallelism
pub fn run_balance_simulation(catalog: Arc<Catalog>, config: &SimConfig) -> BalanceReport {
    let pairings: Vec<(String, String)> = catalog
        .characters
        .keys()
        .flat_map(|c| catalog.enemy_types().map(move |e| (c.clone(), e.to_string())))
        .collect();

    let reports: Vec<PairingReport> = pairings
        .par_iter()
        .map(|(character, enemy_type)| {
            let results: Vec<FightResult> = (0..config.fights_per_pairing)
                .into_par_iter()
                .map(|i| {
                    let seed = fight_seed(config.base_seed, character, enemy_type, i);
                    simulate_fight(&catalog, config, character, enemy_type, seed)
                })
                .collect();
            summarize(character, enemy_type, &results)
        })
        .collect();

    analyze_results(reports, config.fights_per_pairing)
}

fn summarize(character: &str, enemy_type: &str, results: &[FightResult]) -> PairingReport {
    let fights = results.len() as u32;
    let wins: Vec<&FightResult> = results.iter().filter(|r| r.won).collect();
    let avg = |sum: f64, n: usize| if n == 0 { 0.0 } else { sum / n as f64 };

    PairingReport {
        character: character.into(),
        enemy_type: enemy_type.into(),
        fights,
        wins: wins.len() as u32,
        win_rate: avg(wins.len() as f64, results.len()),
        avg_turns: avg(results.iter().map(|r| r.turns as f64).sum(), results.len()),
        avg_remaining_hp: avg(wins.iter().map(|r| r.remaining_hp as f64).sum(), wins.len()),
    }
}

fn analyze_results(pairings: Vec<PairingReport>, fights_per_pairing: u32) -> BalanceReport {
    let mut enemy_types: Vec<&str> = pairings.iter().map(|p| p.enemy_type.as_str()).collect();
    enemy_types.sort_unstable();
    enemy_types.dedup();

    let spreads: Vec<f64> = enemy_types
        .iter()
        .map(|enemy| {
            let rates = pairings
                .iter()
                .filter(|p| p.enemy_type == *enemy)
                .map(|p| p.win_rate);
            let (min, max) = rates.fold((f64::MAX, f64::MIN), |(lo, hi), r| (lo.min(r), hi.max(r)));
            max - min
        })
        .collect();
    let spread = if spreads.is_empty() {
        0.0
    } else {
        spreads.iter().sum::<f64>() / spreads.len() as f64
    };

    BalanceReport {
        total_fights: pairings.len() as u64 * fights_per_pairing as u64,
        pairings,
        win_rate_spread: spread,
        balance_grade: BalanceGrade::from_spread(spread),
    }
}
