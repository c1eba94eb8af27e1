//! GeoQuest simulator
//!
//! Runs fights and balance sweeps against the game engine from the command
//! line and prints JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use geoquest_core::balance::{run_balance_simulation, SimConfig};
use geoquest_core::combat::CombatStatus;
use geoquest_core::engine::{CombatAction, EngineConfig, GameEngine};
use geoquest_core::logging::{init_tracing, LogLevel};

/// GeoQuest combat simulator
#[derive(Parser, Debug)]
#[command(name = "geoquest-sim")]
#[command(author, version, about = "Simulate GeoQuest fights", long_about = None)]
struct Args {
    /// Engine config file (JSON)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long = "log-level")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fight one enemy with basic attacks and print the turn log
    Encounter {
        /// Character class (e.g. Volta, Kidlat)
        #[arg(long = "character")]
        character: String,

        /// Enemy type (e.g. class1)
        #[arg(long = "enemy")]
        enemy: String,

        /// Skill to open the fight with
        #[arg(long = "skill")]
        skill: Option<String>,

        #[arg(long = "seed")]
        seed: Option<u64>,

        /// Give up after this many turns
        #[arg(long = "max-turns", default_value_t = 100)]
        max_turns: u32,
    },

    /// Monte-Carlo fights for every character against every enemy
    Balance {
        #[arg(long = "fights", default_value_t = 1_000)]
        fights: u32,

        #[arg(long = "seed", default_value_t = 42)]
        seed: u64,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn encounter(
    mut config: EngineConfig,
    character: &str,
    enemy: &str,
    skill: Option<&str>,
    seed: Option<u64>,
    max_turns: u32,
) -> Result<()> {
    if seed.is_some() {
        config.rng_seed = seed;
    }
    let engine = GameEngine::from_config(config).context("invalid engine config")?;

    engine.create_player("sim", character)?;
    engine.engage("sim", enemy)?;

    let mut reports = Vec::new();
    if let Some(skill) = skill {
        reports.push(engine.combat_turn("sim", CombatAction::Skill(skill.to_string()))?);
    }
    while engine.get_combat("sim").is_some() {
        if reports.len() as u32 >= max_turns {
            engine.end_combat("sim")?;
            bail!("fight did not finish within {max_turns} turns");
        }
        reports.push(engine.combat_turn("sim", CombatAction::Attack)?);
    }

    let status = reports.last().map(|r| r.status).unwrap_or(CombatStatus::Active);
    let summary = serde_json::json!({
        "character": character,
        "enemy": enemy,
        "status": status,
        "turns": reports,
        "player": engine.player_state("sim")?,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn balance(config: EngineConfig, fights: u32, seed: u64) -> Result<()> {
    let catalog = config.load_catalog().context("failed to load catalog")?;
    let sim = SimConfig {
        fights_per_pairing: fights,
        base_seed: seed,
        rules: config.combat,
        ..SimConfig::default()
    };
    let report = run_balance_simulation(Arc::new(catalog), &sim);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    let logging = match args.log_level {
        Some(level) => config.logging.clone().with_level(level),
        None => config.logging.clone(),
    };
    init_tracing(&logging);

    match args.command {
        Command::Encounter {
            character,
            enemy,
            skill,
            seed,
            max_turns,
        } => encounter(config, &character, &enemy, skill.as_deref(), seed, max_turns),
        Command::Balance { fights, seed } => balance(config, fights, seed),
    }
}
