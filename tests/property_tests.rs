//! Property-based tests using proptest
//!
//! Invariants that must hold for ALL inputs:
//! - HP stays within [0, max] under any damage/heal sequence
//! - Level is always 1 + xp / 100 and never decreases
//! - Skill levels never exceed their max level
//! - Upgrades trade exactly one point for one level, or change nothing
//! - Buffs expire at their deadline and re-registration overwrites
//! - Any seeded fight ends consistently and never leaves HP out of range

use proptest::prelude::*;
use std::sync::Arc;

use geoquest_core::catalog::Catalog;
use geoquest_core::clock::{Clock, ManualClock};
use geoquest_core::constants::MAX_XP;
use geoquest_core::combat::{
    CombatEngine, CombatRules, CombatSession, CombatStatus, Enemy, SeededDice,
};
use geoquest_core::player::{level_for_xp, BuffKind, Player};
use geoquest_core::progression::{ProgressionEngine, ProgressionRules};
use geoquest_core::GameError;

const CLASSES: [&str; 5] = [
    "Volta",
    "Pedro Penduko",
    "Kidlat",
    "Victor Magtanggol",
    "WanPakMan",
];
const ENEMIES: [&str; 3] = ["class1", "class2", "class3"];

fn new_player(catalog: &Catalog, class: &str) -> Player {
    let clock = ManualClock::at_epoch();
    Player::new(
        "prop",
        class,
        catalog.character(class).unwrap(),
        catalog.enemy_types(),
        clock.now(),
    )
}

fn progression(catalog: &Arc<Catalog>) -> ProgressionEngine {
    ProgressionEngine::new(Arc::clone(catalog), ProgressionRules::default())
}

#[derive(Debug, Clone)]
enum HpOp {
    Damage(u32),
    Heal(u32),
}

fn hp_op() -> impl Strategy<Value = HpOp> {
    prop_oneof![
        (0u32..500).prop_map(HpOp::Damage),
        (0u32..500).prop_map(HpOp::Heal),
    ]
}

// ============================================================
// HP
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_player_hp_stays_in_range(
        class_idx in 0usize..CLASSES.len(),
        ops in prop::collection::vec(hp_op(), 0..40),
    ) {
        let catalog = Catalog::builtin();
        let mut player = new_player(&catalog, CLASSES[class_idx]);
        for op in ops {
            let before = player.current_hp;
            match op {
                HpOp::Damage(n) => {
                    let removed = player.take_damage(n);
                    prop_assert_eq!(player.current_hp, before - removed);
                }
                HpOp::Heal(n) => {
                    let restored = player.heal(n);
                    prop_assert_eq!(player.current_hp, before + restored);
                }
            }
            prop_assert!(player.current_hp <= player.max_hp);
        }
    }

    #[test]
    fn prop_enemy_hp_stays_in_range(
        enemy_idx in 0usize..ENEMIES.len(),
        hits in prop::collection::vec(0u32..200, 0..20),
    ) {
        let catalog = Catalog::builtin();
        let clock = ManualClock::at_epoch();
        let kind = ENEMIES[enemy_idx];
        let mut enemy = Enemy::from_type(kind, catalog.enemy(kind).unwrap(), clock.now(), None);
        for hit in hits {
            enemy.take_damage(hit);
            prop_assert!(enemy.current_hp <= enemy.max_hp);
            prop_assert_eq!(enemy.is_defeated(), enemy.current_hp == 0);
            let pct = enemy.health_percent();
            prop_assert!((0.0..=100.0).contains(&pct));
        }
    }
}

// ============================================================
// XP & levels
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_level_tracks_xp(awards in prop::collection::vec(0u64..1_000, 1..30)) {
        let catalog = Arc::new(Catalog::builtin());
        let engine = progression(&catalog);
        let mut player = new_player(&catalog, "Volta");

        let mut last_level = player.level();
        for amount in awards {
            let result = engine.award_xp(&mut player, amount);
            prop_assert_eq!(player.level() as u64, 1 + player.xp() / 100);
            prop_assert_eq!(result.level, player.level());
            prop_assert!(player.level() >= last_level);
            prop_assert_eq!(result.leveled_up, player.level() > last_level);
            last_level = player.level();
        }
    }

    #[test]
    fn prop_level_for_xp_formula(xp in 0u64..=MAX_XP) {
        prop_assert_eq!(level_for_xp(xp) as u64, 1 + xp / 100);
    }

    #[test]
    fn prop_huge_awards_keep_level_formula(
        awards in prop::collection::vec(prop_oneof![0u64..1_000, any::<u64>()], 1..10),
    ) {
        let catalog = Arc::new(Catalog::builtin());
        let engine = progression(&catalog);
        let mut player = new_player(&catalog, "Kidlat");

        for amount in awards {
            let before = player.xp();
            let result = engine.award_xp(&mut player, amount);
            prop_assert!(player.xp() <= MAX_XP);
            prop_assert_eq!(player.level() as u64, 1 + player.xp() / 100);
            prop_assert_eq!(result.xp_gained, player.xp() - before);
        }
    }
}

// ============================================================
// Skill upgrades
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_upgrades_respect_max_and_conserve_points(
        class_idx in 0usize..CLASSES.len(),
        points in 0u32..20,
        picks in prop::collection::vec(0usize..4, 0..30),
    ) {
        let catalog = Arc::new(Catalog::builtin());
        let engine = progression(&catalog);
        let class = CLASSES[class_idx];
        let mut player = new_player(&catalog, class);
        player.skill_points = points;

        let mut names: Vec<String> = catalog
            .character(class)
            .unwrap()
            .skills
            .iter()
            .map(|s| s.name.clone())
            .collect();
        names.push("No Such Skill".to_string());

        for pick in picks {
            let name = &names[pick % names.len()];
            let points_before = player.skill_points;
            let level_before = player.skill_level(name);

            match engine.upgrade_skill(&mut player, name) {
                Ok(result) => {
                    prop_assert_eq!(player.skill_points, points_before - 1);
                    prop_assert_eq!(player.skill_level(name), level_before + 1);
                    prop_assert_eq!(result.new_level, level_before + 1);
                    prop_assert!(result.new_level <= result.max_level);
                }
                Err(err) => {
                    prop_assert_eq!(player.skill_points, points_before);
                    prop_assert_eq!(player.skill_level(name), level_before);
                    if let GameError::MaxLevelReached { max_level, .. } = err {
                        prop_assert_eq!(level_before, max_level);
                    }
                }
            }

            for skill in &catalog.character(class).unwrap().skills {
                if let Some(max) = skill.max_level(&catalog.upgrades) {
                    prop_assert!(player.skill_level(&skill.name) <= max);
                }
            }
        }
    }
}

// ============================================================
// Buffs
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_buff_expires_at_deadline(
        value in 0.0f64..1.0,
        duration in 0.5f64..30.0,
        elapsed in 0.0f64..60.0,
    ) {
        let clock = ManualClock::at_epoch();
        let catalog = Catalog::builtin();
        let mut player = new_player(&catalog, "Pedro Penduko");

        player.buffs.insert(BuffKind::DamageReduction, value, duration, clock.now());
        clock.advance_secs(elapsed);
        let read = player.buffs.get(BuffKind::DamageReduction, clock.now());

        if elapsed + 1e-3 < duration {
            prop_assert_eq!(read, Some(value));
        } else if elapsed > duration + 1e-3 {
            prop_assert_eq!(read, None);
            // once read as expired it stays gone
            prop_assert_eq!(player.buffs.get(BuffKind::DamageReduction, clock.now()), None);
        }
    }

    #[test]
    fn prop_reregistering_overwrites(
        first in 1.0f64..3.0,
        second in 1.0f64..3.0,
        first_duration in 1.0f64..10.0,
        second_duration in 1.0f64..10.0,
        gap in 0.0f64..0.9,
    ) {
        let clock = ManualClock::at_epoch();
        let catalog = Catalog::builtin();
        let mut player = new_player(&catalog, "Victor Magtanggol");

        player.buffs.insert(BuffKind::DamageBoost, first, first_duration, clock.now());
        clock.advance_secs(gap);
        player.buffs.insert(BuffKind::DamageBoost, second, second_duration, clock.now());

        prop_assert_eq!(player.buffs.get(BuffKind::DamageBoost, clock.now()), Some(second));
        prop_assert_eq!(player.buffs.stored_len(), 1);

        clock.advance_secs(second_duration + 0.01);
        prop_assert_eq!(player.buffs.get(BuffKind::DamageBoost, clock.now()), None);
    }
}

// ============================================================
// Seeded fights
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_fights_end_consistently(
        seed in any::<u64>(),
        class_idx in 0usize..CLASSES.len(),
        enemy_idx in 0usize..ENEMIES.len(),
    ) {
        let catalog = Arc::new(Catalog::builtin());
        let combat = CombatEngine::new(
            Arc::clone(&catalog),
            CombatRules::default(),
            progression(&catalog),
            Box::new(SeededDice::new(seed)),
        );
        let clock = ManualClock::at_epoch();
        let mut player = new_player(&catalog, CLASSES[class_idx]);
        let kind = ENEMIES[enemy_idx];
        let enemy = Enemy::from_type(kind, catalog.enemy(kind).unwrap(), clock.now(), None);
        let mut session = CombatSession::new("prop", enemy, clock.now());

        let mut status = CombatStatus::Active;
        for _ in 0..500 {
            let outcome = combat.process_turn(&mut session, &mut player, clock.now());
            prop_assert!(player.current_hp <= player.max_hp);
            prop_assert!(session.enemy.current_hp <= session.enemy.max_hp);
            prop_assert_eq!(outcome.player_hp, player.current_hp);
            prop_assert_eq!(outcome.enemy_hp, session.enemy.current_hp);
            status = outcome.status;
            if status.is_terminal() {
                break;
            }
        }

        match status {
            CombatStatus::Victory => {
                prop_assert_eq!(session.enemy.current_hp, 0);
                prop_assert_eq!(player.total_kills(), 1);
            }
            CombatStatus::Defeat => {
                prop_assert_eq!(player.current_hp, 0);
                prop_assert!(session.enemy.current_hp > 0);
                prop_assert_eq!(player.total_kills(), 0);
            }
            CombatStatus::Active => {
                prop_assert!(player.current_hp > 0 && session.enemy.current_hp > 0);
            }
            CombatStatus::Escaped => prop_assert!(false, "basic attacks never escape"),
        }
    }
}
