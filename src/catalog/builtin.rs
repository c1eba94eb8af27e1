//! Built-in game content: characters, skills, enemies and upgrade rules.

use std::collections::BTreeMap;

use super::skills::{Poison, Skill, SkillEffect, UpgradeRule, UpgradeRules, UpgradeStat};
use super::{CharacterClass, EnemyType};

pub fn upgrade_rules() -> UpgradeRules {
    let rule = |increment_per_level: f64, max_level: u32| UpgradeRule {
        increment_per_level,
        max_level,
    };
    BTreeMap::from([
        (UpgradeStat::DamageMultiplier, rule(0.3, 5)),
        (UpgradeStat::Damage, rule(8.0, 5)),
        (UpgradeStat::HealAmount, rule(15.0, 5)),
        (UpgradeStat::DamageReduction, rule(0.1, 3)),
        (UpgradeStat::DamageBoost, rule(0.2, 3)),
        (UpgradeStat::PoisonDamage, rule(3.0, 4)),
        (UpgradeStat::Duration, rule(1.0, 3)),
    ])
}

pub fn enemies() -> BTreeMap<String, EnemyType> {
    let enemy = |name: &str, max_hp: u32, attack: u32, xp_reward: u64| EnemyType {
        name: name.into(),
        max_hp,
        attack,
        xp_reward,
    };
    BTreeMap::from([
        ("class1".to_string(), enemy("Goblin", 30, 5, 10)),
        ("class2".to_string(), enemy("Orc", 50, 10, 25)),
        ("class3".to_string(), enemy("Dragon", 100, 15, 50)),
    ])
}

fn multiplier(multiplier: f64) -> SkillEffect {
    SkillEffect::DamageMultiplier { multiplier }
}

fn damage(amount: f64) -> SkillEffect {
    SkillEffect::Damage {
        amount,
        poison: None,
    }
}

fn heal(amount: f64) -> SkillEffect {
    SkillEffect::Heal { amount }
}

pub fn characters() -> BTreeMap<String, CharacterClass> {
    let volta = CharacterClass {
        max_hp: 120,
        attack: 15,
        archetype: "warrior".into(),
        skills: vec![
            Skill::new("Electrokinesis", 10.0, "Double damage attack", multiplier(2.0)),
            Skill::new("Tanging Ina SMASH", 8.0, "Stun enemy for 1 turn", damage(15.0)),
            Skill::new("Battle Heal", 15.0, "Restore 40 HP", heal(40.0)),
        ],
    };

    let pedro = CharacterClass {
        max_hp: 80,
        attack: 25,
        archetype: "mage".into(),
        skills: vec![
            Skill::new("Fireball", 12.0, "Powerful magic attack", multiplier(2.5)),
            Skill::new("Arcane Missiles", 10.0, "Multiple magic projectiles", damage(35.0)),
            Skill::new(
                "Mutya",
                20.0,
                "Reduce damage by 50% for 3 turns",
                SkillEffect::DamageReduction {
                    reduction: 0.5,
                    duration: Some(3.0),
                },
            ),
        ],
    };

    let kidlat = CharacterClass {
        max_hp: 100,
        attack: 18,
        archetype: "archer".into(),
        skills: vec![
            Skill::new("Thunder Bolt", 8.0, "High accuracy attack", multiplier(1.8)),
            Skill::new("Anti-Bastos", 15.0, "Area damage attack", damage(30.0)),
            Skill::new("Perfect Storm", 12.0, "Restore 35 HP", heal(35.0)),
        ],
    };

    let victor = CharacterClass {
        max_hp: 110,
        attack: 12,
        archetype: "healer".into(),
        skills: vec![
            Skill::new("aldenkantotmaine", 10.0, "Holy damage attack", damage(25.0)),
            Skill::new("ALDUB 4Ever", 15.0, "Restore 60 HP", heal(60.0)),
            Skill::new(
                "Pabebe Wave",
                25.0,
                "Increase damage by 50% for 4 turns",
                SkillEffect::DamageBoost {
                    boost: 1.5,
                    duration: Some(4.0),
                },
            ),
        ],
    };

    let wanpakman = CharacterClass {
        max_hp: 90,
        attack: 20,
        archetype: "rogue".into(),
        skills: vec![
            Skill::new("Asim Kilig", 15.0, "Critical strike from behind", multiplier(3.0)),
            Skill::new(
                "Figthing Senator",
                12.0,
                "Attack with poison damage over 3 turns",
                SkillEffect::Damage {
                    amount: 20.0,
                    poison: Some(Poison {
                        damage: 5.0,
                        duration: 3.0,
                    }),
                },
            ),
            Skill::new("Go Manny", 10.0, "Restore 30 HP", heal(30.0)),
        ],
    };

    BTreeMap::from([
        ("Volta".to_string(), volta),
        ("Pedro Penduko".to_string(), pedro),
        ("Kidlat".to_string(), kidlat),
        ("Victor Magtanggol".to_string(), victor),
        ("WanPakMan".to_string(), wanpakman),
    ])
}
