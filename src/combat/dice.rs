//! Randomness used by combat and spawning.
//!
//! Everything random in a fight goes through [`Dice`], so a seeded engine
//! replays the same fight and tests can pin every roll.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub trait Dice: Send {
    /// True with probability `probability`
    fn chance(&mut self, probability: f64) -> bool;
    /// Uniform integer in `[-spread, spread]`
    fn jitter(&mut self, spread: i32) -> i32;
    /// Uniform float in `[0, 1)`
    fn unit(&mut self) -> f64;
}

/// Xoshiro-backed dice; seeded for replays, entropy-seeded otherwise
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: Xoshiro256PlusPlus,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Xoshiro256PlusPlus::from_entropy(),
        }
    }

    pub fn from_seed_opt(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::new)
    }
}

impl Dice for SeededDice {
    fn chance(&mut self, probability: f64) -> bool {
        if probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.rng.gen_bool(probability)
    }

    fn jitter(&mut self, spread: i32) -> i32 {
        let spread = spread.abs();
        self.rng.gen_range(-spread..=spread)
    }

    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Dice that always roll the same value.
///
/// `chance(p)` succeeds when `roll < p`, so a roll of `1.0` never dodges or
/// crits and a roll of `0.0` triggers every non-zero chance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDice {
    pub roll: f64,
    pub jitter: i32,
}

impl FixedDice {
    pub fn new(roll: f64, jitter: i32) -> Self {
        Self { roll, jitter }
    }

    /// No dodge, no crit, no jitter
    pub fn neutral() -> Self {
        Self::new(1.0, 0)
    }
}

impl Dice for FixedDice {
    fn chance(&mut self, probability: f64) -> bool {
        self.roll < probability
    }

    fn jitter(&mut self, spread: i32) -> i32 {
        let spread = spread.abs();
        self.jitter.clamp(-spread, spread)
    }

    fn unit(&mut self) -> f64 {
        self.roll.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
