//! Timed damage modifiers on a player.
//!
//! Expiry is lazy: nothing ticks buffs down. A buff whose expiry is at or
//! before `now` is dropped the next time it is read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::clock::{secs_to_duration, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffKind {
    /// Fraction of incoming damage removed
    DamageReduction,
    /// Multiplier on outgoing damage
    DamageBoost,
}

impl BuffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DamageReduction => "damage_reduction",
            Self::DamageBoost => "damage_boost",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub value: f64,
    pub expires_at: Timestamp,
}

impl ActiveBuff {
    pub fn is_active(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuffs {
    entries: BTreeMap<BuffKind, ActiveBuff>,
}

impl ActiveBuffs {
    /// Register a buff, overwriting any buff of the same kind
    pub fn insert(&mut self, kind: BuffKind, value: f64, duration_secs: f64, now: Timestamp) {
        self.entries.insert(
            kind,
            ActiveBuff {
                value,
                expires_at: now + secs_to_duration(duration_secs),
            },
        );
    }

    /// Value of an active buff, dropping it if it has expired
    pub fn get(&mut self, kind: BuffKind, now: Timestamp) -> Option<f64> {
        match self.entries.get(&kind) {
            Some(buff) if buff.is_active(now) => Some(buff.value),
            Some(_) => {
                self.entries.remove(&kind);
                None
            }
            None => None,
        }
    }

    /// All active buffs after dropping the expired ones
    pub fn active(&mut self, now: Timestamp) -> BTreeMap<BuffKind, ActiveBuff> {
        self.entries.retain(|_, buff| buff.is_active(now));
        self.entries.clone()
    }

    /// Active buffs without pruning, for read-only views
    pub fn snapshot(&self, now: Timestamp) -> BTreeMap<BuffKind, ActiveBuff> {
        self.entries
            .iter()
            .filter(|(_, buff)| buff.is_active(now))
            .map(|(kind, buff)| (*kind, *buff))
            .collect()
    }

    /// Entries still held, including expired ones not yet read
    pub fn stored_len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};

    #[test]
    fn test_buff_active_until_expiry() {
        let clock = ManualClock::at_epoch();
        let mut buffs = ActiveBuffs::default();
        buffs.insert(BuffKind::DamageBoost, 1.5, 4.0, clock.now());

        clock.advance_secs(3.9);
        assert_eq!(buffs.get(BuffKind::DamageBoost, clock.now()), Some(1.5));

        clock.advance_secs(0.1);
        assert_eq!(buffs.get(BuffKind::DamageBoost, clock.now()), None);
        assert_eq!(buffs.stored_len(), 0, "expired buff removed on read");
    }

    #[test]
    fn test_expired_buff_kept_until_read() {
        let clock = ManualClock::at_epoch();
        let mut buffs = ActiveBuffs::default();
        buffs.insert(BuffKind::DamageReduction, 0.5, 1.0, clock.now());
        clock.advance_secs(5.0);
        assert_eq!(buffs.stored_len(), 1);
        assert!(buffs.active(clock.now()).is_empty());
        assert_eq!(buffs.stored_len(), 0);
    }

    #[test]
    fn test_reinsert_overwrites() {
        let clock = ManualClock::at_epoch();
        let mut buffs = ActiveBuffs::default();
        buffs.insert(BuffKind::DamageReduction, 0.5, 3.0, clock.now());
        clock.advance_secs(2.0);
        buffs.insert(BuffKind::DamageReduction, 0.7, 3.0, clock.now());

        clock.advance_secs(2.0);
        assert_eq!(buffs.get(BuffKind::DamageReduction, clock.now()), Some(0.7));
        assert_eq!(buffs.stored_len(), 1);
    }
}
