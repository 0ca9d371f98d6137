//! Table sizing for a `Store`.

use crate::error::ConfigError;
use crate::hash::next_power_of_two_capacity;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHARD_COUNT: usize = 1 << 16;
pub const DEFAULT_LOCK_SLOTS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Requested dictionary shards; rounded up to a power of two, at least 16.
    pub shard_count: usize,
    /// Lock table size; must be a non-zero power of two.
    pub lock_slots: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            lock_slots: DEFAULT_LOCK_SLOTS,
        }
    }
}

impl Config {
    pub fn with_shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    pub fn with_lock_slots(mut self, lock_slots: usize) -> Self {
        self.lock_slots = lock_slots;
        self
    }

    /// Shard count the dictionary will actually allocate.
    pub fn effective_shard_count(&self) -> usize {
        next_power_of_two_capacity(self.shard_count)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_slots == 0 {
            return Err(ConfigError::ZeroLockSlots);
        }
        if self.lock_slots > u32::MAX as usize {
            return Err(ConfigError::TableTooLarge(self.lock_slots));
        }
        if !self.lock_slots.is_power_of_two() {
            return Err(ConfigError::LockSlotsNotPowerOfTwo(self.lock_slots));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let c = Config::default();
        assert_eq!(c.validate(), Ok(()));
        assert_eq!(c.effective_shard_count(), DEFAULT_SHARD_COUNT);
    }

    #[test]
    fn rejects_bad_lock_tables() {
        let c = Config::default().with_lock_slots(0);
        assert_eq!(c.validate(), Err(ConfigError::ZeroLockSlots));
        let c = Config::default().with_lock_slots(1000);
        assert_eq!(c.validate(), Err(ConfigError::LockSlotsNotPowerOfTwo(1000)));
    }

    #[test]
    fn shard_count_is_rounded_not_rejected() {
        let c = Config::default().with_shard_count(3).with_lock_slots(16);
        assert_eq!(c.validate(), Ok(()));
        assert_eq!(c.effective_shard_count(), 16);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_fields_take_defaults() {
        let c: Config = serde_json::from_str(r#"{"lock_slots": 64}"#).unwrap();
        assert_eq!(c.lock_slots, 64);
        assert_eq!(c.shard_count, DEFAULT_SHARD_COUNT);
    }
}
