//! Store: one `ConcurrentDict` paired with one `LockManager`.
//!
//! Single-key commands go straight to the dictionary. Commands spanning
//! several keys run inside `with_keys`, which holds the lock-manager slots for
//! those keys for the whole closure and releases them on every exit path.

use crate::config::Config;
use crate::dict::ConcurrentDict;
use crate::error::ConfigError;
use crate::lock::LockManager;
use tracing::debug;

pub struct Store<V> {
    dict: ConcurrentDict<V>,
    locks: LockManager,
}

impl<V> Store<V> {
    /// Dictionary and lock table of the same power-of-two size.
    pub fn new(shard_count: usize) -> Self {
        let dict = ConcurrentDict::new(shard_count);
        let locks = LockManager::new(dict.shard_count());
        Self { dict, locks }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let dict = ConcurrentDict::new(config.shard_count);
        let locks = LockManager::new(config.lock_slots);
        debug!(
            shards = dict.shard_count(),
            lock_slots = locks.slot_count(),
            "store created"
        );
        Ok(Self { dict, locks })
    }

    pub fn dict(&self) -> &ConcurrentDict<V> {
        &self.dict
    }

    pub fn locks(&self) -> &LockManager {
        &self.locks
    }

    /// Run `f` while `write_keys` are locked exclusively and `read_keys` shared.
    ///
    /// The slots are released when `f` returns or unwinds. `f` must not take
    /// further lock-manager slots itself.
    pub fn with_keys<W, R, T, F>(&self, write_keys: &[W], read_keys: &[R], f: F) -> T
    where
        W: AsRef<[u8]>,
        R: AsRef<[u8]>,
        F: FnOnce(&ConcurrentDict<V>) -> T,
    {
        let _guard = self.locks.rw_locks(write_keys, read_keys);
        f(&self.dict)
    }

    /// Run `f` while `key` is locked exclusively.
    pub fn with_key<Q, T, F>(&self, key: &Q, f: F) -> T
    where
        Q: AsRef<[u8]> + ?Sized,
        F: FnOnce(&ConcurrentDict<V>) -> T,
    {
        let _guard = self.locks.lock(key);
        f(&self.dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keeps_tables_the_same_size() {
        let s: Store<u8> = Store::new(100);
        assert_eq!(s.dict().shard_count(), 128);
        assert_eq!(s.locks().slot_count(), 128);
    }

    #[test]
    fn from_config_validates() {
        let bad = Config::default().with_lock_slots(12);
        assert!(matches!(
            Store::<u8>::from_config(&bad),
            Err(ConfigError::LockSlotsNotPowerOfTwo(12))
        ));
        let s = Store::<u8>::from_config(&Config::default().with_shard_count(20).with_lock_slots(8))
            .unwrap();
        assert_eq!(s.dict().shard_count(), 32);
        assert_eq!(s.locks().slot_count(), 8);
    }

    /// Rename-style multi-key update: both keys change under one acquisition.
    #[test]
    fn with_keys_runs_closure_and_releases() {
        let s = Store::new(16);
        s.dict().put("src", 5);
        let moved = s.with_keys(&["src", "dst"], &[] as &[&str], |d| {
            let v = d.remove("src")?;
            d.put("dst", v);
            Some(v)
        });
        assert_eq!(moved, Some(5));
        assert_eq!(s.dict().get("dst"), Some(5));
        assert!(s.locks().try_lock("src").is_some());
        assert!(s.locks().try_lock("dst").is_some());
    }

    /// A panicking closure still releases its slots.
    #[test]
    fn with_keys_releases_on_panic() {
        use std::panic::{catch_unwind, AssertUnwindSafe};
        let s: Store<i32> = Store::new(16);
        let res = catch_unwind(AssertUnwindSafe(|| {
            s.with_keys(&["a"], &["b"], |_| panic!("boom"));
        }));
        assert!(res.is_err());
        assert!(s.locks().try_lock("a").is_some());
        assert!(s.locks().try_lock("b").is_some());
    }

    #[test]
    fn with_key_holds_single_slot() {
        let s = Store::new(16);
        let n = s.with_key("counter", |d| {
            assert!(s.locks().try_lock("counter").is_none());
            let next = d.get("counter").unwrap_or(0) + 1;
            d.put("counter", next);
            next
        });
        assert_eq!(n, 1);
        assert!(s.locks().try_lock("counter").is_some());
    }
}
