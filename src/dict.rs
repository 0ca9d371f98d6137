//! ConcurrentDict: a fixed array of independently locked shards.
//!
//! Each shard owns a plain `hashbrown::HashMap` behind a `parking_lot::RwLock`.
//! Reads take the shared lock, mutations take the exclusive lock, and nothing
//! but constant-time map work runs while a shard lock is held.
//!
//! Size accounting
//! - `count` is a single atomic shared by all shards. `put`/`remove` update it
//!   inside the same critical section as the map mutation, so with no mutation
//!   in flight it equals the sum of the shard sizes.
//! - `len()` loads it without taking any shard lock. It reflects every
//!   mutation that has completed, but is not coordinated with operations still
//!   running on other shards.

use crate::hash::{fnv32, next_power_of_two_capacity, spread};
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

struct Shard<V> {
    map: RwLock<HashMap<Vec<u8>, V>>,
}

impl<V> Shard<V> {
    fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
        }
    }
}

pub struct ConcurrentDict<V> {
    table: Box<[Shard<V>]>,
    count: AtomicUsize,
}

impl<V> ConcurrentDict<V> {
    /// Build a dictionary with `shard_count` rounded up to a power of two (at least 16).
    pub fn new(shard_count: usize) -> Self {
        let effective = next_power_of_two_capacity(shard_count);
        let table: Box<[Shard<V>]> = std::iter::repeat_with(Shard::new).take(effective).collect();
        debug!(
            requested = shard_count,
            shards = effective,
            "concurrent dict created"
        );
        Self {
            table,
            count: AtomicUsize::new(0),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.table.len()
    }

    #[inline]
    fn shard_index(&self, key: &[u8]) -> usize {
        spread(fnv32(key), self.table.len() as u32) as usize
    }

    #[inline]
    fn shard(&self, key: &[u8]) -> &Shard<V> {
        &self.table[self.shard_index(key)]
    }

    /// Number of keys across all shards. Eventually consistent; see module docs.
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up `key` and clone its value.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        Q: AsRef<[u8]> + ?Sized,
        V: Clone,
    {
        self.get_with(key, V::clone)
    }

    /// Run `f` on the value stored under `key` while the shard is read-locked.
    ///
    /// `f` must not call back into this dictionary for a key on the same shard
    /// with a mutating operation; that would deadlock.
    pub fn get_with<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        Q: AsRef<[u8]> + ?Sized,
        F: FnOnce(&V) -> R,
    {
        let key = key.as_ref();
        let map = self.shard(key).map.read();
        map.get(key).map(f)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let key = key.as_ref();
        self.shard(key).map.read().contains_key(key)
    }

    /// Insert or overwrite. Returns `true` if the key was not present before.
    pub fn put(&self, key: impl Into<Vec<u8>>, value: V) -> bool {
        let key = key.into();
        let mut map = self.shard(&key).map.write();
        match map.entry(key) {
            Entry::Occupied(mut e) => {
                e.insert(value);
                false
            }
            Entry::Vacant(e) => {
                e.insert(value);
                self.count.fetch_add(1, Ordering::Relaxed);
                true
            }
        }
    }

    /// Insert only if `key` is absent. Returns `true` if inserted.
    pub fn put_if_absent(&self, key: impl Into<Vec<u8>>, value: V) -> bool {
        let key = key.into();
        let mut map = self.shard(&key).map.write();
        match map.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(e) => {
                e.insert(value);
                self.count.fetch_add(1, Ordering::Relaxed);
                true
            }
        }
    }

    /// Overwrite only if `key` is present. Returns `true` if updated.
    pub fn put_if_exists<Q>(&self, key: &Q, value: V) -> bool
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let key = key.as_ref();
        let mut map = self.shard(key).map.write();
        match map.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let key = key.as_ref();
        let mut map = self.shard(key).map.write();
        let removed = map.remove(key);
        if removed.is_some() {
            self.count.fetch_sub(1, Ordering::Relaxed);
        }
        removed
    }

    /// Visit entries shard by shard in ascending shard order. Stops when `f`
    /// returns `false`.
    ///
    /// Each shard is read-locked only while it is visited, so the walk is not a
    /// snapshot of the whole dictionary.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&[u8], &V) -> bool,
    {
        for shard in self.table.iter() {
            let map = shard.map.read();
            for (k, v) in map.iter() {
                if !f(k, v) {
                    return;
                }
            }
        }
    }

    pub fn keys(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::with_capacity(self.len());
        self.for_each(|k, _| {
            out.push(k.to_vec());
            true
        });
        out
    }

    /// Remove every entry, one shard at a time.
    pub fn clear(&self) {
        for shard in self.table.iter() {
            let mut map = shard.map.write();
            let n = map.len();
            if n > 0 {
                map.clear();
                self.count.fetch_sub(n, Ordering::Relaxed);
            }
        }
    }
}
