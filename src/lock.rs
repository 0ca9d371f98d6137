//! LockManager: striped reader/writer locks addressed by key.
//!
//! A key's slot is `spread(fnv32(key), slot_count)`, the same mapping
//! `ConcurrentDict` uses for shards. The table holds no data; it serializes
//! access to whatever the key names outside of it.
//!
//! Deadlock freedom
//! - Multi-key acquisition collapses the keys to a set of slot indices and
//!   always takes them in ascending numeric order. Every caller uses the same
//!   total order, so no cycle can form in the wait-for graph.
//! - Duplicate slots are taken once. Locks are not reentrant, so asking for
//!   the same slot twice in one call would block on itself.
//! - A slot named by both a write key and a read key is taken exclusively.
//!
//! Release goes through guards. `rw_locks` returns a `MultiLockGuard` holding
//! exactly the slots and modes it acquired; dropping it (or passing it to
//! `rw_unlocks`) releases them in the same ascending order.

use crate::error::LockError;
use crate::hash::{fnv32, spread};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace, warn};

pub struct LockManager {
    table: Box<[RwLock<()>]>,
}

/// One held slot, shared or exclusive.
enum Held<'a> {
    Shared(RwLockReadGuard<'a, ()>),
    Exclusive(RwLockWriteGuard<'a, ()>),
}

impl Held<'_> {
    fn is_exclusive(&self) -> bool {
        matches!(self, Held::Exclusive(_))
    }
}

/// A single slot held through `lock`, `read_lock` or `try_lock`.
#[must_use = "the slot is released as soon as the guard is dropped"]
pub struct SlotGuard<'a> {
    owner: &'a LockManager,
    index: u32,
    held: Held<'a>,
}

impl SlotGuard<'_> {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_exclusive(&self) -> bool {
        self.held.is_exclusive()
    }
}

/// Slots held by one `rw_locks` call, in ascending index order.
#[must_use = "the slots are released as soon as the guard is dropped"]
pub struct MultiLockGuard<'a> {
    owner: &'a LockManager,
    // Vec drops front to back, so release order is ascending too.
    held: Vec<(u32, Held<'a>)>,
}

impl MultiLockGuard<'_> {
    /// Indices held by this guard, ascending.
    pub fn indices(&self) -> Vec<u32> {
        self.held.iter().map(|(i, _)| *i).collect()
    }

    /// Whether `index` is held exclusively. `None` if it is not held at all.
    pub fn is_exclusive(&self, index: u32) -> Option<bool> {
        self.held
            .binary_search_by_key(&index, |(i, _)| *i)
            .ok()
            .map(|pos| self.held[pos].1.is_exclusive())
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

impl LockManager {
    /// Allocate `slot_count` independent locks.
    ///
    /// Panics if `slot_count` is zero or does not fit in a `u32`. A size that
    /// is not a power of two is accepted, but `spread` then never reaches some
    /// slots.
    pub fn new(slot_count: usize) -> Self {
        assert!(slot_count > 0, "lock table must have at least one slot");
        assert!(
            slot_count <= u32::MAX as usize,
            "lock table size {slot_count} exceeds the 32-bit index space"
        );
        if !slot_count.is_power_of_two() {
            warn!(
                slots = slot_count,
                "lock table size is not a power of two; some slots are unreachable"
            );
        }
        let table: Box<[RwLock<()>]> = std::iter::repeat_with(|| RwLock::new(()))
            .take(slot_count)
            .collect();
        debug!(slots = slot_count, "lock manager created");
        Self { table }
    }

    pub fn slot_count(&self) -> usize {
        self.table.len()
    }

    /// Slot index for `key`.
    #[inline]
    pub fn index_of<Q>(&self, key: &Q) -> u32
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        spread(fnv32(key.as_ref()), self.table.len() as u32)
    }

    fn slot(&self, index: u32) -> &RwLock<()> {
        &self.table[index as usize]
    }

    /// Take the exclusive lock of `key`'s slot, blocking until it is free.
    pub fn lock<Q>(&self, key: &Q) -> SlotGuard<'_>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let index = self.index_of(key);
        SlotGuard {
            owner: self,
            index,
            held: Held::Exclusive(self.slot(index).write()),
        }
    }

    /// Take the shared lock of `key`'s slot.
    pub fn read_lock<Q>(&self, key: &Q) -> SlotGuard<'_>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let index = self.index_of(key);
        SlotGuard {
            owner: self,
            index,
            held: Held::Shared(self.slot(index).read()),
        }
    }

    /// Take the exclusive lock of `key`'s slot only if nobody holds it.
    pub fn try_lock<Q>(&self, key: &Q) -> Option<SlotGuard<'_>>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let index = self.index_of(key);
        let guard = self.slot(index).try_write()?;
        Some(SlotGuard {
            owner: self,
            index,
            held: Held::Exclusive(guard),
        })
    }

    /// Release a single-slot guard.
    pub fn unlock(&self, guard: SlotGuard<'_>) -> Result<(), LockError> {
        if !std::ptr::eq(guard.owner, self) {
            return Err(LockError::ForeignGuard);
        }
        drop(guard);
        Ok(())
    }

    /// Distinct slot indices touched by `keys`, ascending (descending if `reverse`).
    pub fn lock_indices<I, K>(&self, keys: I, reverse: bool) -> Vec<u32>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        let mut indices: Vec<u32> = keys.into_iter().map(|k| self.index_of(&k)).collect();
        indices.sort_unstable();
        indices.dedup();
        if reverse {
            indices.reverse();
        }
        indices
    }

    /// Lock every slot touched by `write_keys` exclusively and every other slot
    /// touched by `read_keys` shared, in ascending slot order.
    ///
    /// Duplicate keys, within or across the two lists, are allowed.
    pub fn rw_locks<W, R>(&self, write_keys: &[W], read_keys: &[R]) -> MultiLockGuard<'_>
    where
        W: AsRef<[u8]>,
        R: AsRef<[u8]>,
    {
        let write = self.lock_indices(write_keys.iter().map(AsRef::<[u8]>::as_ref), false);
        let all = self.lock_indices(
            write_keys
                .iter()
                .map(AsRef::<[u8]>::as_ref)
                .chain(read_keys.iter().map(AsRef::<[u8]>::as_ref)),
            false,
        );
        trace!(
            slots = all.len(),
            exclusive = write.len(),
            "acquiring multi-key locks"
        );

        let mut held = Vec::with_capacity(all.len());
        for index in all {
            let slot = self.slot(index);
            let h = if write.binary_search(&index).is_ok() {
                Held::Exclusive(slot.write())
            } else {
                Held::Shared(slot.read())
            };
            held.push((index, h));
        }
        MultiLockGuard { owner: self, held }
    }

    /// Release everything held by a `rw_locks` guard, ascending.
    pub fn rw_unlocks(&self, guard: MultiLockGuard<'_>) -> Result<(), LockError> {
        if !std::ptr::eq(guard.owner, self) {
            return Err(LockError::ForeignGuard);
        }
        drop(guard);
        Ok(())
    }
}
