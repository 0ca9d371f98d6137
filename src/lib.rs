//! shard-dict: the concurrency core of an in-memory key-value store.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: let many threads read and mutate one key space in parallel, and
//!   still run atomic multi-key operations without a global lock.
//! - Layers:
//!   - `hash`: FNV-1 style 32-bit key hash plus `spread`, the mask that maps a
//!     hash into a power-of-two table.
//!   - `ConcurrentDict<V>`: fixed array of shards, each a `hashbrown::HashMap`
//!     behind its own `RwLock`, plus one atomic key counter.
//!   - `LockManager`: fixed array of reader/writer locks with no data, taken
//!     per key or for a whole key set in one ordered pass.
//!   - `Store<V>`: one of each, built from a `Config`, with scoped multi-key
//!     execution.
//!
//! Constraints
//! - Tables are sized once. No growth, shrinkage or shard migration.
//! - Distinct keys may share a shard or lock slot. That is accepted
//!   contention, never an error.
//! - The dictionary and the lock manager share only the key-to-index
//!   function, not a table. Equal table sizes make their indices agree.
//! - Critical sections do constant-time map work only. No I/O, no logging,
//!   no further locking.
//!
//! Lock ordering
//! - `LockManager::rw_locks` resolves keys to a deduplicated set of slot
//!   indices and acquires them in ascending order, exclusive where any write
//!   key lands and shared otherwise. The order is global and fixed, which is
//!   what rules out deadlock between overlapping multi-key requests.
//! - Release is tied to the returned guard, so the released set always equals
//!   the acquired set.
//!
//! Counter consistency
//! - `ConcurrentDict::len` reads the atomic counter without taking shard
//!   locks. It matches the set of completed `put`/`remove` calls, not a
//!   snapshot coordinated with ones still running.
//!
//! Misuse
//! - Handles cannot be default-constructed; there is no "uninitialized
//!   dictionary" state to check for.
//! - A zero-sized lock table panics at construction. `Config::validate`
//!   reports the same condition as an error for callers that build from
//!   configuration.

pub mod config;
pub mod dict;
pub mod error;
pub mod hash;
pub mod lock;
pub mod store;

// Public surface
pub use config::Config;
pub use dict::ConcurrentDict;
pub use error::{ConfigError, LockError};
pub use hash::{fnv32, next_power_of_two_capacity, spread};
pub use lock::{LockManager, MultiLockGuard, SlotGuard};
pub use store::Store;
