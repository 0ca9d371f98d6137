//! Reported errors. Misuse that cannot be recovered from still panics.

use thiserror::Error;

/// Invalid `Config` values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("lock table must have at least one slot")]
    ZeroLockSlots,
    #[error("lock table size {0} is not a power of two")]
    LockSlotsNotPowerOfTwo(usize),
    #[error("table size {0} exceeds the 32-bit index space")]
    TableTooLarge(usize),
}

/// Errors from releasing lock guards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// The guard was acquired from a different `LockManager`. Its slots are
    /// released on its own manager when it is dropped.
    #[error("guard was not acquired from this lock manager")]
    ForeignGuard,
}
