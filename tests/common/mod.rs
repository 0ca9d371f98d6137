#![allow(dead_code)]

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a fmt subscriber filtered by `SHARD_DICT_LOG` (default `warn`).
pub fn setup_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_env("SHARD_DICT_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Deterministic pseudo-random stream.
pub fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s >> 16)
    })
}

pub fn key(n: u64) -> String {
    format!("k{:016x}", n)
}
