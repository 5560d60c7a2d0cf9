//! Rotating API credential pool with cooldown-based disablement.
//!
//! Both LLM roles draw keys from one shared pool, so a key that one role
//! rate-limits is retired for the other as well. The cursor advances on
//! every draw regardless of health; cooldowns are purged lazily at the
//! start of each draw.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

/// HTTP status codes that temporarily disable a credential:
/// rate limit, quota exhausted, upstream unavailable.
pub const RATE_LIMIT_CODES: [u16; 3] = [429, 402, 503];

#[derive(Debug)]
struct PoolState {
    keys: Vec<String>,
    cursor: usize,
    disabled: HashMap<String, Instant>,
}

/// Snapshot of the pool for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatus {
    /// Total configured keys.
    pub total_keys: usize,
    /// Keys currently usable.
    pub available_keys: usize,
    /// Keys cooling down, as masked key → remaining cooldown seconds.
    pub cooling_down: HashMap<String, u64>,
    /// Masked form of the key the cursor points at.
    pub current_key: Option<String>,
}

/// Thread-safe rotating pool of API credentials.
///
/// `next()` skips keys that are cooling down, never tries a key twice in
/// one draw, and advances the cursor even when a key is skipped so no
/// single key absorbs all traffic.
#[derive(Debug)]
pub struct KeyPool {
    state: Mutex<PoolState>,
    cooldown: Duration,
}

impl KeyPool {
    /// Creates a pool over `keys`, disabling rate-limited keys for
    /// `cooldown` per failure.
    #[must_use]
    pub fn new(keys: Vec<String>, cooldown: Duration) -> Self {
        Self {
            state: Mutex::new(PoolState {
                keys,
                cursor: 0,
                disabled: HashMap::new(),
            }),
            cooldown,
        }
    }

    /// Configured cooldown window.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Draws the next usable key, or `None` when every key is cooling
    /// down (or the pool is empty).
    pub fn next(&self) -> Option<String> {
        let mut state = self.lock();
        let now = Instant::now();
        state
            .disabled
            .retain(|_, disabled_at| now.duration_since(*disabled_at) < self.cooldown);

        let total = state.keys.len();
        for _ in 0..total {
            let candidate = state.keys[state.cursor].clone();
            state.cursor = (state.cursor + 1) % total;
            if !state.disabled.contains_key(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// Records a failure for `key`. Only rate-limit-class status codes
    /// disable the key; anything else is a no-op.
    pub fn mark_failed(&self, key: &str, status: u16) {
        if !RATE_LIMIT_CODES.contains(&status) {
            return;
        }
        let mut state = self.lock();
        if state.keys.iter().any(|k| k == key) {
            tracing::warn!(
                key = %mask_key(key),
                status,
                cooldown_secs = self.cooldown.as_secs(),
                "disabling rate-limited key"
            );
            state.disabled.insert(key.to_string(), Instant::now());
        }
    }

    /// Snapshot for diagnostics. Keys are masked.
    pub fn status(&self) -> PoolStatus {
        let mut state = self.lock();
        let now = Instant::now();
        state
            .disabled
            .retain(|_, disabled_at| now.duration_since(*disabled_at) < self.cooldown);

        let cooling_down: HashMap<String, u64> = state
            .disabled
            .iter()
            .map(|(key, disabled_at)| {
                let remaining = self
                    .cooldown
                    .saturating_sub(now.duration_since(*disabled_at));
                (mask_key(key), remaining.as_secs())
            })
            .collect();

        PoolStatus {
            total_keys: state.keys.len(),
            available_keys: state
                .keys
                .iter()
                .filter(|k| !state.disabled.contains_key(*k))
                .count(),
            cooling_down,
            current_key: state.keys.get(state.cursor).map(|k| mask_key(k)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Masks a key for logs and status output: first 8 characters plus an
/// ellipsis. Short keys are fully masked.
#[must_use]
pub fn mask_key(key: &str) -> String {
    if key.len() > 8 {
        let prefix: String = key.chars().take(8).collect();
        format!("{prefix}...")
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pool(keys: &[&str], cooldown: Duration) -> KeyPool {
        KeyPool::new(keys.iter().map(ToString::to_string).collect(), cooldown)
    }

    #[test]
    fn test_round_robin_rotation() {
        let pool = pool(&["a", "b", "c"], Duration::from_secs(300));
        assert_eq!(pool.next().as_deref(), Some("a"));
        assert_eq!(pool.next().as_deref(), Some("b"));
        assert_eq!(pool.next().as_deref(), Some("c"));
        assert_eq!(pool.next().as_deref(), Some("a"));
    }

    #[test]
    fn test_disabled_key_is_skipped() {
        let pool = pool(&["a", "b"], Duration::from_secs(300));
        pool.mark_failed("a", 429);
        assert_eq!(pool.next().as_deref(), Some("b"));
        assert_eq!(pool.next().as_deref(), Some("b"));
    }

    #[test]
    fn test_non_rate_limit_status_is_noop() {
        let pool = pool(&["a", "b"], Duration::from_secs(300));
        pool.mark_failed("a", 400);
        pool.mark_failed("a", 500);
        assert_eq!(pool.next().as_deref(), Some("a"));
    }

    #[test]
    fn test_all_disabled_returns_none() {
        let pool = pool(&["a", "b"], Duration::from_secs(300));
        pool.mark_failed("a", 429);
        pool.mark_failed("b", 503);
        assert_eq!(pool.next(), None);
        // A second draw must also terminate without spinning.
        assert_eq!(pool.next(), None);
    }

    #[test]
    fn test_cooldown_expiry_restores_key() {
        let pool = pool(&["a"], Duration::from_millis(10));
        pool.mark_failed("a", 402);
        assert_eq!(pool.next(), None);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(pool.next().as_deref(), Some("a"));
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let pool = pool(&["a"], Duration::from_secs(300));
        pool.mark_failed("stranger", 429);
        assert_eq!(pool.next().as_deref(), Some("a"));
    }

    #[test]
    fn test_empty_pool_returns_none() {
        let pool = KeyPool::new(Vec::new(), Duration::from_secs(300));
        assert_eq!(pool.next(), None);
    }

    #[test]
    fn test_status_masks_keys() {
        let pool = pool(&["sk-or-v1-abcdef123456", "short"], Duration::from_secs(300));
        pool.mark_failed("sk-or-v1-abcdef123456", 429);
        let status = pool.status();
        assert_eq!(status.total_keys, 2);
        assert_eq!(status.available_keys, 1);
        assert!(status.cooling_down.contains_key("sk-or-v1..."));
        assert!(
            status
                .cooling_down
                .keys()
                .all(|k| !k.contains("abcdef123456"))
        );
    }

    #[test]
    fn test_mask_key_short() {
        assert_eq!(mask_key("abc"), "***");
        assert_eq!(mask_key("12345678"), "***");
        assert_eq!(mask_key("123456789"), "12345678...");
    }

    proptest! {
        // With no failures, n draws over k keys visit keys in strict
        // round-robin order.
        #[test]
        fn prop_rotation_visits_all_keys(key_count in 1usize..8, draws in 1usize..32) {
            let keys: Vec<String> = (0..key_count).map(|i| format!("key-{i}")).collect();
            let pool = KeyPool::new(keys.clone(), Duration::from_secs(300));
            for draw in 0..draws {
                let got = pool.next();
                prop_assert_eq!(got.as_deref(), Some(keys[draw % key_count].as_str()));
            }
        }

        // Disabling any subset (but not all) of keys still yields only
        // healthy keys, and every draw terminates.
        #[test]
        fn prop_disabled_subset_never_returned(
            key_count in 2usize..8,
            disable_mask in prop::collection::vec(any::<bool>(), 2..8),
        ) {
            let keys: Vec<String> = (0..key_count).map(|i| format!("key-{i}")).collect();
            let pool = KeyPool::new(keys.clone(), Duration::from_secs(300));
            let mut disabled = Vec::new();
            for (i, flag) in disable_mask.iter().enumerate().take(key_count) {
                // Leave at least one key healthy.
                if *flag && disabled.len() + 1 < key_count {
                    pool.mark_failed(&keys[i], 429);
                    disabled.push(keys[i].clone());
                }
            }
            for _ in 0..(key_count * 2) {
                let got = pool.next();
                prop_assert!(got.is_some());
                if let Some(key) = got {
                    prop_assert!(!disabled.contains(&key));
                }
            }
        }
    }
}
