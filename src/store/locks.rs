//! # Per-Key Ordering
//!
//! Striped mutex table. Operations on the same `(collection, id)` always
//! hash to the same stripe, so they run one after another in the order
//! they acquire it. Distinct keys usually land on different stripes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of stripes
pub const DEFAULT_STRIPES: usize = 64;

/// Striped lock table keyed by `(collection, id)`
#[derive(Debug)]
pub struct KeyLocks {
    stripes: Vec<Mutex<()>>,
}

impl KeyLocks {
    /// Create a table with `count` stripes (at least one)
    pub fn new(count: usize) -> Self {
        let stripes = (0..count.max(1)).map(|_| Mutex::new(())).collect();
        Self { stripes }
    }

    /// Acquire the stripe guarding `(collection, id)`
    ///
    /// The guarded data is `()`, so a poisoned stripe is simply reused.
    pub fn lock(&self, collection: &str, id: &str) -> MutexGuard<'_, ()> {
        let index = self.stripe_index(collection, id);
        self.stripes[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn stripe_index(&self, collection: &str, id: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        collection.hash(&mut hasher);
        id.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }
}

impl Default for KeyLocks {
    fn default() -> Self {
        Self::new(DEFAULT_STRIPES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_same_stripe() {
        let locks = KeyLocks::default();
        assert_eq!(
            locks.stripe_index("users", "a@b.com"),
            locks.stripe_index("users", "a@b.com")
        );
    }

    #[test]
    fn test_zero_stripes_is_clamped() {
        let locks = KeyLocks::new(0);
        let _guard = locks.lock("tokens", "x");
    }

    #[test]
    fn test_distinct_keys_do_not_deadlock() {
        let locks = KeyLocks::new(1);
        {
            let _a = locks.lock("users", "a");
        }
        let _b = locks.lock("users", "b");
    }
}
