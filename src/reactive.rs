//! Explicit memo cells for the pull-based recomputation model.
//!
//! A [`Memo`] caches one value together with the key it was computed for.
//! Reading with the same key returns the cached value; reading with a new
//! key, or after [`Memo::invalidate`], recomputes exactly once.

/// Monotonic change counter for one input field.
pub type Revision = u64;

#[derive(Debug)]
pub struct Memo<K, V> {
    cached: Option<(K, V)>,
    computations: u64,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            cached: None,
            computations: 0,
        }
    }
}

impl<K: PartialEq, V: Clone> Memo<K, V> {
    /// Return the value for `key`, running `compute` only when the cache is
    /// empty or was filled for a different key.
    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some((cached_key, value)) = &self.cached {
            if *cached_key == key {
                return value.clone();
            }
        }
        let value = compute();
        self.computations += 1;
        self.cached = Some((key, value.clone()));
        value
    }

    /// Drop the cached value; the next read recomputes.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// How many times the value has been (re)computed.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_is_served_from_cache() {
        let mut memo: Memo<Revision, u32> = Memo::default();
        let mut calls = 0;
        for _ in 0..3 {
            let v = memo.get_or_compute(1, || {
                calls += 1;
                42
            });
            assert_eq!(v, 42);
        }
        assert_eq!(calls, 1);
        assert_eq!(memo.computations(), 1);
    }

    #[test]
    fn new_key_recomputes_once() {
        let mut memo: Memo<Revision, u32> = Memo::default();
        memo.get_or_compute(1, || 1);
        assert_eq!(memo.get_or_compute(2, || 2), 2);
        assert_eq!(memo.get_or_compute(2, || 99), 2);
        assert_eq!(memo.computations(), 2);
    }

    #[test]
    fn invalidate_forces_recompute_with_same_key() {
        let mut memo: Memo<Revision, &str> = Memo::default();
        memo.get_or_compute(7, || "old");
        memo.invalidate();
        assert_eq!(memo.get_or_compute(7, || "new"), "new");
        assert_eq!(memo.computations(), 2);
    }
}
