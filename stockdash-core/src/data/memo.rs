//! In-process memoization with an optional time-to-live.
//!
//! One `MemoCache` per memoized function; the key is that function's
//! arguments. Entries older than the TTL are treated as absent and evicted on
//! the next lookup. A TTL of `None` keeps entries until `invalidate`/`clear`.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct MemoCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    ttl: Option<Duration>,
}

impl<K: Eq + Hash, V: Clone> MemoCache<K, V> {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_fresh(&self, entry: &Entry<V>) -> bool {
        self.ttl.map_or(true, |ttl| entry.stored_at.elapsed() < ttl)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if self.is_fresh(entry) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.lock().insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Return the cached value or compute, store and return it.
    ///
    /// Errors are returned as-is and never cached, so a failed fetch is
    /// retried on the next call.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        f: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(v) = self.get(&key) {
            return Ok(v);
        }
        // The lock is not held across `f`; a provider call may be slow.
        let value = f()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn invalidate(&self, key: &K) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn hit_skips_computation() {
        let cache: MemoCache<String, u32> = MemoCache::new(None);
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, ()>(7)
        };
        assert_eq!(cache.get_or_try_insert_with("a".into(), compute), Ok(7));
        assert_eq!(cache.get_or_try_insert_with("a".into(), compute), Ok(7));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache: MemoCache<&str, u32> = MemoCache::new(None);
        assert_eq!(cache.get_or_try_insert_with("a", || Err("boom")), Err("boom"));
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_try_insert_with("a", || Ok::<_, &str>(1)), Ok(1));
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = MemoCache::new(Some(Duration::from_millis(20)));
        cache.insert(1, "x");
        assert_eq!(cache.get(&1), Some("x"));
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn no_ttl_never_expires() {
        let cache = MemoCache::new(None);
        cache.insert(1, "x");
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get(&1), Some("x"));
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = MemoCache::new(None);
        cache.insert(1, 10);
        cache.insert(2, 20);
        assert!(cache.invalidate(&1));
        assert!(!cache.invalidate(&1));
        assert_eq!(cache.get(&2), Some(20));
        cache.clear();
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn distinct_arguments_distinct_entries() {
        let cache = MemoCache::new(None);
        cache.insert(("AAPL", 2020), 1.0);
        cache.insert(("AAPL", 2021), 2.0);
        assert_eq!(cache.get(&("AAPL", 2020)), Some(1.0));
        assert_eq!(cache.get(&("AAPL", 2021)), Some(2.0));
    }
}
