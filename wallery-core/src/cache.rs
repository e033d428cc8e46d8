//! A small tag-invalidated TTL cache.
//!
//! Callers own their cache instance and pass it where it is needed; there is
//! no process-wide singleton. Entries expire after a fixed time-to-live and
//! can be dropped early by key or by any of the tags they were stored with.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Source of monotonic time for cache expiry.
pub trait Clock: Send + Sync {
    /// Return the current instant.
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    tags: Vec<String>,
}

/// Key/value cache with a time-to-live and tag-based invalidation.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use wallery_core::TaggedCache;
///
/// let cache = TaggedCache::new(Duration::from_secs(60));
/// cache.insert("popular", vec![1, 2, 3], &["wallpapers"]);
/// assert_eq!(cache.get(&"popular"), Some(vec![1, 2, 3]));
///
/// assert_eq!(cache.invalidate_tag("wallpapers"), 1);
/// assert_eq!(cache.get(&"popular"), None);
/// ```
#[derive(Debug)]
pub struct TaggedCache<K, V, C = SystemClock> {
    ttl: Duration,
    clock: C,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TaggedCache<K, V, SystemClock>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache using the system clock.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<K, V, C> TaggedCache<K, V, C>
where
    K: Eq + Hash,
    V: Clone,
    C: Clock,
{
    /// Create an empty cache driven by `clock`.
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return a clone of a fresh entry, evicting it when it has expired.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.stored_at) < self.ttl {
            return Some(entry.value.clone());
        }
        entries.remove(key);
        None
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: K, value: V, tags: &[&str]) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
        };
        self.lock().insert(key, entry);
    }

    /// Drop a single entry. Returns whether anything was removed.
    pub fn invalidate(&self, key: &K) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Drop every entry stored with `tag`. Returns the number removed.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.iter().any(|candidate| candidate == tag));
        before - entries.len()
    }

    /// Number of stored entries, including ones not yet evicted after expiry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Report whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave an entry half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ManualClock;
    use rstest::{fixture, rstest};

    #[fixture]
    fn cache() -> TaggedCache<&'static str, u32, ManualClock> {
        TaggedCache::with_clock(Duration::from_secs(30), ManualClock::default())
    }

    #[rstest]
    fn entries_expire_after_ttl(cache: TaggedCache<&'static str, u32, ManualClock>) {
        cache.insert("a", 1, &[]);
        cache.clock.advance(Duration::from_secs(29));
        assert_eq!(cache.get(&"a"), Some(1));
        cache.clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
    }

    #[rstest]
    fn tag_invalidation_only_hits_tagged_entries(
        cache: TaggedCache<&'static str, u32, ManualClock>,
    ) {
        cache.insert("all", 1, &["wallpapers"]);
        cache.insert("popular", 2, &["wallpapers", "popular"]);
        cache.insert("categories", 3, &["categories"]);

        assert_eq!(cache.invalidate_tag("wallpapers"), 2);
        assert_eq!(cache.get(&"categories"), Some(3));
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn reinserting_refreshes_the_timestamp(cache: TaggedCache<&'static str, u32, ManualClock>) {
        cache.insert("a", 1, &[]);
        cache.clock.advance(Duration::from_secs(20));
        cache.insert("a", 2, &[]);
        cache.clock.advance(Duration::from_secs(20));
        assert_eq!(cache.get(&"a"), Some(2));
    }

    #[rstest]
    fn key_invalidation_reports_removal(cache: TaggedCache<&'static str, u32, ManualClock>) {
        cache.insert("a", 1, &[]);
        assert!(cache.invalidate(&"a"));
        assert!(!cache.invalidate(&"a"));
    }
}
