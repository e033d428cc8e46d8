//! A caching decorator for any [`WallpaperStore`].

use std::time::Duration;

use log::debug;

use crate::cache::{Clock, SystemClock, TaggedCache};
use crate::{Wallpaper, WallpaperStore};

/// Tag attached to every cached wallpaper list.
pub const WALLPAPERS_TAG: &str = "wallpapers";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CacheKey {
    All,
    Popular(usize),
}

/// Wraps a store and serves repeated reads from a [`TaggedCache`].
///
/// Writers must call [`invalidate_wallpapers`](Self::invalidate_wallpapers)
/// after mutating the underlying catalog; otherwise readers see the old
/// snapshot until the time-to-live elapses.
#[derive(Debug)]
pub struct CachedStore<S, C = SystemClock> {
    inner: S,
    cache: TaggedCache<CacheKey, Vec<Wallpaper>, C>,
}

impl<S: WallpaperStore> CachedStore<S, SystemClock> {
    /// Cache reads from `inner` for `ttl`.
    #[must_use]
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self::with_clock(inner, ttl, SystemClock)
    }
}

impl<S: WallpaperStore, C: Clock> CachedStore<S, C> {
    /// Cache reads from `inner` for `ttl`, measured by `clock`.
    #[must_use]
    pub fn with_clock(inner: S, ttl: Duration, clock: C) -> Self {
        Self {
            inner,
            cache: TaggedCache::with_clock(ttl, clock),
        }
    }

    /// Drop every cached wallpaper list. Returns the number of entries removed.
    pub fn invalidate_wallpapers(&self) -> usize {
        let removed = self.cache.invalidate_tag(WALLPAPERS_TAG);
        debug!("invalidated {removed} cached wallpaper lists");
        removed
    }

    /// Borrow the wrapped store.
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    fn cached<F>(&self, key: CacheKey, load: F) -> Result<Vec<Wallpaper>, S::Error>
    where
        F: FnOnce(&S) -> Result<Vec<Wallpaper>, S::Error>,
    {
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let loaded = load(&self.inner)?;
        self.cache.insert(key, loaded.clone(), &[WALLPAPERS_TAG]);
        Ok(loaded)
    }
}

impl<S: WallpaperStore, C: Clock> WallpaperStore for CachedStore<S, C> {
    type Error = S::Error;

    fn all_wallpapers(&self) -> Result<Vec<Wallpaper>, Self::Error> {
        self.cached(CacheKey::All, S::all_wallpapers)
    }

    fn popular_wallpapers(&self, count: usize) -> Result<Vec<Wallpaper>, Self::Error> {
        self.cached(CacheKey::Popular(count), |inner| {
            inner.popular_wallpapers(count)
        })
    }
}
