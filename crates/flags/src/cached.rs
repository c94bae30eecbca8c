//! TTL cache in front of a slower flag source.

use crate::error::FlagError;
use crate::source::FlagSource;
use crate::value::FlagValue;
use moka::sync::Cache;
use std::fmt;
use std::time::Duration;
use tracing::trace;

const DEFAULT_CAPACITY: u64 = 1_024;

/// Caches lookups of an inner [`FlagSource`] for a fixed time-to-live.
///
/// Misses (`Ok(None)`) are cached as well, so an undefined flag does not hit
/// the inner source on every read. Errors are never cached.
pub struct CachedFlags<S> {
    inner: S,
    cache: Cache<String, Option<FlagValue>>,
}

impl<S: FlagSource> CachedFlags<S> {
    #[must_use]
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self::with_capacity(inner, ttl, DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(inner: S, ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(capacity).time_to_live(ttl).build();
        Self { inner, cache }
    }

    pub fn invalidate(&self, name: &str) {
        self.cache.invalidate(name);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: FlagSource> FlagSource for CachedFlags<S> {
    fn get(&self, name: &str) -> Result<Option<FlagValue>, FlagError> {
        if let Some(hit) = self.cache.get(name) {
            trace!(flag = name, "Flag cache hit");
            return Ok(hit);
        }

        let value = self.inner.get(name)?;
        self.cache.insert(name.to_owned(), value.clone());
        Ok(value)
    }
}

impl<S: fmt::Debug> fmt::Debug for CachedFlags<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedFlags")
            .field("inner", &self.inner)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Flagset;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Counting {
        flags: Flagset,
        lookups: AtomicUsize,
    }

    impl FlagSource for Counting {
        fn get(&self, name: &str) -> Result<Option<FlagValue>, FlagError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.flags.get(name)
        }
    }

    #[test]
    fn serves_stale_value_until_invalidated() {
        let source = Counting::default();
        source.flags.set("f", true).unwrap();
        let cached = CachedFlags::new(source, Duration::from_secs(60));

        assert!(cached.get_boolean("f", false).unwrap());
        cached.inner().flags.set("f", false).unwrap();
        assert!(cached.get_boolean("f", false).unwrap(), "cached value survives the flip");
        assert_eq!(cached.inner().lookups.load(Ordering::SeqCst), 1);

        cached.invalidate("f");
        assert!(!cached.get_boolean("f", false).unwrap());
        assert_eq!(cached.inner().lookups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn caches_misses() {
        let cached = CachedFlags::new(Counting::default(), Duration::from_secs(60));

        assert_eq!(cached.get("absent").unwrap(), None);
        assert_eq!(cached.get("absent").unwrap(), None);
        assert_eq!(cached.inner().lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn expires_after_ttl() {
        let source = Counting::default();
        source.flags.set("n", 1_i64).unwrap();
        let cached = CachedFlags::new(source, Duration::from_millis(30));

        assert_eq!(cached.get_int("n", 0).unwrap(), 1);
        cached.inner().flags.set("n", 2_i64).unwrap();
        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(cached.get_int("n", 0).unwrap(), 2);
    }
}
