use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Time-bounded response cache keyed by request URL.
///
/// Sits beneath pagination so repeated fetches within one run (or across
/// quick successive runs of a long-lived process) hit memory instead of the
/// API. Staleness within the TTL window is accepted: a cached review list may
/// lag the live API, which shifts a classification to an older state of the
/// pull request but never corrupts aggregation.
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    stored_at: Instant,
    page: CachedPage,
}

#[derive(Clone)]
pub struct CachedPage {
    pub body: String,
    pub has_next: bool,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A zero-TTL cache never returns a hit; used in tests and when caching
    /// is disabled.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn get(&self, url: &str) -> Option<CachedPage> {
        let entries = self.entries.lock().expect("cache lock poisoned");
        let entry = entries.get(url)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.page.clone())
    }

    pub fn put(&self, url: &str, page: CachedPage) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            url.to_string(),
            CacheEntry {
                stored_at: Instant::now(),
                page,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_roundtrip() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        assert!(cache.get("https://example.test/a").is_none());

        cache.put(
            "https://example.test/a",
            CachedPage {
                body: "[]".to_string(),
                has_next: false,
            },
        );
        let hit = cache.get("https://example.test/a").unwrap();
        assert_eq!(hit.body, "[]");
        assert!(!hit.has_next);
    }

    #[test]
    fn test_disabled_cache_never_hits() {
        let cache = ResponseCache::disabled();
        cache.put(
            "https://example.test/a",
            CachedPage {
                body: "[]".to_string(),
                has_next: false,
            },
        );
        assert!(cache.get("https://example.test/a").is_none());
    }
}
