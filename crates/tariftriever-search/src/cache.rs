//! Bounded cache of resolved queries

use crate::SearchResult;
use crate::resolver::ResolverState;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Cached resolutions are only valid for the catalog generation they were
/// computed against, so the generation is part of the key. Code and text
/// queries take different tier paths and never share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub text: String,
    pub looks_like_code: bool,
    pub language: String,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct CachedResolution {
    pub results: Vec<SearchResult>,
    pub states: Vec<ResolverState>,
}

pub struct ResolutionCache {
    entries: Mutex<LruCache<CacheKey, CachedResolution>>,
}

impl ResolutionCache {
    /// `None` when `capacity` is zero
    pub fn new(capacity: usize) -> Option<Self> {
        NonZeroUsize::new(capacity).map(|capacity| Self {
            entries: Mutex::new(LruCache::new(capacity)),
        })
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedResolution> {
        self.entries
            .lock()
            .ok()
            .and_then(|mut entries| entries.get(key).cloned())
    }

    pub fn put(&self, key: CacheKey, resolution: CachedResolution) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(key, resolution);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str, generation: u64) -> CacheKey {
        CacheKey {
            text: text.to_string(),
            looks_like_code: false,
            language: "ru".to_string(),
            generation,
        }
    }

    fn resolution() -> CachedResolution {
        CachedResolution {
            results: Vec::new(),
            states: vec![ResolverState::Init, ResolverState::Resolved],
        }
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        assert!(ResolutionCache::new(0).is_none());
    }

    #[test]
    fn test_generation_is_part_of_key() {
        let cache = ResolutionCache::new(4).unwrap();
        cache.put(key("яблоки", 1), resolution());

        assert!(cache.get(&key("яблоки", 1)).is_some());
        assert!(cache.get(&key("яблоки", 2)).is_none());
    }

    #[test]
    fn test_code_and_text_queries_do_not_share_entries() {
        let cache = ResolutionCache::new(4).unwrap();
        let code = CacheKey {
            looks_like_code: true,
            ..key("0206", 1)
        };
        cache.put(code.clone(), resolution());

        assert!(cache.get(&code).is_some());
        assert!(cache.get(&key("0206", 1)).is_none());
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let cache = ResolutionCache::new(2).unwrap();
        cache.put(key("a", 1), resolution());
        cache.put(key("b", 1), resolution());
        assert!(cache.get(&key("a", 1)).is_some());
        cache.put(key("c", 1), resolution());

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("b", 1)).is_none());
        assert!(cache.get(&key("a", 1)).is_some());
    }
}
