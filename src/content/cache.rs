//! Cached query results with per-scope invalidation.
//!
//! Each scope (a collection, or the dashboard-counts aggregate) carries a
//! generation number. A read records the generation before hitting the
//! backend; if the scope was invalidated while the read was in flight, its
//! result is handed to the caller but not stored.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use super::Collection;

/// What a cached entry was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    Collection(Collection),
    DashboardStats,
}

pub type CachedRows = Arc<Vec<Value>>;

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: DashMap<(CacheScope, String), CachedRows>,
    generations: DashMap<CacheScope, u64>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, scope: CacheScope, key: &str) -> Option<CachedRows> {
        self.entries
            .get(&(scope, key.to_string()))
            .map(|entry| Arc::clone(&entry))
    }

    /// Current generation of `scope`.
    pub fn generation(&self, scope: CacheScope) -> u64 {
        self.generations.get(&scope).map_or(0, |g| *g)
    }

    /// Store `rows` unless `scope` was invalidated after `generation`.
    pub fn insert_if_current(
        &self,
        scope: CacheScope,
        key: String,
        generation: u64,
        rows: CachedRows,
    ) -> bool {
        // Hold the generation entry so an invalidation cannot interleave
        // between the check and the insert.
        let current = self.generations.entry(scope).or_insert(0);
        if *current != generation {
            return false;
        }
        self.entries.insert((scope, key), rows);
        drop(current);
        true
    }

    /// Drop every entry of `scope` and bump its generation.
    pub fn invalidate(&self, scope: CacheScope) {
        let mut generation = self.generations.entry(scope).or_insert(0);
        *generation += 1;
        self.entries.retain(|(entry_scope, _), _| *entry_scope != scope);
        drop(generation);
    }

    pub fn clear(&self) {
        let scopes: Vec<CacheScope> = self.generations.iter().map(|g| *g.key()).collect();
        for scope in scopes {
            self.invalidate(scope);
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ARTICLES: CacheScope = CacheScope::Collection(Collection::Articles);
    const PROFILES: CacheScope = CacheScope::Collection(Collection::LeadershipProfiles);

    fn rows() -> CachedRows {
        Arc::new(vec![json!({"id": 1})])
    }

    #[test]
    fn test_insert_and_get() {
        let cache = QueryCache::new();
        let generation = cache.generation(ARTICLES);
        assert!(cache.insert_if_current(ARTICLES, "select=*".into(), generation, rows()));
        assert_eq!(cache.get(ARTICLES, "select=*").unwrap().len(), 1);
        assert!(cache.get(PROFILES, "select=*").is_none());
    }

    #[test]
    fn test_invalidate_is_scoped() {
        let cache = QueryCache::new();
        cache.insert_if_current(ARTICLES, "a".into(), 0, rows());
        cache.insert_if_current(PROFILES, "a".into(), 0, rows());

        cache.invalidate(ARTICLES);
        assert!(cache.get(ARTICLES, "a").is_none());
        assert!(cache.get(PROFILES, "a").is_some());
        assert_eq!(cache.generation(ARTICLES), 1);
    }

    #[test]
    fn test_stale_result_not_cached() {
        let cache = QueryCache::new();
        let started_at = cache.generation(ARTICLES);
        cache.invalidate(ARTICLES);

        assert!(!cache.insert_if_current(ARTICLES, "a".into(), started_at, rows()));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = QueryCache::new();
        cache.insert_if_current(CacheScope::DashboardStats, "stats".into(), 0, rows());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.generation(CacheScope::DashboardStats), 1);
    }
}
