//! Search facade with a bounded compiled-query cache.
//!
//! The cache is the only shared mutable state. It sits behind a mutex that is
//! held for lookups and inserts only; tokenizing, parsing and evaluation run
//! outside the lock. Cached queries are handed out as `Arc<CompiledQuery>`.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::compiled::CompiledQuery;
use crate::error::QueryResult;
use crate::value::Record;

/// Default number of compiled queries kept in the cache
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum cached compiled queries; 0 disables caching
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

pub struct SearchEngine {
    cache: Option<Mutex<LruCache<String, Arc<CompiledQuery>>>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SearchEngine {
    pub fn new(cache_capacity: usize) -> Self {
        let cache = NonZeroUsize::new(cache_capacity).map(|cap| Mutex::new(LruCache::new(cap)));

        Self {
            cache,
            capacity: cache_capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self::new(config.cache_capacity)
    }

    /// Compiled form of `query`, from the cache when present.
    pub fn compile(&self, query: &str) -> QueryResult<Arc<CompiledQuery>> {
        if let Some(cache) = &self.cache {
            let cached = cache.lock().get(query).cloned();
            if let Some(compiled) = cached {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(query, "compiled query cache hit");
                return Ok(compiled);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let compiled = match CompiledQuery::compile(query) {
            Ok(compiled) => Arc::new(compiled),
            Err(e) => {
                tracing::debug!(query, position = e.position(), "query failed to compile: {}", e);
                return Err(e);
            }
        };
        tracing::debug!(query, canonical = %compiled, "compiled query");

        if let Some(cache) = &self.cache {
            cache.lock().put(query.to_string(), Arc::clone(&compiled));
        }

        Ok(compiled)
    }

    /// Records matching `query`, in input order.
    ///
    /// A blank query returns every record. Compile errors are returned as-is;
    /// what to show the user in that case is up to the caller.
    pub fn search<'r, R: Record>(
        &self,
        records: &'r [R],
        query: &str,
    ) -> QueryResult<Vec<&'r R>> {
        if is_blank(query) {
            return Ok(records.iter().collect());
        }

        let compiled = self.compile(query)?;
        let matched = compiled.filter(records);
        tracing::trace!(
            query,
            scanned = records.len(),
            matched = matched.len(),
            "search complete"
        );
        Ok(matched)
    }

    /// Per-record match flags for `query`.
    pub fn mask<R: Record>(&self, records: &[R], query: &str) -> QueryResult<Vec<bool>> {
        if is_blank(query) {
            return Ok(vec![true; records.len()]);
        }
        Ok(self.compile(query)?.mask(records))
    }

    /// Number of records matching `query`.
    pub fn count<R: Record>(&self, records: &[R], query: &str) -> QueryResult<usize> {
        if is_blank(query) {
            return Ok(records.len());
        }
        let compiled = self.compile(query)?;
        Ok(records.iter().filter(|r| compiled.matches(*r)).count())
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: self.cache.as_ref().map_or(0, |c| c.lock().len()),
            capacity: self.capacity,
        }
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().clear();
        }
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::with_config(&EngineConfig::default())
    }
}

fn is_blank(query: &str) -> bool {
    query.chars().all(|c| c.is_ascii_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use serde_json::{json, Value};

    fn students() -> Vec<Value> {
        vec![
            json!({"name": "Ana Torres", "average": 85, "courses": 4}),
            json!({"name": "Juan Méndez", "average": 92, "courses": 5}),
            json!({"name": "María López", "average": 78, "courses": 3}),
        ]
    }

    fn names(records: &[&Value]) -> Vec<String> {
        records
            .iter()
            .filter_map(|r| r["name"].as_str().map(String::from))
            .collect()
    }

    #[test]
    fn test_blank_query_is_identity() {
        let engine = SearchEngine::default();
        let records = students();
        for query in ["", "   ", "\t\n"] {
            let result = engine.search(&records, query).unwrap();
            assert_eq!(result.len(), records.len());
            assert!(result.iter().zip(records.iter()).all(|(a, b)| std::ptr::eq(*a, b)));
        }
        assert_eq!(engine.cache_stats().misses, 0);
        assert_eq!(engine.cache_stats().len, 0);
    }

    #[test]
    fn test_search_filters_in_order() {
        let engine = SearchEngine::default();
        let records = students();
        let result = engine.search(&records, "courses>=4").unwrap();
        assert_eq!(names(&result), vec!["Ana Torres", "Juan Méndez"]);
    }

    #[test]
    fn test_cache_hits_and_misses() {
        let engine = SearchEngine::new(8);
        let records = students();

        engine.search(&records, "average>80").unwrap();
        engine.search(&records, "average>80").unwrap();
        engine.search(&records, "name:ana").unwrap();

        let stats = engine.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.len, 2);
        assert_eq!(stats.capacity, 8);
    }

    #[test]
    fn test_cached_query_is_shared() {
        let engine = SearchEngine::new(4);
        let first = engine.compile("courses=3").unwrap();
        let second = engine.compile("courses=3").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_lru_eviction() {
        let engine = SearchEngine::new(2);
        let a = engine.compile("a:1").unwrap();
        engine.compile("b:1").unwrap();
        // Touch "a" so "b" becomes least recently used
        engine.compile("a:1").unwrap();
        engine.compile("c:1").unwrap();

        assert_eq!(engine.cache_stats().len, 2);
        assert!(Arc::ptr_eq(&a, &engine.compile("a:1").unwrap()));

        let misses_before = engine.cache_stats().misses;
        engine.compile("b:1").unwrap();
        assert_eq!(engine.cache_stats().misses, misses_before + 1);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let engine = SearchEngine::new(0);
        let records = students();
        let first = engine.search(&records, "average>=90").unwrap();
        let second = engine.search(&records, "average>=90").unwrap();
        assert_eq!(names(&first), names(&second));

        let stats = engine.cache_stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.len, 0);
    }

    #[test]
    fn test_compile_errors_are_returned_not_cached() {
        let engine = SearchEngine::new(4);
        let records = students();
        match engine.search(&records, "average>= AND") {
            Err(QueryError::Parse(e)) => assert_eq!(e.position, 10),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert_eq!(engine.cache_stats().len, 0);
    }

    #[test]
    fn test_reserved_word_as_value() {
        let engine = SearchEngine::default();
        let records = vec![json!({"state": "OR"}), json!({"state": "WA"})];
        assert_eq!(engine.mask(&records, "state:OR").unwrap(), vec![true, false]);
        assert_eq!(engine.count(&records, "state!=or").unwrap(), 2);

        match engine.search(&records, "average>= AND") {
            Err(QueryError::Parse(e)) => assert_eq!(e.position, 10),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_mask_and_count() {
        let engine = SearchEngine::default();
        let records = students();
        assert_eq!(
            engine.mask(&records, "average<90").unwrap(),
            vec![true, false, true]
        );
        assert_eq!(engine.count(&records, "average<90").unwrap(), 2);
        assert_eq!(engine.count(&records, "").unwrap(), 3);
        assert_eq!(engine.mask(&records, " ").unwrap(), vec![true; 3]);
    }

    #[test]
    fn test_clear_cache() {
        let engine = SearchEngine::new(4);
        engine.compile("a:1").unwrap();
        engine.clear_cache();
        assert_eq!(engine.cache_stats().len, 0);
    }

    #[test]
    fn test_concurrent_searches_share_cache() {
        let engine = SearchEngine::new(16);
        let records = students();
        let queries = ["average>=90", "courses>=4 AND average>80", "name:ana", "NOT courses=3"];

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        for query in queries {
                            engine.search(&records, query).unwrap();
                        }
                    }
                });
            }
        });

        let stats = engine.cache_stats();
        assert_eq!(stats.len, queries.len());
        assert_eq!(stats.hits + stats.misses, 4 * 50 * queries.len() as u64);
        assert_eq!(
            names(&engine.search(&records, "courses>=4 AND average>80").unwrap()),
            vec!["Ana Torres", "Juan Méndez"]
        );
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: EngineConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, EngineConfig::default());
        let config: EngineConfig = serde_json::from_value(json!({"cache_capacity": 3})).unwrap();
        assert_eq!(SearchEngine::with_config(&config).cache_stats().capacity, 3);
    }
}
