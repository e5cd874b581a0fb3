//! Answer cache in front of a backend
//!
//! Keyed by the query's canonical text. Only definite answers are cached;
//! timeouts and failures are retried on the next identical query.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::trace;

use crate::features::solver::domain::{SolverOutcome, SolverQuery, SolverResult};
use crate::features::solver::ports::SolverBackend;

pub struct CachingSolver {
    inner: Box<dyn SolverBackend>,
    cache: LruCache<String, SolverOutcome>,
    hits: u64,
}

impl CachingSolver {
    pub fn new(inner: Box<dyn SolverBackend>, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: LruCache::new(capacity),
            hits: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl SolverBackend for CachingSolver {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn solve(&mut self, query: &SolverQuery, deadline: Instant) -> SolverResult<SolverOutcome> {
        let key = query.canonical_text();
        if let Some(hit) = self.cache.get(&key) {
            self.hits += 1;
            trace!(hits = self.hits, "solver cache hit");
            return Ok(hit.clone());
        }
        let outcome = self.inner.solve(query, deadline)?;
        self.cache.put(key, outcome.clone());
        Ok(outcome)
    }

    fn cache_hits(&self) -> u64 {
        self.hits
    }
}
