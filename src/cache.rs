//! Bounded cache of parsed templates keyed by source text.
//!
//! Parsing happens outside the lock. Two threads missing on the same text
//! both parse it, and the second insert returns the tree the first one
//! stored, so every caller ends up sharing a single `Arc`.

use std::{
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use lru::LruCache;
use parking_lot::Mutex;

use crate::parser::{ParseError, Template, parse_template};

/// Basic cache statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Hit ratio as a percentage
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

pub struct ExpressionCache {
    /// `None` when caching is disabled
    entries: Option<Mutex<LruCache<String, Arc<Template>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ExpressionCache {
    /// A capacity of 0 disables caching; every call parses.
    pub fn new(capacity: usize) -> Self {
        ExpressionCache {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached tree for `text`, parsing and inserting it on a
    /// miss. Syntax errors are returned and not cached.
    pub fn get_or_parse(&self, text: &str) -> Result<Arc<Template>, ParseError> {
        let Some(entries) = &self.entries else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return parse_template(text).map(Arc::new);
        };

        if let Some(hit) = entries.lock().get(text).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        log::trace!("expression cache miss: {}", text);
        let parsed = Arc::new(parse_template(text)?);

        let mut guard = entries.lock();
        if guard.len() == guard.cap().get()
            && !guard.contains(text)
            && let Some((evicted, _)) = guard.peek_lru()
        {
            log::trace!("expression cache evicting: {}", evicted);
        }
        Ok(guard.get_or_insert(text.to_string(), || parsed).clone())
    }

    pub fn stats(&self) -> CacheStats {
        let (len, capacity) = match &self.entries {
            Some(entries) => {
                let guard = entries.lock();
                (guard.len(), guard.cap().get())
            }
            None => (0, 0),
        };
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len,
            capacity,
        }
    }

    pub fn clear(&self) {
        if let Some(entries) = &self.entries {
            entries.lock().clear();
        }
    }
}
