//! Result cache: freshness-windowed memo of completed optimizations.
//!
//! Keyed by kind + context + a bounded content prefix. Entries past the
//! freshness window are evicted lazily on read; when the cache is full the
//! least-recently-used entry goes first. In-memory only.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use lru::LruCache;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::time::Instant;
use tracing::debug;

use crate::optimization::models::{OptimizationRequest, OptimizationResult};

#[derive(Debug, Clone)]
struct CacheEntry {
    result: OptimizationResult,
    stored_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub ttl_secs: u64,
    pub hits: u64,
    pub misses: u64,
}

pub struct ResultCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
    key_prefix_chars: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new(capacity: usize, ttl: Duration, key_prefix_chars: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            key_prefix_chars,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Deterministic key: SHA-256 over kind, trimmed context and the first
    /// `key_prefix_chars` characters of the trimmed content.
    pub fn key_for(&self, request: &OptimizationRequest) -> String {
        let prefix: String = request
            .raw_content
            .trim()
            .chars()
            .take(self.key_prefix_chars)
            .collect();

        let mut hasher = Sha256::new();
        hasher.update(request.content_kind.as_str().as_bytes());
        hasher.update([0x1f]);
        hasher.update(request.context().as_bytes());
        hasher.update([0x1f]);
        hasher.update(prefix.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Returns a fresh result for `request`, evicting it if it went stale.
    pub fn get(&self, request: &OptimizationRequest) -> Option<OptimizationResult> {
        let key = self.key_for(request);
        let mut entries = self.lock();

        let stale = entries
            .peek(&key)
            .map(|entry| entry.stored_at.elapsed() > self.ttl);
        let fresh = match stale {
            Some(false) => entries.get(&key).map(|entry| entry.result.clone()),
            Some(true) => {
                entries.pop(&key);
                debug!(key = %&key[..12], "evicted stale cache entry");
                None
            }
            None => None,
        };

        match fresh {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        fresh
    }

    /// Stores `result`, replacing any previous entry for the same key.
    pub fn set(&self, request: &OptimizationRequest, result: OptimizationResult) {
        let key = self.key_for(request);
        self.lock().put(
            key,
            CacheEntry {
                result,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drops every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let removed = entries.len();
        entries.clear();
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();
        CacheStats {
            entries: entries.len(),
            capacity: entries.cap().get(),
            ttl_secs: self.ttl.as_secs(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }
}
