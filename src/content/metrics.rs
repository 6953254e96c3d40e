//! Content store counters, reported by the health endpoint.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for one content store instance.
#[derive(Debug, Default)]
pub struct ContentMetrics {
    /// Namespace reads answered from the cache
    cache_hits: AtomicUsize,

    /// Namespace reads that went to disk
    cache_misses: AtomicUsize,

    /// Reads that found no usable file (missing or malformed)
    missing: AtomicUsize,

    /// Requests answered with canonical content under another locale
    fallbacks_served: AtomicUsize,
}

impl ContentMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_missing(&self) {
        self.missing.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let cache_hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            missing: self.missing.load(Ordering::Relaxed),
            fallbacks_served: self.fallbacks_served.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.missing.store(0, Ordering::Relaxed);
        self.fallbacks_served.store(0, Ordering::Relaxed);
    }
}

/// Snapshot of [`ContentMetrics`].
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,
    /// Percentage (0-100)
    pub cache_hit_rate: f64,
    pub missing: usize,
    pub fallbacks_served: usize,
}
