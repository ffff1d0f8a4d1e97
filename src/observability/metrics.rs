//! Per-session counters
//!
//! - Counters only, monotonic
//! - Atomic, so a shared reference is enough to record

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of one browsing session
#[derive(Debug, Default)]
pub struct BrowseMetrics {
    chunks_loaded: AtomicU64,
    records_loaded: AtomicU64,
    chunk_failures: AtomicU64,
    full_recomputes: AtomicU64,
    incremental_appends: AtomicU64,
    searches_executed: AtomicU64,
    searches_rejected: AtomicU64,
    relation_merges: AtomicU64,
    merged_records: AtomicU64,
}

impl BrowseMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Loading

    /// Record one delivered chunk of `records` cases
    pub fn record_chunk(&self, records: u64) {
        self.chunks_loaded.fetch_add(1, Ordering::Relaxed);
        self.records_loaded.fetch_add(records, Ordering::Relaxed);
    }

    pub fn increment_chunk_failures(&self) {
        self.chunk_failures.fetch_add(1, Ordering::Relaxed);
    }

    // Pipeline

    pub fn increment_full_recomputes(&self) {
        self.full_recomputes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_incremental_appends(&self) {
        self.incremental_appends.fetch_add(1, Ordering::Relaxed);
    }

    // Search

    pub fn increment_searches_executed(&self) {
        self.searches_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_searches_rejected(&self) {
        self.searches_rejected.fetch_add(1, Ordering::Relaxed);
    }

    // Relations

    /// Record one merge over a window of `records` cases
    pub fn record_merge(&self, records: u64) {
        self.relation_merges.fetch_add(1, Ordering::Relaxed);
        self.merged_records.fetch_add(records, Ordering::Relaxed);
    }

    /// Take a consistent-enough snapshot of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            chunks_loaded: self.chunks_loaded.load(Ordering::Relaxed),
            records_loaded: self.records_loaded.load(Ordering::Relaxed),
            chunk_failures: self.chunk_failures.load(Ordering::Relaxed),
            full_recomputes: self.full_recomputes.load(Ordering::Relaxed),
            incremental_appends: self.incremental_appends.load(Ordering::Relaxed),
            searches_executed: self.searches_executed.load(Ordering::Relaxed),
            searches_rejected: self.searches_rejected.load(Ordering::Relaxed),
            relation_merges: self.relation_merges.load(Ordering::Relaxed),
            merged_records: self.merged_records.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of `BrowseMetrics`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub chunks_loaded: u64,
    pub records_loaded: u64,
    pub chunk_failures: u64,
    pub full_recomputes: u64,
    pub incremental_appends: u64,
    pub searches_executed: u64,
    pub searches_rejected: u64,
    pub relation_merges: u64,
    pub merged_records: u64,
}

impl MetricsSnapshot {
    /// Serialize to a JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
