//! Pushdown counters
//!
//! - Counters only
//! - Monotonic increase
//! - Relaxed atomics, shared across queries without locking

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the query path
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Queries answered through a backend predicate
    pushdown_eligible: AtomicU64,
    /// Queries answered by full scan and in-memory filtering
    pushdown_fallback: AtomicU64,
    /// Queries rejected (malformed filter, corrupted value, schema error)
    queries_rejected: AtomicU64,
    /// Rows returned by the backend
    documents_scanned: AtomicU64,
    /// Rows returned to the caller
    documents_returned: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_pushdown_eligible(&self) {
        self.pushdown_eligible.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_pushdown_fallback(&self) {
        self.pushdown_fallback.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_documents(&self, scanned: u64, returned: u64) {
        self.documents_scanned.fetch_add(scanned, Ordering::Relaxed);
        self.documents_returned.fetch_add(returned, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pushdown_eligible: self.pushdown_eligible.load(Ordering::Relaxed),
            pushdown_fallback: self.pushdown_fallback.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            documents_scanned: self.documents_scanned.load(Ordering::Relaxed),
            documents_returned: self.documents_returned.load(Ordering::Relaxed),
        }
    }
}

/// Copy of the counters at one moment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub pushdown_eligible: u64,
    pub pushdown_fallback: u64,
    pub queries_rejected: u64,
    pub documents_scanned: u64,
    pub documents_returned: u64,
}

impl MetricsSnapshot {
    pub fn queries_executed(&self) -> u64 {
        self.pushdown_eligible + self.pushdown_fallback
    }
}
