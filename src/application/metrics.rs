//! Observability metrics for token issuance and validation.
//!
//! Counters are write-only from the codec's point of view: no decision ever
//! reads them.

use crate::domain::verdict::{AcceptPath, RejectReason, Verdict};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking issued tokens and validation verdicts.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    tokens_issued: AtomicU64,
    accepted_current: AtomicU64,
    accepted_grace: AtomicU64,
    rejected_empty: AtomicU64,
    rejected_mismatch: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub(crate) fn record_issued(&self) {
        self.inner.tokens_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_verdict(&self, verdict: Verdict) {
        let counter = match verdict {
            Verdict::Accept(AcceptPath::Current) => &self.inner.accepted_current,
            Verdict::Accept(AcceptPath::Grace) => &self.inner.accepted_grace,
            Verdict::Reject(RejectReason::EmptyToken) => &self.inner.rejected_empty,
            Verdict::Reject(RejectReason::WindowMismatch) => &self.inner.rejected_mismatch,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Total number of tokens handed out by `generate`.
    pub fn tokens_issued(&self) -> u64 {
        self.inner.tokens_issued.load(Ordering::Relaxed)
    }

    /// Tokens accepted against the current window.
    pub fn accepted_current(&self) -> u64 {
        self.inner.accepted_current.load(Ordering::Relaxed)
    }

    /// Tokens accepted against the previous window during grace.
    pub fn accepted_grace(&self) -> u64 {
        self.inner.accepted_grace.load(Ordering::Relaxed)
    }

    /// Empty submissions.
    pub fn rejected_empty(&self) -> u64 {
        self.inner.rejected_empty.load(Ordering::Relaxed)
    }

    /// Stale, forged or malformed submissions.
    pub fn rejected_mismatch(&self) -> u64 {
        self.inner.rejected_mismatch.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tokens_issued: self.tokens_issued(),
            accepted_current: self.accepted_current(),
            accepted_grace: self.accepted_grace(),
            rejected_empty: self.rejected_empty(),
            rejected_mismatch: self.rejected_mismatch(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.tokens_issued.store(0, Ordering::Relaxed);
        self.inner.accepted_current.store(0, Ordering::Relaxed);
        self.inner.accepted_grace.store(0, Ordering::Relaxed);
        self.inner.rejected_empty.store(0, Ordering::Relaxed);
        self.inner.rejected_mismatch.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub tokens_issued: u64,
    pub accepted_current: u64,
    pub accepted_grace: u64,
    pub rejected_empty: u64,
    pub rejected_mismatch: u64,
}

impl MetricsSnapshot {
    /// Total accepted tokens.
    pub fn accepted(&self) -> u64 {
        self.accepted_current.saturating_add(self.accepted_grace)
    }

    /// Total rejected tokens.
    pub fn rejected(&self) -> u64 {
        self.rejected_empty.saturating_add(self.rejected_mismatch)
    }

    /// Total validations performed.
    pub fn total_validations(&self) -> u64 {
        self.accepted().saturating_add(self.rejected())
    }

    /// Ratio of accepted to total validations (0.0 to 1.0).
    ///
    /// Returns 0.0 if nothing has been validated.
    pub fn acceptance_rate(&self) -> f64 {
        let total = self.total_validations();
        if total == 0 {
            0.0
        } else {
            self.accepted() as f64 / total as f64
        }
    }
}
