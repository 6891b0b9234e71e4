use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing digest activity.
#[derive(Default)]
pub struct DigestMetrics {
    runs_completed: AtomicU64,
    papers_recorded: AtomicU64,
    papers_skipped: AtomicU64,
}

impl DigestMetrics {
    /// Start all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed run together with its recorded and skipped paper counts.
    pub fn record_run(&self, recorded: u64, skipped: u64) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
        self.papers_recorded.fetch_add(recorded, Ordering::Relaxed);
        self.papers_skipped.fetch_add(skipped, Ordering::Relaxed);
    }

    /// Copy the current counter values out for reporting.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_completed: self.runs_completed.load(Ordering::Relaxed),
            papers_recorded: self.papers_recorded.load(Ordering::Relaxed),
            papers_skipped: self.papers_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of digest counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of digest runs completed since startup.
    pub runs_completed: u64,
    /// Total papers written to digest files across all runs.
    pub papers_recorded: u64,
    /// Total papers skipped because a per-paper stage failed.
    pub papers_skipped: u64,
}
