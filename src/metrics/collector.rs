use crate::error::Error;
use crate::metrics::snapshot::MetricsSnapshot;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

/// Counters for one sweep. Cheap to clone; clones share the counters.
#[derive(Clone)]
pub struct MetricsCollector {
    targets_total: Arc<AtomicU64>,
    targets_succeeded: Arc<AtomicU64>,
    targets_failed: Arc<AtomicU64>,
    navigation_failures: Arc<AtomicU64>,
    not_found_failures: Arc<AtomicU64>,
    readiness_timeouts: Arc<AtomicU64>,
    total_extraction_ms: Arc<AtomicU64>,
    start_time: Arc<Instant>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            targets_total: Arc::new(AtomicU64::new(0)),
            targets_succeeded: Arc::new(AtomicU64::new(0)),
            targets_failed: Arc::new(AtomicU64::new(0)),
            navigation_failures: Arc::new(AtomicU64::new(0)),
            not_found_failures: Arc::new(AtomicU64::new(0)),
            readiness_timeouts: Arc::new(AtomicU64::new(0)),
            total_extraction_ms: Arc::new(AtomicU64::new(0)),
            start_time: Arc::new(Instant::now()),
        }
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_targets_total(&self, total: u64) {
        self.targets_total.store(total, Ordering::SeqCst);
    }

    pub fn record_success(&self, duration: Duration) {
        self.targets_succeeded.fetch_add(1, Ordering::SeqCst);
        self.total_extraction_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn record_failure(&self, error: &Error, duration: Duration) {
        self.targets_failed.fetch_add(1, Ordering::SeqCst);
        self.total_extraction_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);

        let counter = match error {
            Error::Navigation { .. } => &self.navigation_failures,
            Error::ElementNotFound(_) => &self.not_found_failures,
            Error::ReadinessTimeout { .. } => &self.readiness_timeouts,
            _ => return,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let succeeded = self.targets_succeeded.load(Ordering::SeqCst);
        let failed = self.targets_failed.load(Ordering::SeqCst);
        let processed = succeeded + failed;
        let total_time = self.total_extraction_ms.load(Ordering::SeqCst);

        let success_rate = if processed > 0 {
            (succeeded as f64 / processed as f64) * 100.0
        } else {
            0.0
        };

        let avg_extraction_ms = if processed > 0 {
            total_time / processed
        } else {
            0
        };

        MetricsSnapshot {
            targets_total: self.targets_total.load(Ordering::SeqCst),
            targets_processed: processed,
            targets_succeeded: succeeded,
            targets_failed: failed,
            navigation_failures: self.navigation_failures.load(Ordering::SeqCst),
            not_found_failures: self.not_found_failures.load(Ordering::SeqCst),
            readiness_timeouts: self.readiness_timeouts.load(Ordering::SeqCst),
            success_rate,
            avg_extraction_ms,
            elapsed_seconds: self.start_time.elapsed().as_secs_f64(),
        }
    }
}
