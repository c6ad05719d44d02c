use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub targets_total: u64,
    pub targets_processed: u64,
    pub targets_succeeded: u64,
    pub targets_failed: u64,
    pub navigation_failures: u64,
    pub not_found_failures: u64,
    pub readiness_timeouts: u64,
    pub success_rate: f64,
    pub avg_extraction_ms: u64,
    pub elapsed_seconds: f64,
}
