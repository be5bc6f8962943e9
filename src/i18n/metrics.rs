//! Translation metrics and observability.
//!
//! Counters are owned by one `TranslationService`, so two services in the
//! same process (tests, multiple tenants) never share numbers.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-service lookup counters.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Batches answered entirely by the memory cache
    memory_hits: AtomicUsize,

    /// Keys resolved from the persistent cache
    persistent_hits: AtomicUsize,

    /// Keys short-circuited by the negative-key registry
    negative_hits: AtomicUsize,

    /// Keys sent to the backend
    keys_fetched: AtomicUsize,

    /// Batched requests issued to the backend
    network_calls: AtomicUsize,

    /// Batched requests that ended in the key-as-literal fallback
    network_failures: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_memory_hit(&self) {
        self.memory_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persistent_hits(&self, count: usize) {
        self.persistent_hits.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_negative_hits(&self, count: usize) {
        self.negative_hits.fetch_add(count, Ordering::Relaxed);
    }

    /// Record one batched request carrying `keys` keys.
    pub fn record_network_call(&self, keys: usize) {
        self.network_calls.fetch_add(1, Ordering::Relaxed);
        self.keys_fetched.fetch_add(keys, Ordering::Relaxed);
    }

    pub fn record_network_failure(&self) {
        self.network_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn memory_hits(&self) -> usize {
        self.memory_hits.load(Ordering::Relaxed)
    }

    pub fn persistent_hits(&self) -> usize {
        self.persistent_hits.load(Ordering::Relaxed)
    }

    pub fn negative_hits(&self) -> usize {
        self.negative_hits.load(Ordering::Relaxed)
    }

    pub fn keys_fetched(&self) -> usize {
        self.keys_fetched.load(Ordering::Relaxed)
    }

    pub fn network_calls(&self) -> usize {
        self.network_calls.load(Ordering::Relaxed)
    }

    pub fn network_failures(&self) -> usize {
        self.network_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let calls = self.network_calls();
        let failures = self.network_failures();
        let network_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            memory_hits: self.memory_hits(),
            persistent_hits: self.persistent_hits(),
            negative_hits: self.negative_hits(),
            keys_fetched: self.keys_fetched(),
            network_calls: calls,
            network_failures: failures,
            network_success_rate,
        }
    }
}

/// Snapshot of the current counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub memory_hits: usize,
    pub persistent_hits: usize,
    pub negative_hits: usize,
    pub keys_fetched: usize,
    pub network_calls: usize,
    pub network_failures: usize,

    /// Successful batched requests as a percentage (0-100)
    pub network_success_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Counter Tests ====================

    #[test]
    fn test_new_metrics_start_at_zero() {
        let metrics = TranslationMetrics::new();

        assert_eq!(metrics.memory_hits(), 0);
        assert_eq!(metrics.persistent_hits(), 0);
        assert_eq!(metrics.negative_hits(), 0);
        assert_eq!(metrics.network_calls(), 0);
    }

    #[test]
    fn test_record_network_call_counts_keys() {
        let metrics = TranslationMetrics::new();

        metrics.record_network_call(3);
        metrics.record_network_call(2);

        assert_eq!(metrics.network_calls(), 2);
        assert_eq!(metrics.keys_fetched(), 5);
    }

    #[test]
    fn test_record_hits() {
        let metrics = TranslationMetrics::new();

        metrics.record_memory_hit();
        metrics.record_persistent_hits(4);
        metrics.record_negative_hits(1);

        assert_eq!(metrics.memory_hits(), 1);
        assert_eq!(metrics.persistent_hits(), 4);
        assert_eq!(metrics.negative_hits(), 1);
    }

    #[test]
    fn test_instances_are_independent() {
        let first = TranslationMetrics::new();
        let second = TranslationMetrics::new();

        first.record_memory_hit();

        assert_eq!(first.memory_hits(), 1);
        assert_eq!(second.memory_hits(), 0);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = TranslationMetrics::new().report();

        assert_eq!(report.network_calls, 0);
        assert_eq!(report.network_success_rate, 0.0);
    }

    #[test]
    fn test_report_network_success_rate() {
        let metrics = TranslationMetrics::new();

        // 4 calls, 1 failure = 75% success rate
        for _ in 0..4 {
            metrics.record_network_call(1);
        }
        metrics.record_network_failure();

        let report = metrics.report();
        assert_eq!(report.network_failures, 1);
        assert_eq!(report.network_success_rate, 75.0);
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_string(&TranslationMetrics::new().report())
            .expect("Should serialize");
        assert!(json.contains("network_success_rate"));
        assert!(json.contains("persistent_hits"));
    }
}
