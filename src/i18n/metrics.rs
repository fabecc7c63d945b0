//! Translation metrics.
//!
//! Counters for bundle fetches, fallbacks, stale-result discards and
//! auto-translate passes. One instance is shared (via `Arc`) by the
//! language store and the auto-translator of a session.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Requests sent to a translation endpoint
    api_calls: AtomicUsize,

    /// Translation requests that failed (transport, status or decode)
    api_failures: AtomicUsize,

    /// Bundles served from a static translation file after a remote failure
    static_fallbacks: AtomicUsize,

    /// Bundles that fell all the way back to the base language
    base_fallbacks: AtomicUsize,

    /// Completed requests whose result was dropped because a newer one was issued
    stale_discards: AtomicUsize,

    /// Auto-translate passes that wrote at least one node
    passes_applied: AtomicUsize,

    /// Text nodes overwritten by auto-translate passes
    nodes_translated: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_failure(&self) {
        self.api_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_static_fallback(&self) {
        self.static_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_base_fallback(&self) {
        self.base_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_discard(&self) {
        self.stale_discards.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a pass that overwrote `nodes` text nodes.
    pub fn record_pass_applied(&self, nodes: usize) {
        self.passes_applied.fetch_add(1, Ordering::Relaxed);
        self.nodes_translated.fetch_add(nodes, Ordering::Relaxed);
    }

    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::Relaxed)
    }

    pub fn api_failures(&self) -> usize {
        self.api_failures.load(Ordering::Relaxed)
    }

    pub fn static_fallbacks(&self) -> usize {
        self.static_fallbacks.load(Ordering::Relaxed)
    }

    pub fn base_fallbacks(&self) -> usize {
        self.base_fallbacks.load(Ordering::Relaxed)
    }

    pub fn stale_discards(&self) -> usize {
        self.stale_discards.load(Ordering::Relaxed)
    }

    pub fn passes_applied(&self) -> usize {
        self.passes_applied.load(Ordering::Relaxed)
    }

    pub fn nodes_translated(&self) -> usize {
        self.nodes_translated.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let calls = self.api_calls();
        let failures = self.api_failures();
        let api_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            api_calls: calls,
            api_failures: failures,
            api_success_rate,
            static_fallbacks: self.static_fallbacks(),
            base_fallbacks: self.base_fallbacks(),
            stale_discards: self.stale_discards(),
            passes_applied: self.passes_applied(),
            nodes_translated: self.nodes_translated(),
        }
    }
}

/// Point-in-time snapshot of the counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub api_calls: usize,
    pub api_failures: usize,

    /// API success rate as a percentage (0-100)
    pub api_success_rate: f64,

    pub static_fallbacks: usize,
    pub base_fallbacks: usize,
    pub stale_discards: usize,
    pub passes_applied: usize,
    pub nodes_translated: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Counter Tests ====================

    #[test]
    fn test_record_api_call_and_failure() {
        let metrics = TranslationMetrics::new();

        assert_eq!(metrics.api_calls(), 0);
        metrics.record_api_call();
        metrics.record_api_call();
        metrics.record_api_failure();
        assert_eq!(metrics.api_calls(), 2);
        assert_eq!(metrics.api_failures(), 1);
    }

    #[test]
    fn test_record_fallbacks() {
        let metrics = TranslationMetrics::new();

        metrics.record_static_fallback();
        metrics.record_base_fallback();
        metrics.record_base_fallback();
        assert_eq!(metrics.static_fallbacks(), 1);
        assert_eq!(metrics.base_fallbacks(), 2);
    }

    #[test]
    fn test_record_pass_applied_counts_nodes() {
        let metrics = TranslationMetrics::new();

        metrics.record_pass_applied(3);
        metrics.record_pass_applied(4);
        assert_eq!(metrics.passes_applied(), 2);
        assert_eq!(metrics.nodes_translated(), 7);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = TranslationMetrics::new().report();

        assert_eq!(report.api_calls, 0);
        assert_eq!(report.api_failures, 0);
        assert_eq!(report.api_success_rate, 0.0);
        assert_eq!(report.stale_discards, 0);
    }

    #[test]
    fn test_report_api_success_rate() {
        let metrics = TranslationMetrics::new();

        // 4 calls, 1 failure = 75% success rate
        for _ in 0..4 {
            metrics.record_api_call();
        }
        metrics.record_api_failure();
        metrics.record_stale_discard();

        let report = metrics.report();
        assert_eq!(report.api_calls, 4);
        assert_eq!(report.api_failures, 1);
        assert_eq!(report.api_success_rate, 75.0);
        assert_eq!(report.stale_discards, 1);
    }

    #[test]
    fn test_report_serializes() {
        let metrics = TranslationMetrics::new();
        metrics.record_api_call();

        let json = serde_json::to_string(&metrics.report()).expect("Should serialize");
        assert!(json.contains("\"api_calls\":1"));
    }
}
