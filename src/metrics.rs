//! Dispatcher-side Prometheus metrics (spec §4.10, C9).
//!
//! Grounded in `example/common/attester/models/metrics.go`: an active-
//! requests gauge, a total-requests counter, and a request-duration
//! histogram, all labeled by computation kind. The histogram reuses the
//! same bucket set (seconds) the attester itself registers.
use std::sync::LazyLock;

use prometheus::{
    HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry, register_histogram_vec_with_registry,
    register_int_counter_vec_with_registry, register_int_gauge_vec_with_registry,
};

/// `[0.01, 0.1, 1, 2, 5, 10, 25, 30, 45, 60, 120, 240, 480]` seconds,
/// matching `metrics.go`'s `requestDuration` buckets exactly.
pub const DURATION_BUCKETS: &[f64] = &[
    0.01, 0.1, 1.0, 2.0, 5.0, 10.0, 25.0, 30.0, 45.0, 60.0, 120.0, 240.0, 480.0,
];

/// Per-dispatcher metrics registry, separate from any process-global
/// default registry so a dispatcher can be constructed more than once in
/// a test without double-registering collectors.
pub struct DispatcherMetrics {
    pub registry: Registry,
    pub active_requests: IntGaugeVec,
    pub total_requests: IntCounterVec,
    pub request_duration: HistogramVec,
}

impl DispatcherMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let active_requests = register_int_gauge_vec_with_registry!(
            Opts::new("dispatcher_active_requests", "Number of requests currently in flight"),
            &["computation"],
            registry
        )
        .expect("metric registration is infallible for a fresh registry");
        let total_requests = register_int_counter_vec_with_registry!(
            Opts::new("dispatcher_total_requests", "Total number of requests dispatched"),
            &["computation"],
            registry
        )
        .expect("metric registration is infallible for a fresh registry");
        let request_duration = register_histogram_vec_with_registry!(
            HistogramOpts::new("dispatcher_request_duration_seconds", "Attester round-trip latency")
                .buckets(DURATION_BUCKETS.to_vec()),
            &["computation"],
            registry
        )
        .expect("metric registration is infallible for a fresh registry");
        Self { registry, active_requests, total_requests, request_duration }
    }

    pub fn observe_start(&self, computation: &str) {
        self.active_requests.with_label_values(&[computation]).inc();
        self.total_requests.with_label_values(&[computation]).inc();
    }

    pub fn observe_finish(&self, computation: &str, elapsed_seconds: f64) {
        self.active_requests.with_label_values(&[computation]).dec();
        self.request_duration
            .with_label_values(&[computation])
            .observe(elapsed_seconds);
    }
}

impl Default for DispatcherMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A process-wide default instance for binaries that do not construct
/// their own dispatcher (`src/bin/attester.rs`); library callers building
/// their own [`crate::dispatcher::Dispatcher`] should prefer
/// `DispatcherMetrics::new()` so tests don't share state.
pub static METRICS: LazyLock<DispatcherMetrics> = LazyLock::new(DispatcherMetrics::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_then_finish_leaves_gauge_at_zero() {
        let m = DispatcherMetrics::new();
        m.observe_start("img_class");
        assert_eq!(m.active_requests.with_label_values(&["img_class"]).get(), 1);
        m.observe_finish("img_class", 0.25);
        assert_eq!(m.active_requests.with_label_values(&["img_class"]).get(), 0);
        assert_eq!(m.total_requests.with_label_values(&["img_class"]).get(), 1);
    }
}
