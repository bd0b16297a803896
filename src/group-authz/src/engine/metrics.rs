//! Evaluation metrics for engine observability

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// Default number of latency samples kept for percentiles
pub const DEFAULT_MAX_SAMPLES: usize = 10_000;

/// Engine evaluation metrics
#[derive(Debug, Clone, Default)]
pub struct EngineMetrics {
    /// Total number of evaluations that produced a decision
    pub total_evaluations: u64,

    /// Decisions granting access
    pub granted: u64,

    /// Decisions denying access after the policy applied
    pub denied: u64,

    /// Decisions denying access because the policy did not apply
    pub not_applicable: u64,

    /// Latency percentiles (p50, p90, p95, p99, p99.9)
    pub latency_p50_ms: f64,
    pub latency_p90_ms: f64,
    pub latency_p95_ms: f64,
    pub latency_p99_ms: f64,
    pub latency_p999_ms: f64,

    /// Average latency
    pub avg_latency_ms: f64,

    /// Evaluations that failed with an error
    pub error_count: u64,
}

impl EngineMetrics {
    /// Share of decisions that granted access
    pub fn grant_rate(&self) -> f64 {
        if self.total_evaluations == 0 {
            0.0
        } else {
            self.granted as f64 / self.total_evaluations as f64
        }
    }
}

/// Kind of decision recorded by the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    Granted,
    Denied,
    NotApplicable,
}

/// Metrics collector
pub struct MetricsCollector {
    metrics: Arc<RwLock<EngineMetrics>>,

    /// Latency samples for percentile calculation
    latency_samples: Arc<RwLock<Vec<f64>>>,

    max_samples: usize,
}

impl MetricsCollector {
    /// Create a collector with the default sample window
    pub fn new() -> Self {
        Self::with_max_samples(DEFAULT_MAX_SAMPLES)
    }

    /// Create a collector keeping at most `max_samples` latency samples
    pub fn with_max_samples(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            metrics: Arc::new(RwLock::new(EngineMetrics::default())),
            latency_samples: Arc::new(RwLock::new(Vec::with_capacity(max_samples.min(DEFAULT_MAX_SAMPLES)))),
            max_samples,
        }
    }

    /// Record a decision
    pub fn record_decision(&self, kind: DecisionKind) {
        let mut metrics = self.metrics.write();
        metrics.total_evaluations += 1;

        match kind {
            DecisionKind::Granted => metrics.granted += 1,
            DecisionKind::Denied => metrics.denied += 1,
            DecisionKind::NotApplicable => metrics.not_applicable += 1,
        }
    }

    /// Record evaluation latency
    pub fn record_latency(&self, latency: Duration) {
        let latency_ms = latency.as_secs_f64() * 1000.0;

        let mut samples = self.latency_samples.write();
        samples.push(latency_ms);

        // Drop the oldest tenth once the window is full
        if samples.len() > self.max_samples {
            let excess = samples.len() - self.max_samples;
            let drop = excess.max(self.max_samples / 10);
            let keep = samples.len() - 1;
            samples.drain(0..drop.min(keep));
        }

        let mut metrics = self.metrics.write();

        let sum: f64 = samples.iter().sum();
        metrics.avg_latency_ms = sum / samples.len() as f64;

        let mut sorted = samples.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        metrics.latency_p50_ms = Self::percentile(&sorted, 0.50);
        metrics.latency_p90_ms = Self::percentile(&sorted, 0.90);
        metrics.latency_p95_ms = Self::percentile(&sorted, 0.95);
        metrics.latency_p99_ms = Self::percentile(&sorted, 0.99);
        metrics.latency_p999_ms = Self::percentile(&sorted, 0.999);
    }

    /// Record a failed evaluation
    pub fn record_error(&self) {
        self.metrics.write().error_count += 1;
    }

    /// Current metrics snapshot
    pub fn get_metrics(&self) -> EngineMetrics {
        self.metrics.read().clone()
    }

    /// Number of latency samples held
    pub fn sample_count(&self) -> usize {
        self.latency_samples.read().len()
    }

    /// Reset all metrics
    pub fn reset(&self) {
        *self.metrics.write() = EngineMetrics::default();
        self.latency_samples.write().clear();
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        let metrics = self.metrics.read();

        format!(
            r#"# HELP group_authz_evaluations_total Total number of group-membership evaluations
# TYPE group_authz_evaluations_total counter
group_authz_evaluations_total {}

# HELP group_authz_granted_total Evaluations granting access
# TYPE group_authz_granted_total counter
group_authz_granted_total {}

# HELP group_authz_denied_total Evaluations denying access
# TYPE group_authz_denied_total counter
group_authz_denied_total {}

# HELP group_authz_not_applicable_total Evaluations where the policy did not apply
# TYPE group_authz_not_applicable_total counter
group_authz_not_applicable_total {}

# HELP group_authz_latency_seconds Evaluation latency percentiles
# TYPE group_authz_latency_seconds summary
group_authz_latency_seconds{{quantile="0.5"}} {}
group_authz_latency_seconds{{quantile="0.9"}} {}
group_authz_latency_seconds{{quantile="0.95"}} {}
group_authz_latency_seconds{{quantile="0.99"}} {}
group_authz_latency_seconds{{quantile="0.999"}} {}

# HELP group_authz_errors_total Failed evaluations
# TYPE group_authz_errors_total counter
group_authz_errors_total {}
"#,
            metrics.total_evaluations,
            metrics.granted,
            metrics.denied,
            metrics.not_applicable,
            metrics.latency_p50_ms / 1000.0,
            metrics.latency_p90_ms / 1000.0,
            metrics.latency_p95_ms / 1000.0,
            metrics.latency_p99_ms / 1000.0,
            metrics.latency_p999_ms / 1000.0,
            metrics.error_count,
        )
    }

    /// Percentile of sorted data
    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }

        let idx = ((sorted.len() as f64) * p) as usize;
        sorted[idx.min(sorted.len() - 1)]
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
