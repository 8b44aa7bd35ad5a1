//! # Metrics for the text delivery engine.
//!
//! Lightweight counters and latency aggregates, kept dependency-free. The
//! engine records per-strategy attempts and the final disposition of each
//! logical request; hosts read the snapshot for dashboards or logs.

use crate::error::InjectionError;
use crate::types::InjectionStrategy;
use std::collections::HashMap;

/// Per-strategy performance counters.
#[derive(Debug, Default, Clone)]
pub struct StrategyMetrics {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub sum_latency_ms: u64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

impl StrategyMetrics {
    pub fn mean_latency_ms(&self) -> f64 {
        if self.successes == 0 {
            0.0
        } else {
            self.sum_latency_ms as f64 / self.successes as f64
        }
    }
}

/// Aggregate metrics for the whole engine.
#[derive(Debug, Default, Clone)]
pub struct InjectionMetrics {
    /// Logical requests received (one per `inject_text` call).
    pub total_requests: u64,
    /// Requests that ended in `Completed`.
    pub total_successes: u64,
    /// Requests that ended in `Failed`.
    pub total_failures: u64,
    /// Final failure causes, keyed by error kind name.
    pub failures_by_kind: HashMap<String, u64>,
    /// Per-strategy attempt counters.
    pub strategy_metrics: HashMap<InjectionStrategy, StrategyMetrics>,
    /// Wall-clock time of the last successful delivery.
    pub last_injection: Option<chrono::DateTime<chrono::Utc>>,
}

impl InjectionMetrics {
    pub fn record_request(&mut self) {
        self.total_requests += 1;
    }

    pub fn record_attempt(&mut self, strategy: InjectionStrategy) {
        self.strategy_metrics.entry(strategy).or_default().attempts += 1;
    }

    pub fn record_attempt_success(&mut self, strategy: InjectionStrategy, latency_ms: u64) {
        let m = self.strategy_metrics.entry(strategy).or_default();
        m.successes += 1;
        m.sum_latency_ms += latency_ms;
        if m.min_latency_ms == 0 || latency_ms < m.min_latency_ms {
            m.min_latency_ms = latency_ms;
        }
        if latency_ms > m.max_latency_ms {
            m.max_latency_ms = latency_ms;
        }
    }

    pub fn record_attempt_failure(&mut self, strategy: InjectionStrategy) {
        self.strategy_metrics.entry(strategy).or_default().failures += 1;
    }

    pub fn record_completed(&mut self) {
        self.total_successes += 1;
        self.last_injection = Some(chrono::Utc::now());
    }

    pub fn record_failed(&mut self, error: &InjectionError) {
        self.total_failures += 1;
        *self
            .failures_by_kind
            .entry(error.kind_name().to_string())
            .or_default() += 1;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.total_successes as f64 / self.total_requests as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_counters_accumulate_per_strategy() {
        let mut metrics = InjectionMetrics::default();
        metrics.record_attempt(InjectionStrategy::DirectUnicode);
        metrics.record_attempt(InjectionStrategy::DirectUnicode);
        metrics.record_attempt_success(InjectionStrategy::DirectUnicode, 12);
        metrics.record_attempt_failure(InjectionStrategy::DirectUnicode);

        let m = &metrics.strategy_metrics[&InjectionStrategy::DirectUnicode];
        assert_eq!(m.attempts, 2);
        assert_eq!(m.successes, 1);
        assert_eq!(m.failures, 1);
        assert_eq!(m.min_latency_ms, 12);
        assert_eq!(m.max_latency_ms, 12);
    }

    #[test]
    fn failures_aggregate_by_kind() {
        let mut metrics = InjectionMetrics::default();
        metrics.record_request();
        metrics.record_failed(&InjectionError::Timeout {
            phase: "inject",
            elapsed_ms: 800,
        });
        metrics.record_failed(&InjectionError::Timeout {
            phase: "inject",
            elapsed_ms: 800,
        });

        assert_eq!(metrics.failures_by_kind["Timeout"], 2);
        assert_eq!(metrics.total_failures, 2);
    }

    #[test]
    fn completion_stamps_last_injection() {
        let mut metrics = InjectionMetrics::default();
        assert!(metrics.last_injection.is_none());
        metrics.record_request();
        metrics.record_completed();
        assert!(metrics.last_injection.is_some());
        assert!((metrics.success_rate() - 1.0).abs() < f64::EPSILON);
    }
}
