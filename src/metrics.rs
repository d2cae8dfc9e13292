//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `ledger_transactions_committed_total` - Committed submissions
//! - `ledger_transactions_rejected_total` - Rejected submissions
//! - `ledger_submit_duration_seconds` - Histogram of submit latencies
//! - `ledger_accounts_open` - Currently open accounts

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone, Debug)]
pub struct Metrics {
    /// Committed submissions
    pub committed_total: IntCounter,

    /// Rejected submissions
    pub rejected_total: IntCounter,

    /// Submit latency histogram
    pub submit_duration: Histogram,

    /// Currently open accounts
    pub accounts_open: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let committed_total = IntCounter::new(
            "ledger_transactions_committed_total",
            "Committed submissions",
        )?;
        registry.register(Box::new(committed_total.clone()))?;

        let rejected_total = IntCounter::new(
            "ledger_transactions_rejected_total",
            "Rejected submissions",
        )?;
        registry.register(Box::new(rejected_total.clone()))?;

        let submit_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ledger_submit_duration_seconds",
                "Histogram of submit latencies",
            )
            .buckets(vec![
                0.0001, 0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250,
            ]),
        )?;
        registry.register(Box::new(submit_duration.clone()))?;

        let accounts_open = IntGauge::new("ledger_accounts_open", "Currently open accounts")?;
        registry.register(Box::new(accounts_open.clone()))?;

        Ok(Self {
            committed_total,
            rejected_total,
            submit_duration,
            accounts_open,
            registry,
        })
    }

    /// Record a committed submission
    pub fn record_commit(&self, duration_seconds: f64) {
        self.committed_total.inc();
        self.submit_duration.observe(duration_seconds);
    }

    /// Record a rejected submission
    pub fn record_reject(&self, duration_seconds: f64) {
        self.rejected_total.inc();
        self.submit_duration.observe(duration_seconds);
    }

    /// Record an account opening
    pub fn record_account_opened(&self) {
        self.accounts_open.inc();
    }

    /// Record an account closing
    pub fn record_account_closed(&self) {
        self.accounts_open.dec();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.committed_total.get(), 0);
        assert_eq!(metrics.rejected_total.get(), 0);
        assert_eq!(metrics.accounts_open.get(), 0);
    }

    #[test]
    fn test_record_commit_and_reject() {
        let metrics = Metrics::new().unwrap();
        metrics.record_commit(0.001);
        metrics.record_commit(0.002);
        metrics.record_reject(0.001);

        assert_eq!(metrics.committed_total.get(), 2);
        assert_eq!(metrics.rejected_total.get(), 1);
    }

    #[test]
    fn test_account_gauge() {
        let metrics = Metrics::new().unwrap();
        metrics.record_account_opened();
        metrics.record_account_opened();
        metrics.record_account_closed();
        assert_eq!(metrics.accounts_open.get(), 1);
    }

    #[test]
    fn test_independent_registries() {
        // each ledger instance owns its registry, so two collectors coexist
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_commit(0.001);
        assert_eq!(b.committed_total.get(), 0);
    }
}
