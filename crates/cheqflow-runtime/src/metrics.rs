//! Pipeline metrics
//!
//! Lightweight shared counters and a duration histogram. Handles clone
//! cheaply and share state, so the pipeline and its callers can observe the
//! same numbers without extra plumbing.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use cheqflow_core::Decision;

/// Counter metric
#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<RwLock<u64>>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter
    pub fn inc(&self) {
        self.add(1);
    }

    /// Add a value to the counter
    pub fn add(&self, value: u64) {
        *self.value.write().unwrap() += value;
    }

    /// Get the current value
    pub fn get(&self) -> u64 {
        *self.value.read().unwrap()
    }

    /// Reset the counter
    pub fn reset(&self) {
        *self.value.write().unwrap() = 0;
    }
}

/// Histogram metric for tracking distributions
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    values: Arc<RwLock<Vec<f64>>>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a value
    pub fn observe(&self, value: f64) {
        self.values.write().unwrap().push(value);
    }

    /// Observe a duration
    pub fn observe_duration(&self, duration: Duration) {
        self.observe(duration.as_secs_f64());
    }

    /// Get count of observations
    pub fn count(&self) -> usize {
        self.values.read().unwrap().len()
    }

    /// Get sum of all values
    pub fn sum(&self) -> f64 {
        self.values.read().unwrap().iter().sum()
    }

    /// Get average value
    pub fn avg(&self) -> f64 {
        let values = self.values.read().unwrap();
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }

    /// Get percentile (0-100)
    pub fn percentile(&self, p: f64) -> f64 {
        let mut values = self.values.read().unwrap().clone();
        if values.is_empty() {
            return 0.0;
        }
        values.sort_by(f64::total_cmp);
        let index = ((p / 100.0) * (values.len() - 1) as f64).round() as usize;
        values[index]
    }

    /// Reset the histogram
    pub fn reset(&self) {
        self.values.write().unwrap().clear();
    }
}

/// Counters and timings for one pipeline instance.
#[derive(Debug, Clone, Default)]
pub struct PipelineMetrics {
    /// Cheques submitted, including resubmissions
    pub received: Counter,
    /// Cheques stopped at basic validation
    pub validation_failures: Counter,
    pub approved: Counter,
    pub rejected: Counter,
    pub flagged: Counter,
    /// Terminal cheques submitted again and returned as-is
    pub resubmissions: Counter,
    /// Collaborator calls that failed and were degraded to warnings
    pub collaborator_failures: Counter,
    /// End-to-end submission duration in seconds
    pub pipeline_seconds: Histogram,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_decision(&self, decision: Decision) {
        match decision {
            Decision::Approved => self.approved.inc(),
            Decision::Rejected => self.rejected.inc(),
            Decision::Flagged => self.flagged.inc(),
        }
    }

    /// Reset every metric
    pub fn reset_all(&self) {
        self.received.reset();
        self.validation_failures.reset();
        self.approved.reset();
        self.rejected.reset();
        self.flagged.reset();
        self.resubmissions.reset();
        self.collaborator_failures.reset();
        self.pipeline_seconds.reset();
    }
}
