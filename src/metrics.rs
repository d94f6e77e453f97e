//! Evaluation counters for profiling plugin behaviour.
//!
//! # Usage
//!
//! ```rust,ignore
//! let report = evaluator.metrics().report();
//! println!("{}", report);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Aggregate counters collected by an [`Evaluator`](crate::eval::Evaluator).
///
/// All counters use relaxed ordering. Values read while evaluations are
/// running may be slightly stale.
#[derive(Debug, Default)]
pub struct EvalMetrics {
    /// `retrieve` calls that returned an answer
    pub evaluations: AtomicU64,
    /// Evaluations rejected before or after `retrieve`, or failed inside it
    pub failures: AtomicU64,
    pub true_tuples: AtomicU64,
    pub unknown_tuples: AtomicU64,
    /// Unknown tuples dropped from atoms without partial answers
    pub dropped_tuples: AtomicU64,
    /// New nogoods submitted by plugins through `learn`
    pub nogoods_learned: AtomicU64,
    /// New nogoods derived by input/output learning
    pub nogoods_derived: AtomicU64,
    /// Learned or derived nogoods that were already known
    pub nogoods_duplicate: AtomicU64,
}

impl EvalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_evaluation(&self, true_tuples: usize, unknown_tuples: usize) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        self.true_tuples
            .fetch_add(true_tuples as u64, Ordering::Relaxed);
        self.unknown_tuples
            .fetch_add(unknown_tuples as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dropped(&self, count: usize) {
        self.dropped_tuples
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_nogood(&self, derived: bool, new: bool) {
        let counter = match (new, derived) {
            (false, _) => &self.nogoods_duplicate,
            (true, false) => &self.nogoods_learned,
            (true, true) => &self.nogoods_derived,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of all counters.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            evaluations: self.evaluations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            true_tuples: self.true_tuples.load(Ordering::Relaxed),
            unknown_tuples: self.unknown_tuples.load(Ordering::Relaxed),
            dropped_tuples: self.dropped_tuples.load(Ordering::Relaxed),
            nogoods_learned: self.nogoods_learned.load(Ordering::Relaxed),
            nogoods_derived: self.nogoods_derived.load(Ordering::Relaxed),
            nogoods_duplicate: self.nogoods_duplicate.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.evaluations,
            &self.failures,
            &self.true_tuples,
            &self.unknown_tuples,
            &self.dropped_tuples,
            &self.nogoods_learned,
            &self.nogoods_derived,
            &self.nogoods_duplicate,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsReport {
    pub evaluations: u64,
    pub failures: u64,
    pub true_tuples: u64,
    pub unknown_tuples: u64,
    pub dropped_tuples: u64,
    pub nogoods_learned: u64,
    pub nogoods_derived: u64,
    pub nogoods_duplicate: u64,
}

impl MetricsReport {
    /// Fraction of evaluations that succeeded.
    pub fn success_rate(&self) -> f64 {
        let total = self.evaluations + self.failures;
        if total == 0 {
            1.0
        } else {
            self.evaluations as f64 / total as f64
        }
    }

    /// New nogoods per successful evaluation.
    pub fn nogoods_per_evaluation(&self) -> f64 {
        if self.evaluations == 0 {
            0.0
        } else {
            (self.nogoods_learned + self.nogoods_derived) as f64 / self.evaluations as f64
        }
    }
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== External Atom Metrics ===")?;
        writeln!(
            f,
            "Evaluations:        {} ({} failures, {:.1}% success)",
            self.evaluations,
            self.failures,
            self.success_rate() * 100.0
        )?;
        writeln!(
            f,
            "Output tuples:      {} true, {} unknown, {} dropped",
            self.true_tuples, self.unknown_tuples, self.dropped_tuples
        )?;
        writeln!(
            f,
            "Nogoods:            {} learned, {} derived, {} duplicate",
            self.nogoods_learned, self.nogoods_derived, self.nogoods_duplicate
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/metrics.rs"]
mod tests;
