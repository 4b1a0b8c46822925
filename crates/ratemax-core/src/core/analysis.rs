// crates/ratemax-core/src/core/analysis.rs
// ============================================================================
// Module: Ratemax Result Aggregation
// Description: Per-run outcomes and the averaged multi-run summary.
// Purpose: Report the mean achieved rate and latency across repeated runs.
// Dependencies: crate::core::sample, serde
// ============================================================================

//! ## Overview
//! A search run ends in a [`SearchOutcome`] naming the selected iteration and
//! its measured rate and latency. The analysis repeats the run a configured
//! number of times and averages the outcomes; any failed run aborts the whole
//! analysis, so a summary always covers every requested run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::sample::Sample;

// ============================================================================
// SECTION: Run Outcomes
// ============================================================================

/// Result of one completed search run.
///
/// # Invariants
/// - `iteration` is the one-based iteration whose sample was selected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// One-based iteration number of the selected sample.
    pub iteration: u64,
    /// Target rate of the selected sample.
    pub target_rate: f64,
    /// Achieved operations per second of the selected sample.
    pub ops_per_second: f64,
    /// Latency of the selected sample at the configured percentile.
    pub latency_ms: f64,
    /// Wall time the run took, in seconds.
    pub total_seconds: f64,
}

impl SearchOutcome {
    /// Builds an outcome from a selected history entry.
    #[must_use]
    pub fn from_selected(index: usize, sample: Sample, total_seconds: f64) -> Self {
        Self {
            iteration: u64::try_from(index).unwrap_or(u64::MAX).saturating_add(1),
            target_rate: sample.target_rate,
            ops_per_second: sample.ops_per_second,
            latency_ms: sample.latency_ms,
            total_seconds,
        }
    }
}

// ============================================================================
// SECTION: Analysis Summary
// ============================================================================

/// Averaged result of running the search a fixed number of times.
///
/// # Invariants
/// - `runs` is non-empty; averages cover every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Outcome of each run in execution order.
    pub runs: Vec<SearchOutcome>,
    /// Mean achieved operations per second across runs.
    pub average_ops_per_second: f64,
    /// Mean latency in milliseconds across runs.
    pub average_latency_ms: f64,
    /// Total wall time across all runs, in seconds.
    pub total_seconds: f64,
}

impl AnalysisSummary {
    /// Averages a non-empty set of run outcomes.
    ///
    /// Returns `None` when no runs are provided; the runner guarantees at
    /// least one run, so callers treat `None` as a logic error.
    #[must_use]
    pub fn from_runs(runs: Vec<SearchOutcome>) -> Option<Self> {
        if runs.is_empty() {
            return None;
        }
        #[allow(
            clippy::cast_precision_loss,
            reason = "Run counts are small integers far below f64 precision limits."
        )]
        let count = runs.len() as f64;
        let total_ops: f64 = runs.iter().map(|run| run.ops_per_second).sum();
        let total_latency: f64 = runs.iter().map(|run| run.latency_ms).sum();
        let total_seconds: f64 = runs.iter().map(|run| run.total_seconds).sum();
        Some(Self {
            runs,
            average_ops_per_second: total_ops / count,
            average_latency_ms: total_latency / count,
            total_seconds,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only assertions and helpers are permitted."
    )]

    use super::AnalysisSummary;
    use super::SearchOutcome;

    /// Builds an outcome with the given rate and latency.
    fn outcome(ops: f64, latency: f64, seconds: f64) -> SearchOutcome {
        SearchOutcome {
            iteration: 1,
            target_rate: ops,
            ops_per_second: ops,
            latency_ms: latency,
            total_seconds: seconds,
        }
    }

    #[test]
    fn summary_averages_rate_and_latency() {
        let summary = AnalysisSummary::from_runs(vec![
            outcome(1000.0, 10.0, 30.0),
            outcome(2000.0, 20.0, 40.0),
        ]);
        let Some(summary) = summary else {
            unreachable!("two runs were provided");
        };
        assert!((summary.average_ops_per_second - 1500.0).abs() < f64::EPSILON);
        assert!((summary.average_latency_ms - 15.0).abs() < f64::EPSILON);
        assert!((summary.total_seconds - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_rejects_empty_run_set() {
        assert!(AnalysisSummary::from_runs(Vec::new()).is_none());
    }
}
