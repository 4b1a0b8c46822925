// crates/ratemax-core/src/core/acceptance.rs
// ============================================================================
// Module: Ratemax Acceptance Checks
// Description: Threshold classification of samples into accept/reject verdicts.
// Purpose: Decide whether a sampled window sustained its target rate.
// Dependencies: crate::core::sample, serde
// ============================================================================

//! ## Overview
//! Acceptance is a pure function over a [`Sample`], the best known achieved
//! rate, and three configured thresholds. Each criterion is independent and
//! reported separately in the verdict so callers can explain rejections:
//! a tail-latency ceiling, a minimum fraction of the target rate, and a
//! minimum fraction of the best rate seen so far in the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::sample::Sample;

// ============================================================================
// SECTION: Thresholds
// ============================================================================

/// Acceptance thresholds for classifying sampled windows.
///
/// # Invariants
/// - Ratios are on the half-open unit interval `(0, 1]`.
/// - `latency_cutoff_ms` is positive.
/// - Construction-time validation is the config layer's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceThresholds {
    /// Maximum allowed latency in milliseconds at `latency_percentile`.
    pub latency_cutoff_ms: f64,
    /// Percentile at which latency is evaluated, on the unit interval.
    pub latency_percentile: f64,
    /// Minimum achieved fraction of the probed target rate.
    pub min_target_ratio: f64,
    /// Minimum achieved fraction of the best known rate.
    pub min_best_ratio: f64,
}

// ============================================================================
// SECTION: Verdicts
// ============================================================================

/// Outcome of checking one sample against the acceptance thresholds.
///
/// # Invariants
/// - Derived, never stored in search state.
/// - `best_ratio` is the sample's ops per second divided by the best known
///   ops per second at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceVerdict {
    /// Latency stayed at or below the cutoff.
    pub latency_ok: bool,
    /// Achieved ratio met the minimum fraction of the target rate.
    pub target_ratio_ok: bool,
    /// Achieved rate met the minimum fraction of the best known rate.
    pub best_ratio_ok: bool,
    /// Achieved rate divided by the best known rate.
    pub best_ratio: f64,
}

impl AcceptanceVerdict {
    /// Returns `true` when every criterion passed.
    #[must_use]
    pub const fn accepted(&self) -> bool {
        self.latency_ok && self.target_ratio_ok && self.best_ratio_ok
    }

    /// Returns the number of failed criteria.
    #[must_use]
    pub const fn failed_checks(&self) -> u32 {
        let mut failed = 0;
        if !self.latency_ok {
            failed += 1;
        }
        if !self.target_ratio_ok {
            failed += 1;
        }
        if !self.best_ratio_ok {
            failed += 1;
        }
        failed
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Checks a sample against the thresholds and the best known rate.
///
/// The evaluation is pure and idempotent: the same sample, best rate, and
/// thresholds always produce the same verdict. The first sample of a run is
/// its own best; callers pass its own ops per second so the best-ratio check
/// trivially passes.
#[must_use]
pub fn evaluate_sample(
    sample: &Sample,
    best_ops_per_second: f64,
    thresholds: &AcceptanceThresholds,
) -> AcceptanceVerdict {
    let best_ratio = if best_ops_per_second > 0.0 {
        sample.ops_per_second / best_ops_per_second
    } else {
        1.0
    };
    AcceptanceVerdict {
        latency_ok: sample.latency_ms <= thresholds.latency_cutoff_ms,
        target_ratio_ok: sample.achieved_ratio >= thresholds.min_target_ratio,
        best_ratio_ok: best_ratio >= thresholds.min_best_ratio,
        best_ratio,
    }
}
