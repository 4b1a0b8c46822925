// crates/ratemax-core/src/core/sample.rs
// ============================================================================
// Module: Ratemax Sample Model
// Description: Immutable measurement records for one sampling window.
// Purpose: Capture throughput and tail latency for a probed target rate.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Sample`] is produced once per measurement window and never mutated
//! afterwards. It records what rate was requested, what the workload actually
//! achieved, and the tail latency observed at the configured percentile.
//! Latency comes in as a [`LatencySnapshot`] delta read from the metrics
//! collaborator and is collapsed to a single percentile value at sample
//! construction time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Latency Snapshots
// ============================================================================

/// One recorded latency quantile within a snapshot.
///
/// # Invariants
/// - `quantile` is on the unit interval.
/// - `latency_ms` is non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantilePoint {
    /// Quantile on the unit interval (for example `0.99`).
    pub quantile: f64,
    /// Latency at the quantile, in milliseconds.
    pub latency_ms: f64,
}

/// Latency-quantile snapshot covering one measurement window.
///
/// # Invariants
/// - Points are ordered by ascending quantile.
/// - The snapshot is a delta: it covers only the window since the previous
///   snapshot was taken from the same reader.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LatencySnapshot {
    /// Recorded quantile points in ascending quantile order.
    pub points: Vec<QuantilePoint>,
}

impl LatencySnapshot {
    /// Creates a snapshot from quantile points ordered by ascending quantile.
    #[must_use]
    pub fn new(points: Vec<QuantilePoint>) -> Self {
        Self {
            points,
        }
    }

    /// Returns the latency in milliseconds at the requested percentile.
    ///
    /// Lookup picks the smallest recorded quantile at or above the request,
    /// falling back to the highest recorded quantile. An empty snapshot
    /// reports zero latency.
    #[must_use]
    pub fn value_ms(&self, percentile: f64) -> f64 {
        for point in &self.points {
            if point.quantile >= percentile {
                return point.latency_ms;
            }
        }
        self.points.last().map_or(0.0, |point| point.latency_ms)
    }
}

// ============================================================================
// SECTION: Samples
// ============================================================================

/// Measurement of one sampling window at a probed target rate.
///
/// # Invariants
/// - Immutable once recorded; the controller appends samples to history and
///   never rewrites them.
/// - `achieved_ratio` equals `ops_per_second / target_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Requested operations per second for the window.
    pub target_rate: f64,
    /// Operation count observed over the window.
    pub cycle_count: u64,
    /// Achieved operations per second over the window.
    pub ops_per_second: f64,
    /// Achieved ops per second divided by the target rate.
    pub achieved_ratio: f64,
    /// Latency at the configured percentile, in milliseconds.
    pub latency_ms: f64,
    /// Sampling window length in seconds.
    pub window_seconds: f64,
}

impl Sample {
    /// Builds a sample from a window's counter delta and latency snapshot.
    #[must_use]
    pub fn from_window(
        target_rate: f64,
        cycle_count: u64,
        window_seconds: f64,
        snapshot: &LatencySnapshot,
        percentile: f64,
    ) -> Self {
        #[allow(
            clippy::cast_precision_loss,
            reason = "Cycle counts stay far below the f64 exact-integer range."
        )]
        let ops_per_second = if window_seconds > 0.0 {
            cycle_count as f64 / window_seconds
        } else {
            0.0
        };
        let achieved_ratio = if target_rate > 0.0 {
            ops_per_second / target_rate
        } else {
            0.0
        };
        Self {
            target_rate,
            cycle_count,
            ops_per_second,
            achieved_ratio,
            latency_ms: snapshot.value_ms(percentile),
            window_seconds,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
