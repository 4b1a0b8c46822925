// crates/ratemax-core/src/runtime/sampler.rs
// ============================================================================
// Module: Ratemax Sampler
// Description: One fixed-duration measurement window against a live workload.
// Purpose: Apply a target rate, block for the window, and read delta counters.
// Dependencies: crate::core::sample, crate::interfaces, thiserror
// ============================================================================

//! ## Overview
//! Sampling mutates the live workload's configured rate, blocks for the
//! window duration, then derives throughput from the operation-counter delta
//! and tail latency from the latency-snapshot delta. There are no retries: a
//! failed collaborator call or a stopped workload is fatal to the iteration
//! and surfaced to the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

use crate::core::sample::Sample;
use crate::interfaces::Clock;
use crate::interfaces::MetricsError;
use crate::interfaces::MetricsReader;
use crate::interfaces::RateSpec;
use crate::interfaces::WorkloadControl;
use crate::interfaces::WorkloadError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Sampling errors, all fatal to the current iteration.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// The workload rejected a control operation.
    #[error(transparent)]
    Workload(#[from] WorkloadError),
    /// A metrics read failed.
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    /// The workload stopped while the window was being sampled.
    #[error("workload stopped during sampling window")]
    WorkloadStopped,
}

// ============================================================================
// SECTION: Sampling
// ============================================================================

/// Measures one sampling window at the given target rate.
///
/// Applies the rate spec, records the operation counter, discards a latency
/// snapshot to reset the delta window, blocks for the window, and reads the
/// deltas. The workload liveness check is polled once per wait.
///
/// # Errors
///
/// Returns [`SamplerError`] when a collaborator call fails or the workload
/// stops mid-window. Failures are surfaced, not recovered.
pub fn sample<H>(
    harness: &mut H,
    target_rate: f64,
    window: Duration,
    latency_percentile: f64,
) -> Result<Sample, SamplerError>
where
    H: WorkloadControl + MetricsReader + Clock + ?Sized,
{
    harness.apply_rate(&RateSpec::new(target_rate))?;

    let precount = harness.cycle_count()?;
    // Discarded read resets the delta window to the start of this sample.
    let _ = harness.take_latency_snapshot()?;

    harness.wait(window);
    if !harness.is_running() {
        return Err(SamplerError::WorkloadStopped);
    }

    let postcount = harness.cycle_count()?;
    let snapshot = harness.take_latency_snapshot()?;

    Ok(Sample::from_window(
        target_rate,
        postcount.saturating_sub(precount),
        window.as_secs_f64(),
        &snapshot,
        latency_percentile,
    ))
}
