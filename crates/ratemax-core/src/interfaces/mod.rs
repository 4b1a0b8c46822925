// crates/ratemax-core/src/interfaces/mod.rs
// ============================================================================
// Module: Ratemax Interfaces
// Description: Collaborator interfaces for workload control, metrics, and time.
// Purpose: Define the contract surfaces the search runtime drives, replacing
// host-injected ambient state with explicit dependencies.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! The search consumes four external collaborators: a workload-rate setter, a
//! metrics reader exposing monotonic counters and latency-quantile deltas, a
//! wait/clock primitive, and observability sinks for gauges and progress
//! events. Each is an explicit trait so hosts inject their own engine and
//! tests inject scripted fakes. Implementations must surface failures rather
//! than recover: a failed collaborator call is fatal to the iteration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::acceptance::AcceptanceVerdict;
use crate::core::analysis::AnalysisSummary;
use crate::core::analysis::SearchOutcome;
use crate::core::sample::LatencySnapshot;
use crate::core::sample::Sample;

// ============================================================================
// SECTION: Rate Specs
// ============================================================================

/// Default burst ratio applied to rate specs.
pub const DEFAULT_BURST_RATIO: f64 = 1.1;

/// String-encoded workload rate specification.
///
/// # Invariants
/// - Wire form is `"<ops_per_second>:<burst_ratio>:restart"` and round-trips
///   through [`fmt::Display`] and [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSpec {
    /// Target operations per second.
    pub ops_per_second: f64,
    /// Burst ratio allowed above the target rate.
    pub burst_ratio: f64,
}

impl RateSpec {
    /// Creates a rate spec at the default burst ratio.
    #[must_use]
    pub const fn new(ops_per_second: f64) -> Self {
        Self {
            ops_per_second,
            burst_ratio: DEFAULT_BURST_RATIO,
        }
    }
}

impl fmt::Display for RateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:restart", self.ops_per_second, self.burst_ratio)
    }
}

/// Errors parsing a string-encoded rate spec.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateSpecParseError {
    /// The rate spec did not have three colon-separated fields.
    #[error("rate spec must be <rate>:<burst>:restart, got {0:?}")]
    Malformed(String),
    /// A numeric field failed to parse.
    #[error("rate spec field {field} is not a number: {value:?}")]
    BadNumber {
        /// Field name that failed to parse.
        field: &'static str,
        /// Offending field text.
        value: String,
    },
}

impl FromStr for RateSpec {
    type Err = RateSpecParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split(':');
        let (Some(rate), Some(burst), Some("restart"), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(RateSpecParseError::Malformed(s.to_owned()));
        };
        let ops_per_second = rate.parse().map_err(|_| RateSpecParseError::BadNumber {
            field: "rate",
            value: rate.to_owned(),
        })?;
        let burst_ratio = burst.parse().map_err(|_| RateSpecParseError::BadNumber {
            field: "burst",
            value: burst.to_owned(),
        })?;
        Ok(Self {
            ops_per_second,
            burst_ratio,
        })
    }
}

// ============================================================================
// SECTION: Workload Control
// ============================================================================

/// Workload control errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// The workload rejected the rate specification.
    #[error("workload rejected rate spec {spec}: {reason}")]
    RateRejected {
        /// Rate spec that was rejected.
        spec: String,
        /// Workload-reported reason.
        reason: String,
    },
    /// The workload reported an error.
    #[error("workload error: {0}")]
    Workload(String),
}

/// Rate setter and liveness check for a live workload.
pub trait WorkloadControl {
    /// Applies a new rate specification to the running workload.
    ///
    /// # Errors
    ///
    /// Returns [`WorkloadError`] when the workload cannot apply the rate.
    fn apply_rate(&mut self, spec: &RateSpec) -> Result<(), WorkloadError>;

    /// Reports whether the workload is still running.
    ///
    /// Polled once per sampling wait; a stopped workload aborts the run.
    fn is_running(&self) -> bool;
}

// ============================================================================
// SECTION: Metrics Reader
// ============================================================================

/// Metrics read errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The metrics backend reported a read failure.
    #[error("metrics read failed: {0}")]
    ReadFailed(String),
}

/// Reader over the workload's monotonic counters and latency quantiles.
pub trait MetricsReader {
    /// Returns the monotonic operation counter.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] when the counter cannot be read. The failure
    /// is fatal to the current iteration; there is no retry.
    fn cycle_count(&mut self) -> Result<u64, MetricsError>;

    /// Takes the latency-quantile delta since the previous snapshot.
    ///
    /// The first call after a rate change is typically discarded to reset
    /// the delta window.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] when the snapshot cannot be read.
    fn take_latency_snapshot(&mut self) -> Result<LatencySnapshot, MetricsError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Blocking wait and monotonic time source.
///
/// The search never reads wall-clock time directly; hosts supply a clock so
/// simulated workloads can advance time instantly and deterministically.
pub trait Clock {
    /// Blocks for the given duration.
    fn wait(&mut self, duration: Duration);

    /// Returns monotonic time elapsed since the clock was created.
    fn elapsed(&self) -> Duration;
}

// ============================================================================
// SECTION: Gauge Sink
// ============================================================================

/// Gauges reported during a search for external observability.
///
/// # Invariants
/// - Variants are stable for metric labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchGauge {
    /// Current base rate of the search.
    BaseRate,
    /// Target rate of the probe in flight.
    TargetRate,
    /// Achieved rate of the last sampled window.
    AchievedRate,
}

impl SearchGauge {
    /// Returns a stable label for the gauge.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseRate => "ratemax.search.rate_base",
            Self::TargetRate => "ratemax.search.target_rate",
            Self::AchievedRate => "ratemax.sampling.achieved_rate",
        }
    }
}

/// Gauge-reporting sink for search observability.
pub trait SearchMetrics {
    /// Records a gauge observation.
    fn record_gauge(&self, gauge: SearchGauge, value: f64);
}

/// No-op gauge sink.
///
/// # Invariants
/// - Gauge observations are intentionally discarded.
pub struct NoopSearchMetrics;

impl SearchMetrics for NoopSearchMetrics {
    fn record_gauge(&self, _gauge: SearchGauge, _value: f64) {}
}

// ============================================================================
// SECTION: Progress Sink
// ============================================================================

/// Progress events emitted while a search runs.
///
/// # Invariants
/// - Events carry owned snapshots; sinks must not assume later mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Warmup load started before the first probe.
    WarmupStarted {
        /// Warmup duration in seconds.
        seconds: f64,
        /// Rate driven during warmup.
        target_rate: f64,
    },
    /// A probe iteration started sampling.
    IterationStarted {
        /// One-based iteration number.
        iteration: u64,
        /// Probed target rate.
        target_rate: f64,
        /// Base rate the probe was issued from.
        base: f64,
        /// Step above the base rate.
        step: f64,
        /// Sampling window in seconds.
        window_seconds: f64,
    },
    /// A sample was measured and classified.
    SampleEvaluated {
        /// One-based iteration number.
        iteration: u64,
        /// Measured sample.
        sample: Sample,
        /// Acceptance verdict for the sample.
        verdict: AcceptanceVerdict,
        /// Best known ops per second at evaluation time.
        best_ops_per_second: f64,
    },
    /// A rejection rebased the search below the rejected ceiling.
    WindowNarrowed {
        /// New base rate.
        base: f64,
        /// Step after the reset.
        step: f64,
        /// Highest accepted sample bounding the search from below.
        passing: Sample,
        /// Lowest rejected sample bounding the search from above.
        failing: Sample,
    },
    /// The workload is settling at the new base before the next probe.
    SettleStarted {
        /// Settle duration in seconds.
        seconds: f64,
        /// Base rate held during the settle.
        base: f64,
    },
    /// One search run finished.
    RunCompleted {
        /// Zero-based run index.
        run_index: u32,
        /// Outcome of the run.
        outcome: SearchOutcome,
    },
    /// Every run finished and the results were averaged.
    AnalysisCompleted {
        /// Averaged analysis summary.
        summary: AnalysisSummary,
    },
}

/// Sink for search progress events.
pub trait ProgressSink {
    /// Emits a progress event.
    fn emit(&self, event: &ProgressEvent);
}

/// No-op progress sink.
///
/// # Invariants
/// - Progress events are intentionally discarded.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn emit(&self, _event: &ProgressEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
