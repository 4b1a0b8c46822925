// crates/ratemax-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Harness
// Description: Scripted workload harness and recording sinks for core tests.
// Purpose: Drive the search runtime deterministically without a live engine.
// Dependencies: ratemax-core
// ============================================================================

//! Deterministic collaborators for search runtime tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    dead_code,
    reason = "Test-only helpers; counter rounding is intended and helpers are \
              shared unevenly across test binaries."
)]

use std::sync::Mutex;
use std::time::Duration;

use ratemax_core::Clock;
use ratemax_core::LatencySnapshot;
use ratemax_core::MetricsError;
use ratemax_core::MetricsReader;
use ratemax_core::ProgressEvent;
use ratemax_core::ProgressSink;
use ratemax_core::QuantilePoint;
use ratemax_core::RateSpec;
use ratemax_core::SearchGauge;
use ratemax_core::SearchMetrics;
use ratemax_core::WorkloadControl;
use ratemax_core::WorkloadError;

/// Deterministic workload model with a hard capacity and queueing latency.
///
/// Achieved throughput saturates at `capacity`; p99 latency follows a
/// `service / (1 - 0.99u)` utilization curve, so it diverges as the target
/// approaches capacity.
pub struct ScriptedHarness {
    /// Maximum sustainable operations per second.
    pub capacity: f64,
    /// Base service latency in milliseconds.
    pub service_latency_ms: f64,
    /// Rate currently applied to the workload.
    pub current_rate: f64,
    /// Fractional operation counter.
    cycles: f64,
    /// Simulated elapsed time.
    now: Duration,
    /// Whether the workload is still running.
    pub running: bool,
    /// Stop the workload after this many waits, when set.
    pub stop_after_waits: Option<u32>,
    /// Number of waits observed so far.
    waits: u32,
    /// Fail counter reads after this many calls, when set.
    pub fail_cycle_reads_after: Option<u32>,
    /// Number of counter reads so far.
    cycle_reads: u32,
    /// Every rate spec applied, in order.
    pub applied: Vec<RateSpec>,
}

impl ScriptedHarness {
    /// Creates a harness with the given capacity and service latency.
    pub fn new(capacity: f64, service_latency_ms: f64) -> Self {
        Self {
            capacity,
            service_latency_ms,
            current_rate: 0.0,
            cycles: 0.0,
            now: Duration::ZERO,
            running: true,
            stop_after_waits: None,
            waits: 0,
            fail_cycle_reads_after: None,
            cycle_reads: 0,
            applied: Vec::new(),
        }
    }

    /// Achieved rate for a requested rate, capped at capacity.
    fn achieved(&self, rate: f64) -> f64 {
        rate.min(self.capacity)
    }

    /// p99 latency for the currently applied rate.
    fn latency_p99(&self) -> f64 {
        let utilization = (self.achieved(self.current_rate) / self.capacity).min(1.0);
        self.service_latency_ms / (1.0 - 0.99 * utilization)
    }
}

impl WorkloadControl for ScriptedHarness {
    fn apply_rate(&mut self, spec: &RateSpec) -> Result<(), WorkloadError> {
        self.applied.push(*spec);
        self.current_rate = spec.ops_per_second;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

impl MetricsReader for ScriptedHarness {
    fn cycle_count(&mut self) -> Result<u64, MetricsError> {
        self.cycle_reads += 1;
        if let Some(limit) = self.fail_cycle_reads_after
            && self.cycle_reads > limit
        {
            return Err(MetricsError::ReadFailed("scripted counter failure".to_owned()));
        }
        Ok(self.cycles.round() as u64)
    }

    fn take_latency_snapshot(&mut self) -> Result<LatencySnapshot, MetricsError> {
        let p99 = self.latency_p99();
        Ok(LatencySnapshot::new(vec![
            QuantilePoint {
                quantile: 0.5,
                latency_ms: p99 * 0.3,
            },
            QuantilePoint {
                quantile: 0.99,
                latency_ms: p99,
            },
            QuantilePoint {
                quantile: 0.999,
                latency_ms: p99 * 1.5,
            },
        ]))
    }
}

impl Clock for ScriptedHarness {
    fn wait(&mut self, duration: Duration) {
        self.waits += 1;
        if let Some(limit) = self.stop_after_waits
            && self.waits > limit
        {
            self.running = false;
        }
        self.now += duration;
        self.cycles += self.achieved(self.current_rate) * duration.as_secs_f64();
    }

    fn elapsed(&self) -> Duration {
        self.now
    }
}

/// Gauge sink recording every observation in order.
#[derive(Default)]
pub struct RecordingMetrics {
    /// Recorded gauge observations.
    pub observations: Mutex<Vec<(SearchGauge, f64)>>,
}

impl SearchMetrics for RecordingMetrics {
    fn record_gauge(&self, gauge: SearchGauge, value: f64) {
        if let Ok(mut observations) = self.observations.lock() {
            observations.push((gauge, value));
        }
    }
}

/// Progress sink recording every event in order.
#[derive(Default)]
pub struct RecordingProgress {
    /// Recorded progress events.
    pub events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressSink for RecordingProgress {
    fn emit(&self, event: &ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
