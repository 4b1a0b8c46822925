// crates/ratemax-sim/src/workload.rs
// ============================================================================
// Module: Simulated Workload
// Description: Deterministic queueing-model workload driving instant searches.
// Purpose: Stand in for an external scenario engine so searches can run
// reproducibly with no live traffic and no wall-clock time.
// Dependencies: rand, ratemax-core, thiserror
// ============================================================================

//! ## Overview
//! The simulation is an open-loop queueing model. Achieved throughput tracks
//! the requested rate until it saturates at `capacity`, and tail latency
//! follows a utilization curve that diverges as the target approaches
//! capacity:
//!
//! ```text
//! p99(u) = service_latency_ms / (1 - 0.99 * u^sharpness)
//! ```
//!
//! A seeded generator adds bounded relative jitter to each latency snapshot,
//! so the same seed always reproduces the same search. `wait` advances a
//! simulated clock and the operation counter instead of sleeping, which lets
//! a multi-minute search plan complete in microseconds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratemax_core::Clock;
use ratemax_core::LatencySnapshot;
use ratemax_core::MetricsError;
use ratemax_core::MetricsReader;
use ratemax_core::QuantilePoint;
use ratemax_core::RateSpec;
use ratemax_core::WorkloadControl;
use ratemax_core::WorkloadError;
use thiserror::Error;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Simulation parameters for the queueing model.
///
/// # Invariants
/// - `capacity` and `service_latency_ms` are positive after validation.
/// - `latency_spread` is in `[0, 1)` and `sharpness` is positive after
///   validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimSettings {
    /// Maximum sustainable operations per second.
    pub capacity: f64,
    /// Base service latency in milliseconds at zero utilization.
    pub service_latency_ms: f64,
    /// Relative jitter amplitude applied to each latency snapshot.
    pub latency_spread: f64,
    /// Exponent shaping how abruptly latency climbs near saturation.
    pub sharpness: f64,
    /// Seed for the jitter generator.
    pub seed: u64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            capacity: 10_000.0,
            service_latency_ms: 2.0,
            latency_spread: 0.0,
            sharpness: 1.0,
            seed: 42,
        }
    }
}

/// Simulation settings errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SimError {
    /// A settings field is out of range.
    #[error("invalid simulation settings: {0}")]
    InvalidSettings(String),
}

impl SimSettings {
    /// Validate simulation parameter ranges.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidSettings`] when any field is out of range.
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.capacity.is_finite() || self.capacity <= 0.0 {
            return Err(SimError::InvalidSettings(
                "capacity must be greater than zero".to_string(),
            ));
        }
        if !self.service_latency_ms.is_finite() || self.service_latency_ms <= 0.0 {
            return Err(SimError::InvalidSettings(
                "service latency must be greater than zero".to_string(),
            ));
        }
        if !self.latency_spread.is_finite()
            || self.latency_spread < 0.0
            || self.latency_spread >= 1.0
        {
            return Err(SimError::InvalidSettings(
                "latency spread must be in [0, 1)".to_string(),
            ));
        }
        if !self.sharpness.is_finite() || self.sharpness <= 0.0 {
            return Err(SimError::InvalidSettings(
                "sharpness must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Workload
// ============================================================================

/// Simulated workload implementing the full search harness surface.
///
/// # Invariants
/// - Simulated time and the operation counter only move forward.
/// - Identical settings and call sequences produce identical observations.
#[derive(Debug)]
pub struct SimWorkload {
    /// Model parameters.
    settings: SimSettings,
    /// Seeded jitter source.
    rng: StdRng,
    /// Rate currently applied, in operations per second.
    current_rate: f64,
    /// Fractional operation counter.
    cycles: f64,
    /// Simulated elapsed time.
    now: Duration,
}

impl SimWorkload {
    /// Creates a simulated workload from validated settings.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidSettings`] when the settings are out of
    /// range.
    pub fn new(settings: SimSettings) -> Result<Self, SimError> {
        settings.validate()?;
        Ok(Self {
            settings,
            rng: StdRng::seed_from_u64(settings.seed),
            current_rate: 0.0,
            cycles: 0.0,
            now: Duration::ZERO,
        })
    }

    /// Model parameters this workload was built from.
    #[must_use]
    pub const fn settings(&self) -> &SimSettings {
        &self.settings
    }

    /// Achieved rate for a requested rate, saturating at capacity.
    fn achieved(&self, rate: f64) -> f64 {
        rate.min(self.settings.capacity)
    }

    /// Jittered p99 latency for the currently applied rate.
    fn latency_p99(&mut self) -> f64 {
        let utilization =
            (self.achieved(self.current_rate) / self.settings.capacity).clamp(0.0, 1.0);
        let queueing = 1.0 - 0.99 * utilization.powf(self.settings.sharpness);
        let base = self.settings.service_latency_ms / queueing;
        if self.settings.latency_spread > 0.0 {
            let jitter = self
                .rng
                .gen_range(-self.settings.latency_spread..=self.settings.latency_spread);
            base * (1.0 + jitter)
        } else {
            base
        }
    }
}

impl WorkloadControl for SimWorkload {
    fn apply_rate(&mut self, spec: &RateSpec) -> Result<(), WorkloadError> {
        if !spec.ops_per_second.is_finite() || spec.ops_per_second < 0.0 {
            return Err(WorkloadError::RateRejected {
                spec: spec.to_string(),
                reason: "rate must be finite and non-negative".to_string(),
            });
        }
        self.current_rate = spec.ops_per_second;
        Ok(())
    }

    fn is_running(&self) -> bool {
        true
    }
}

impl MetricsReader for SimWorkload {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "The counter is non-negative and rounding to whole operations is the intent."
    )]
    fn cycle_count(&mut self) -> Result<u64, MetricsError> {
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

impl Clock for SimWorkload {
    fn wait(&mut self, duration: Duration) {
        self.now += duration;
        self.cycles += self.achieved(self.current_rate) * duration.as_secs_f64();
    }

    fn elapsed(&self) -> Duration {
        self.now
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
