// crates/ratemax-core/src/core/search.rs
// ============================================================================
// Module: Ratemax Search Controller
// Description: Stateful controller that converges on the maximum accepted rate.
// Purpose: Drive probe targets and sampling windows from accept/reject verdicts.
// Dependencies: crate::core::{acceptance, sample}, serde
// ============================================================================

//! ## Overview
//! The controller is a two-phase state machine. While samples are accepted it
//! keeps expanding: the probe target is `base + step` and the step grows by a
//! fixed factor each iteration. On a rejection it either narrows, rebasing at
//! the highest accepted target with the step reset to its initial value, or
//! finishes once the gap between the highest accepted and lowest rejected
//! targets has collapsed below one initial step.
//!
//! The controller owns the only mutable search state and performs no I/O:
//! callers obtain the next [`Probe`], measure it however they like, and feed
//! the resulting [`Sample`] back through [`SearchController::record`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::acceptance::AcceptanceThresholds;
use crate::core::acceptance::AcceptanceVerdict;
use crate::core::acceptance::evaluate_sample;
use crate::core::sample::Sample;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Tunable parameters for one search run.
///
/// # Invariants
/// - Growth factors are greater than 1.0.
/// - `window_seconds <= max_window_seconds`.
/// - Validation happens in the config layer before a controller is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Initial base rate in operations per second.
    pub rate_base: f64,
    /// Initial rate step in operations per second.
    pub rate_step: f64,
    /// Multiplier applied to the step after every iteration.
    pub rate_growth: f64,
    /// Initial sampling window in seconds.
    pub window_seconds: f64,
    /// Multiplier applied to the sampling window per rejected iteration.
    pub window_growth: f64,
    /// Upper bound on the sampling window in seconds.
    pub max_window_seconds: f64,
    /// Fail-closed bound on iterations per run.
    pub max_iterations: u32,
}

// ============================================================================
// SECTION: Probes and Steps
// ============================================================================

/// Next measurement requested by the controller.
///
/// # Invariants
/// - `target_rate` equals `base + step` at the time the probe was issued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    /// One-based iteration number of the probe.
    pub iteration: u64,
    /// Target rate to drive during the sampling window.
    pub target_rate: f64,
    /// Base rate the probe was issued from.
    pub base: f64,
    /// Step above the base rate.
    pub step: f64,
    /// Sampling window in whole seconds.
    pub window_seconds: f64,
}

/// Search phase reported for observability.
///
/// # Invariants
/// - Variants are stable for serialization and progress labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// Step keeps growing while samples are accepted.
    Expanding,
    /// A rejection rebased the search; re-probing from the last accepted rate.
    Narrowing,
}

/// Controller decision after recording a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStep {
    /// Sample accepted; keep expanding from the current base.
    Continue,
    /// Sample rejected; search rebased below the rejected ceiling. The caller
    /// should settle the workload at the new base for one initial window
    /// before the next probe.
    Narrowed {
        /// New base rate after rebasing.
        base: f64,
        /// Step after the reset, equal to the initial rate step.
        step: f64,
        /// Highest accepted sample bounding the search from below.
        passing: Sample,
        /// Lowest rejected sample bounding the search from above.
        failing: Sample,
    },
    /// Sample rejected and the bounds have collapsed; the search is over.
    Finished,
}

// ============================================================================
// SECTION: Controller
// ============================================================================

/// Stateful search loop over accept/reject verdicts.
///
/// # Invariants
/// - `history` is append-only and ordered by iteration.
/// - Once a rejection is recorded, `base + step` is never driven past the
///   lowest rejected target without `step` first being reset to the initial
///   rate step. This bounds the search and guarantees termination.
#[derive(Debug, Clone)]
pub struct SearchController {
    /// Search settings fixed for the run.
    settings: SearchSettings,
    /// Acceptance thresholds fixed for the run.
    thresholds: AcceptanceThresholds,
    /// Current base rate.
    base: f64,
    /// Current step above the base rate.
    step: f64,
    /// Number of samples recorded so far.
    iterations: u64,
    /// Number of accepted samples.
    accepted_count: u64,
    /// Number of rejected samples; widens the sampling window.
    rejected_count: u32,
    /// History index of the best accepted sample, if any.
    highest_accepted: Option<usize>,
    /// History index of the most conservative rejected sample, if any.
    lowest_rejected: Option<usize>,
    /// Ordered record of every sample fed to the controller.
    history: Vec<Sample>,
    /// Current phase for observability.
    phase: SearchPhase,
}

impl SearchController {
    /// Creates a controller at the configured base rate.
    #[must_use]
    pub fn new(settings: SearchSettings, thresholds: AcceptanceThresholds) -> Self {
        Self {
            settings,
            thresholds,
            base: settings.rate_base,
            step: settings.rate_step,
            iterations: 0,
            accepted_count: 0,
            rejected_count: 0,
            highest_accepted: None,
            lowest_rejected: None,
            history: Vec::new(),
            phase: SearchPhase::Expanding,
        }
    }

    /// Returns the next probe without mutating state.
    ///
    /// The sampling window widens by `window_growth` per rejection so noisy
    /// borderline rates get measured over longer windows, floored at the
    /// initial window, capped at the maximum, and rounded to whole seconds.
    #[must_use]
    pub fn next_probe(&self) -> Probe {
        let zoom = self.settings.window_growth.powi(i32::try_from(self.rejected_count).unwrap_or(i32::MAX));
        let widened = (self.settings.window_seconds * zoom)
            .max(self.settings.window_seconds)
            .round();
        Probe {
            iteration: self.iterations + 1,
            target_rate: self.base + self.step,
            base: self.base,
            step: self.step,
            window_seconds: widened.min(self.settings.max_window_seconds),
        }
    }

    /// Records a sample and advances the search state.
    ///
    /// The step grows by `rate_growth` on every iteration. Acceptance keeps
    /// expanding; a rejection either narrows the search below the rejected
    /// ceiling or finishes once the ceiling is within one initial step of
    /// the highest accepted target. When two iterations are both rejected,
    /// the one with the lower target rate is kept as the ceiling.
    pub fn record(&mut self, sample: Sample) -> (AcceptanceVerdict, SearchStep) {
        let index = self.history.len();
        self.history.push(sample);
        self.iterations += 1;

        let best_ops = self
            .highest_accepted
            .map_or(sample.ops_per_second, |accepted| self.history[accepted].ops_per_second);
        let verdict = evaluate_sample(&sample, best_ops, &self.thresholds);

        self.step *= self.settings.rate_growth;

        if verdict.accepted() {
            self.accepted_count += 1;
            self.phase = SearchPhase::Expanding;
            self.highest_accepted = Some(self.highest_accepted.map_or(index, |accepted| {
                if sample.ops_per_second > self.history[accepted].ops_per_second {
                    index
                } else {
                    accepted
                }
            }));
            return (verdict, SearchStep::Continue);
        }

        self.rejected_count += 1;
        self.lowest_rejected = Some(self.lowest_rejected.map_or(index, |rejected| {
            if sample.target_rate < self.history[rejected].target_rate {
                index
            } else {
                rejected
            }
        }));
        // A run whose first iterations all fail still needs a result to
        // report; fall back to the rejection itself.
        let accepted = *self.highest_accepted.get_or_insert(index);

        let ceiling = self.lowest_rejected.map_or(f64::INFINITY, |rejected| {
            self.history[rejected].target_rate
        });
        let passing = self.history[accepted];
        if self.base + self.step >= ceiling && passing.target_rate + self.settings.rate_step < ceiling
        {
            self.base = passing.target_rate;
            self.step = self.settings.rate_step;
            self.phase = SearchPhase::Narrowing;
            let failing = self.lowest_rejected.map_or(sample, |rejected| self.history[rejected]);
            return (
                verdict,
                SearchStep::Narrowed {
                    base: self.base,
                    step: self.step,
                    passing,
                    failing,
                },
            );
        }

        (verdict, SearchStep::Finished)
    }

    /// Returns the sample selected as the search result, if any.
    #[must_use]
    pub fn selected(&self) -> Option<(usize, Sample)> {
        self.highest_accepted.map(|index| (index, self.history[index]))
    }

    /// Returns the recorded sample history in iteration order.
    #[must_use]
    pub fn history(&self) -> &[Sample] {
        &self.history
    }

    /// Returns the number of samples recorded so far.
    #[must_use]
    pub const fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Returns the number of accepted samples so far.
    #[must_use]
    pub const fn accepted_count(&self) -> u64 {
        self.accepted_count
    }

    /// Returns the number of rejected samples so far.
    #[must_use]
    pub const fn rejected_count(&self) -> u32 {
        self.rejected_count
    }

    /// Returns the current search phase.
    #[must_use]
    pub const fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Returns `true` once the per-run iteration budget is spent.
    #[must_use]
    pub const fn budget_exhausted(&self) -> bool {
        self.iterations >= self.settings.max_iterations as u64
    }

    /// Returns the current step above the base rate.
    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Returns the current base rate.
    #[must_use]
    pub const fn base(&self) -> f64 {
        self.base
    }
}
