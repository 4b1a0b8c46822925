// crates/ratemax-core/src/runtime/runner.rs
// ============================================================================
// Module: Ratemax Search Runner
// Description: Drives complete search runs and aggregates repeated results.
// Purpose: Loop the controller over live samples and average N runs.
// Dependencies: crate::core, crate::interfaces, crate::runtime::sampler, serde, thiserror
// ============================================================================

//! ## Overview
//! The runner owns the only mutable [`SearchController`] per run and drives
//! it sequentially: probe, sample, record, and either continue, settle at a
//! narrowed base, or stop. Runs repeat the configured number of times with no
//! concurrency, and a failure in any run aborts the whole analysis; there is
//! no partial-result reporting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::acceptance::AcceptanceThresholds;
use crate::core::analysis::AnalysisSummary;
use crate::core::analysis::SearchOutcome;
use crate::core::search::SearchController;
use crate::core::search::SearchSettings;
use crate::core::search::SearchStep;
use crate::interfaces::Clock;
use crate::interfaces::MetricsReader;
use crate::interfaces::ProgressEvent;
use crate::interfaces::ProgressSink;
use crate::interfaces::RateSpec;
use crate::interfaces::SearchGauge;
use crate::interfaces::SearchMetrics;
use crate::interfaces::WorkloadControl;
use crate::runtime::sampler::SamplerError;
use crate::runtime::sampler::sample;

// ============================================================================
// SECTION: Plans
// ============================================================================

/// Complete plan for a multi-run search analysis.
///
/// # Invariants
/// - `runs >= 1`; validation happens in the config layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchPlan {
    /// Controller settings for each run.
    pub settings: SearchSettings,
    /// Acceptance thresholds for each run.
    pub thresholds: AcceptanceThresholds,
    /// Number of sequential runs to average.
    pub runs: u32,
    /// Warmup duration before the first run, in seconds.
    pub warmup_seconds: f64,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Search runtime errors, fatal to the whole analysis.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A sampling window failed.
    #[error(transparent)]
    Sampler(#[from] SamplerError),
    /// The per-run iteration budget was spent without convergence.
    #[error("search exceeded iteration budget of {budget}")]
    IterationBudget {
        /// Configured iteration budget.
        budget: u32,
    },
    /// A run finished without any recorded sample to report.
    #[error("search run {run_index} produced no result")]
    NoResult {
        /// Zero-based index of the failed run.
        run_index: u32,
    },
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Sequential driver for search runs over one workload harness.
///
/// # Invariants
/// - Runs execute one at a time; the harness is the only shared resource.
pub struct SearchRunner<'a, H: ?Sized> {
    /// Workload, metrics, and clock collaborator.
    harness: &'a mut H,
    /// Gauge sink for search observability.
    gauges: &'a dyn SearchMetrics,
    /// Progress event sink.
    progress: &'a dyn ProgressSink,
}

impl<'a, H> SearchRunner<'a, H>
where
    H: WorkloadControl + MetricsReader + Clock + ?Sized,
{
    /// Creates a runner over the given harness and observability sinks.
    pub fn new(
        harness: &'a mut H,
        gauges: &'a dyn SearchMetrics,
        progress: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            harness,
            gauges,
            progress,
        }
    }

    /// Runs the full analysis: warmup, N sequential runs, averaged summary.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when any run fails; no partial results are
    /// reported.
    pub fn run(&mut self, plan: &SearchPlan) -> Result<AnalysisSummary, SearchError> {
        if plan.warmup_seconds > 0.0 {
            let warmup_rate = plan.settings.rate_base + plan.settings.rate_step;
            self.progress.emit(&ProgressEvent::WarmupStarted {
                seconds: plan.warmup_seconds,
                target_rate: warmup_rate,
            });
            self.harness.apply_rate(&RateSpec::new(warmup_rate)).map_err(SamplerError::from)?;
            self.harness.wait(Duration::from_secs_f64(plan.warmup_seconds));
        }

        let mut outcomes = Vec::with_capacity(usize::try_from(plan.runs).unwrap_or_default());
        for run_index in 0 .. plan.runs {
            let outcome = self.run_once(plan, run_index)?;
            self.progress.emit(&ProgressEvent::RunCompleted {
                run_index,
                outcome,
            });
            outcomes.push(outcome);
        }

        let summary = AnalysisSummary::from_runs(outcomes).ok_or(SearchError::NoResult {
            run_index: 0,
        })?;
        self.progress.emit(&ProgressEvent::AnalysisCompleted {
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// Runs a single search to completion and reports its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when sampling fails, the iteration budget is
    /// spent, or the run ends with nothing to report.
    fn run_once(&mut self, plan: &SearchPlan, run_index: u32) -> Result<SearchOutcome, SearchError> {
        let started = self.harness.elapsed();
        let mut controller = SearchController::new(plan.settings, plan.thresholds);
        self.gauges.record_gauge(SearchGauge::BaseRate, plan.settings.rate_base);

        loop {
            if controller.budget_exhausted() {
                return Err(SearchError::IterationBudget {
                    budget: plan.settings.max_iterations,
                });
            }

            let probe = controller.next_probe();
            self.gauges.record_gauge(SearchGauge::TargetRate, probe.target_rate);
            self.progress.emit(&ProgressEvent::IterationStarted {
                iteration: probe.iteration,
                target_rate: probe.target_rate,
                base: probe.base,
                step: probe.step,
                window_seconds: probe.window_seconds,
            });

            let best_before = controller
                .selected()
                .map_or(0.0, |(_, selected)| selected.ops_per_second);
            let measured = sample(
                self.harness,
                probe.target_rate,
                Duration::from_secs_f64(probe.window_seconds),
                plan.thresholds.latency_percentile,
            )?;
            self.gauges.record_gauge(SearchGauge::AchievedRate, measured.ops_per_second);

            let (verdict, step) = controller.record(measured);
            let best_ops = if best_before > 0.0 {
                best_before
            } else {
                measured.ops_per_second
            };
            self.progress.emit(&ProgressEvent::SampleEvaluated {
                iteration: probe.iteration,
                sample: measured,
                verdict,
                best_ops_per_second: best_ops,
            });

            match step {
                SearchStep::Continue => {}
                SearchStep::Narrowed {
                    base,
                    step: reset_step,
                    passing,
                    failing,
                } => {
                    self.progress.emit(&ProgressEvent::WindowNarrowed {
                        base,
                        step: reset_step,
                        passing,
                        failing,
                    });
                    self.gauges.record_gauge(SearchGauge::BaseRate, base);
                    // Hold the workload at the accepted base so queueing from
                    // the rejected window drains before the next probe.
                    self.harness.apply_rate(&RateSpec::new(base)).map_err(SamplerError::from)?;
                    self.progress.emit(&ProgressEvent::SettleStarted {
                        seconds: plan.settings.window_seconds,
                        base,
                    });
                    self.harness.wait(Duration::from_secs_f64(plan.settings.window_seconds));
                }
                SearchStep::Finished => break,
            }
        }

        let total_seconds = self.harness.elapsed().saturating_sub(started).as_secs_f64();
        let (index, selected) = controller.selected().ok_or(SearchError::NoResult {
            run_index,
        })?;
        Ok(SearchOutcome::from_selected(index, selected, total_seconds))
    }
}
