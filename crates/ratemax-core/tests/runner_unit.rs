// crates/ratemax-core/tests/runner_unit.rs
// ============================================================================
// Module: Search Runner Tests
// Description: Validate end-to-end runs against a scripted workload model.
// Purpose: Ensure convergence, fatal failure handling, and observability.
// Dependencies: ratemax-core
// ============================================================================

//! Search runner behavior tests over a deterministic workload harness.

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
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use common::RecordingMetrics;
use common::RecordingProgress;
use common::ScriptedHarness;
use ratemax_core::AcceptanceThresholds;
use ratemax_core::NoopProgress;
use ratemax_core::NoopSearchMetrics;
use ratemax_core::ProgressEvent;
use ratemax_core::SamplerError;
use ratemax_core::SearchError;
use ratemax_core::SearchGauge;
use ratemax_core::SearchPlan;
use ratemax_core::SearchRunner;
use ratemax_core::SearchSettings;

/// Plan converging on a 10k ops/s workload under a 50ms p99 ceiling.
fn plan(runs: u32, warmup_seconds: f64) -> SearchPlan {
    SearchPlan {
        settings: SearchSettings {
            rate_base: 0.0,
            rate_step: 100.0,
            rate_growth: 2.0,
            window_seconds: 10.0,
            window_growth: 1.5,
            max_window_seconds: 60.0,
            max_iterations: 50,
        },
        thresholds: AcceptanceThresholds {
            latency_cutoff_ms: 50.0,
            latency_percentile: 0.99,
            min_target_ratio: 0.8,
            min_best_ratio: 0.9,
        },
        runs,
        warmup_seconds,
    }
}

#[test]
fn search_converges_near_latency_constrained_capacity() {
    // With capacity 10_000 and 2ms service latency, p99 crosses the 50ms
    // cutoff just below 9_700 ops/s.
    let mut harness = ScriptedHarness::new(10_000.0, 2.0);
    let mut runner = SearchRunner::new(&mut harness, &NoopSearchMetrics, &NoopProgress);
    let summary = runner.run(&plan(1, 0.0)).map_err(|err| err.to_string());
    let Ok(summary) = summary else {
        panic!("search failed: {summary:?}");
    };
    assert_eq!(summary.runs.len(), 1);
    assert!(
        summary.average_ops_per_second > 9_000.0 && summary.average_ops_per_second < 9_700.0,
        "unexpected rate {}",
        summary.average_ops_per_second
    );
    assert!(summary.average_latency_ms <= 50.0);
}

#[test]
fn averaged_runs_cover_every_requested_run() {
    let mut harness = ScriptedHarness::new(5_000.0, 1.0);
    let mut runner = SearchRunner::new(&mut harness, &NoopSearchMetrics, &NoopProgress);
    let Ok(summary) = runner.run(&plan(3, 0.0)) else {
        panic!("search failed");
    };
    assert_eq!(summary.runs.len(), 3);
    let mean: f64 =
        summary.runs.iter().map(|run| run.ops_per_second).sum::<f64>() / 3.0;
    assert!((summary.average_ops_per_second - mean).abs() < 1e-9);
}

#[test]
fn warmup_applies_first_probe_rate_before_sampling() {
    let mut harness = ScriptedHarness::new(10_000.0, 2.0);
    {
        let mut runner = SearchRunner::new(&mut harness, &NoopSearchMetrics, &NoopProgress);
        let Ok(_) = runner.run(&plan(1, 10.0)) else {
            panic!("search failed");
        };
    }
    let first = harness.applied.first().copied();
    assert!((first.map_or(0.0, |spec| spec.ops_per_second) - 100.0).abs() < f64::EPSILON);
}

#[test]
fn stopped_workload_aborts_the_run() {
    let mut harness = ScriptedHarness::new(10_000.0, 2.0);
    harness.stop_after_waits = Some(3);
    let mut runner = SearchRunner::new(&mut harness, &NoopSearchMetrics, &NoopProgress);
    let result = runner.run(&plan(1, 0.0));
    assert!(matches!(
        result,
        Err(SearchError::Sampler(SamplerError::WorkloadStopped))
    ));
}

#[test]
fn metrics_read_failure_is_fatal() {
    let mut harness = ScriptedHarness::new(10_000.0, 2.0);
    harness.fail_cycle_reads_after = Some(4);
    let mut runner = SearchRunner::new(&mut harness, &NoopSearchMetrics, &NoopProgress);
    let result = runner.run(&plan(1, 0.0));
    assert!(matches!(
        result,
        Err(SearchError::Sampler(SamplerError::Metrics(_)))
    ));
}

#[test]
fn iteration_budget_exhaustion_is_fatal() {
    let mut restricted = plan(1, 0.0);
    restricted.settings.max_iterations = 2;
    let mut harness = ScriptedHarness::new(1_000_000.0, 0.1);
    let mut runner = SearchRunner::new(&mut harness, &NoopSearchMetrics, &NoopProgress);
    let result = runner.run(&restricted);
    assert!(matches!(
        result,
        Err(SearchError::IterationBudget { budget: 2 })
    ));
}

#[test]
fn gauges_report_base_target_and_achieved_rates() {
    let mut harness = ScriptedHarness::new(5_000.0, 1.0);
    let gauges = RecordingMetrics::default();
    let mut runner = SearchRunner::new(&mut harness, &gauges, &NoopProgress);
    let Ok(_) = runner.run(&plan(1, 0.0)) else {
        panic!("search failed");
    };
    let observations = gauges.observations.lock().map_or_else(
        |poisoned| poisoned.into_inner().clone(),
        |observations| observations.clone(),
    );
    assert!(matches!(observations.first(), Some((SearchGauge::BaseRate, _))));
    assert!(observations.iter().any(|(gauge, _)| *gauge == SearchGauge::TargetRate));
    assert!(observations.iter().any(|(gauge, _)| *gauge == SearchGauge::AchievedRate));
}

#[test]
fn progress_stream_starts_with_warmup_and_ends_with_analysis() {
    let mut harness = ScriptedHarness::new(5_000.0, 1.0);
    let progress = RecordingProgress::default();
    let mut runner = SearchRunner::new(&mut harness, &NoopSearchMetrics, &progress);
    let Ok(summary) = runner.run(&plan(2, 5.0)) else {
        panic!("search failed");
    };
    let events = progress.events.lock().map_or_else(
        |poisoned| poisoned.into_inner().clone(),
        |events| events.clone(),
    );
    assert!(matches!(events.first(), Some(ProgressEvent::WarmupStarted { .. })));
    let Some(ProgressEvent::AnalysisCompleted {
        summary: reported,
    }) = events.last()
    else {
        panic!("expected an analysis completion event");
    };
    assert_eq!(reported, &summary);
    let completed_runs = events
        .iter()
        .filter(|event| matches!(event, ProgressEvent::RunCompleted { .. }))
        .count();
    assert_eq!(completed_runs, 2);
}
