// crates/ratemax-cli/src/render.rs
// ============================================================================
// Module: Console Rendering
// Description: Human-readable progress and summary output for searches.
// Purpose: Narrate the search on the console so operators can follow every
// iteration's checks and the final averaged analysis.
// Dependencies: ratemax-config, ratemax-core
// ============================================================================

//! ## Overview
//! The console renderer is a [`ProgressSink`] that narrates the search as it
//! runs: one block per iteration showing the latency, target-ratio, and
//! best-ratio checks with pass/fail verdicts, a search-range summary after
//! every narrowing, and a final `ANALYSIS COMPLETE` block with the averaged
//! result. Output errors are ignored; a broken pipe must not abort a search.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use ratemax_config::SearchConfig;
use ratemax_core::AcceptanceThresholds;
use ratemax_core::AcceptanceVerdict;
use ratemax_core::AnalysisSummary;
use ratemax_core::ProgressEvent;
use ratemax_core::ProgressSink;
use ratemax_core::Sample;
use ratemax_core::SearchOutcome;

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
pub(crate) fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
pub(crate) fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a ratio as a whole percentage, `0.8` becoming `80%`.
pub(crate) fn as_pct(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

/// Formats a unit-interval percentile as a label, `0.99` becoming `p99`.
pub(crate) fn as_pctile(value: f64) -> String {
    format!("p{:.0}", value * 100.0)
}

// ============================================================================
// SECTION: Preamble
// ============================================================================

/// Prints the resolved search parameters before the first probe.
pub(crate) fn print_preamble(config: &SearchConfig) -> std::io::Result<()> {
    let sampling = &config.sampling;
    let rate = &config.rate;
    let acceptance = &config.acceptance;
    write_stdout_line(&format!(" profile={}", config.profile))?;
    write_stdout_line("    Performing max-rate search with the following parameters:")?;
    write_stdout_line(&format!(
        "    Scale sample window between {:.0}s and {:.0}s",
        sampling.window_seconds, sampling.max_window_seconds
    ))?;
    write_stdout_line(&format!(
        "     increasing by {:.3}X on each rejected iteration.",
        sampling.window_growth
    ))?;
    write_stdout_line(&format!(
        "    Set target rate to {:.0} + {:.0} * ( {:.0} ^iter )",
        rate.base, rate.step, rate.growth
    ))?;
    write_stdout_line(&format!(
        "    Report the average result of running the search {} times.",
        config.analysis.runs
    ))?;
    write_stdout_line(&format!(
        "    Reject iterations which fail to achieve {} of the target rate.",
        as_pct(acceptance.min_target_ratio)
    ))?;
    write_stdout_line(&format!(
        "    Reject iterations which fail to achieve {} of the best rate.",
        as_pct(acceptance.min_best_ratio)
    ))?;
    write_stdout_line(&format!(
        "    Reject iterations above {:.0}ms response at percentile {}",
        acceptance.latency_cutoff_ms,
        as_pctile(acceptance.latency_percentile)
    ))
}

// ============================================================================
// SECTION: Line Formatting
// ============================================================================

/// Formats the latency check line for one evaluated sample.
pub(crate) fn format_latency_line(thresholds: &AcceptanceThresholds, sample: &Sample) -> String {
    let summary = format!(
        "{:.2}ms {}",
        sample.latency_ms,
        as_pctile(thresholds.latency_percentile)
    );
    if sample.latency_ms > thresholds.latency_cutoff_ms {
        format!(
            " LATENCY         FAIL(TOO HIGH) [ {summary} > max {:.0}ms ]",
            thresholds.latency_cutoff_ms
        )
    } else {
        format!(
            " LATENCY         PASS(OK)       [ {summary} < max {:.0}ms ]",
            thresholds.latency_cutoff_ms
        )
    }
}

/// Formats the achieved-of-target check line for one evaluated sample.
pub(crate) fn format_target_line(thresholds: &AcceptanceThresholds, sample: &Sample) -> String {
    let summary = format!("{} of target", as_pct(sample.achieved_ratio));
    let detail = format!(
        "( {:.0}/{:.0} )",
        sample.ops_per_second, sample.target_rate
    );
    if sample.achieved_ratio < thresholds.min_target_ratio {
        format!(
            " OPRATE/TARGET   FAIL(TOO LOW)  [ {summary} < min {} ] {detail}",
            as_pct(thresholds.min_target_ratio)
        )
    } else {
        format!(
            " OPRATE/TARGET   PASS(OK)       [ {summary} > min {} ] {detail}",
            as_pct(thresholds.min_target_ratio)
        )
    }
}

/// Formats the achieved-of-best check line for one evaluated sample.
pub(crate) fn format_best_line(
    thresholds: &AcceptanceThresholds,
    sample: &Sample,
    verdict: &AcceptanceVerdict,
    best_ops_per_second: f64,
) -> String {
    let summary = format!("{} of best known", as_pct(verdict.best_ratio));
    let detail = format!("( {:.0}/{:.0} )", sample.ops_per_second, best_ops_per_second);
    if verdict.best_ratio_ok {
        format!(
            " OPRATE/BEST     PASS(OK)       [ {summary} > min {} ] {detail}",
            as_pct(thresholds.min_best_ratio)
        )
    } else {
        format!(
            " OPRATE/BEST     FAIL(SLOWER)   [ {summary} < min {} ] {detail}",
            as_pct(thresholds.min_best_ratio)
        )
    }
}

/// Formats the narrowed search range bounded by its pass and fail samples.
pub(crate) fn format_search_range(
    thresholds: &AcceptanceThresholds,
    passing: &Sample,
    failing: &Sample,
) -> String {
    let pctile = as_pctile(thresholds.latency_percentile);
    format!(
        "[[ PASS {:.2}/{:.0} @{:.2}ms {pctile} , FAIL {:.2}/{:.0} @{:.2}ms {pctile} ]]",
        passing.ops_per_second,
        passing.target_rate,
        passing.latency_ms,
        failing.ops_per_second,
        failing.target_rate,
        failing.latency_ms
    )
}

/// Formats the final averaged analysis block.
pub(crate) fn format_analysis(
    thresholds: &AcceptanceThresholds,
    summary: &AnalysisSummary,
) -> String {
    let pctile = as_pctile(thresholds.latency_percentile);
    format!(
        "\n ANALYSIS COMPLETE in {:.2} seconds\n THRESHOLDS:\n  latency:[{pctile} < {:.0}ms]\n  throughput:[> {} of target]\n  throughput:[> {} of best]\n AVERAGE OF {} RESULTS:\n  {:.2} ops_s @ {pctile} of {:.2}ms",
        summary.total_seconds,
        thresholds.latency_cutoff_ms,
        as_pct(thresholds.min_target_ratio),
        as_pct(thresholds.min_best_ratio),
        summary.runs.len(),
        summary.average_ops_per_second,
        summary.average_latency_ms
    )
}

/// Formats the per-run completion line.
pub(crate) fn format_run_completed(
    thresholds: &AcceptanceThresholds,
    run_index: u32,
    outcome: &SearchOutcome,
) -> String {
    format!(
        "\n search completed: run {} selected iteration {} with {:.2} ops_s @ {:.2}ms {} latency",
        run_index + 1,
        outcome.iteration,
        outcome.ops_per_second,
        outcome.latency_ms,
        as_pctile(thresholds.latency_percentile)
    )
}

// ============================================================================
// SECTION: Console Sink
// ============================================================================

/// Progress sink narrating the search on stdout.
pub(crate) struct ConsoleProgress {
    /// Thresholds echoed alongside each check line.
    thresholds: AcceptanceThresholds,
}

impl ConsoleProgress {
    /// Creates a console sink rendering against the given thresholds.
    pub(crate) const fn new(thresholds: AcceptanceThresholds) -> Self {
        Self {
            thresholds,
        }
    }

    /// Renders one event to a list of output lines.
    fn render(&self, event: &ProgressEvent) -> Vec<String> {
        match event {
            ProgressEvent::WarmupStarted {
                seconds,
                target_rate,
            } => vec![format!(
                "\nwarming up workload for {seconds:.0}s at {target_rate:.0} ops_s..."
            )],
            ProgressEvent::IterationStarted {
                iteration,
                target_rate,
                base,
                step,
                window_seconds,
            } => vec![format!(
                "\n >-- iteration {iteration} ---> targeting {target_rate:.0} ops_s ({base:.0}+{step:.0}) for {window_seconds:.0}s"
            )],
            ProgressEvent::SampleEvaluated {
                iteration,
                sample,
                verdict,
                best_ops_per_second,
            } => {
                let decision = if verdict.accepted() {
                    format!(" ---> accepting iteration {iteration}")
                } else {
                    format!(" !!!  rejecting iteration {iteration}")
                };
                vec![
                    format_latency_line(&self.thresholds, sample),
                    format_target_line(&self.thresholds, sample),
                    format_best_line(&self.thresholds, sample, verdict, *best_ops_per_second),
                    decision,
                ]
            }
            ProgressEvent::WindowNarrowed {
                base,
                step,
                passing,
                failing,
            } => vec![
                format!(
                    "\n new search range is {}",
                    format_search_range(&self.thresholds, passing, failing)
                ),
                format!(" continuing search at base: {base:.0} step: {step:.0}"),
            ],
            ProgressEvent::SettleStarted {
                seconds,
                base,
            } => vec![format!(
                " settling load at {base:.0} ops_s for {seconds:.0}s before active sampling."
            )],
            ProgressEvent::RunCompleted {
                run_index,
                outcome,
            } => vec![format_run_completed(&self.thresholds, *run_index, outcome)],
            ProgressEvent::AnalysisCompleted {
                summary,
            } => vec![format_analysis(&self.thresholds, summary)],
        }
    }
}

impl ProgressSink for ConsoleProgress {
    fn emit(&self, event: &ProgressEvent) {
        for line in self.render(event) {
            let _ = write_stdout_line(&line);
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
