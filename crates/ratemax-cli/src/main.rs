// crates/ratemax-cli/src/main.rs
// ============================================================================
// Module: Ratemax CLI Entry Point
// Description: Command dispatcher for max-rate searches over the built-in
// simulated workload and for config inspection.
// Purpose: Provide a small operator surface: run a search, check a config.
// Dependencies: clap, ratemax-config, ratemax-core, ratemax-sim, serde_json,
// thiserror
// ============================================================================

//! ## Overview
//! The `ratemax` binary drives the adaptive max-rate search end to end. The
//! `run` command resolves a configuration (profile preset, config file, and
//! per-flag threshold overrides), builds the simulated workload from its
//! knobs, and executes the full analysis, narrating progress on stdout or
//! emitting the summary as JSON. The `check-config` command resolves and
//! validates a config file and reports the plan it would produce. Errors go
//! to stderr and exit nonzero.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;
pub(crate) mod render;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use ratemax_config::ProfileKind;
use ratemax_config::SearchConfig;
use ratemax_config::normalize_percentile;
use ratemax_core::AnalysisSummary;
use ratemax_core::NoopProgress;
use ratemax_core::NoopSearchMetrics;
use ratemax_core::SearchPlan;
use ratemax_core::SearchRunner;
use ratemax_sim::SimSettings;
use ratemax_sim::SimWorkload;
use thiserror::Error;

use crate::render::ConsoleProgress;
use crate::render::write_stderr_line;
use crate::render::write_stdout_line;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "ratemax", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a max-rate search over the simulated workload.
    Run(RunCommand),
    /// Resolve and validate a config file, reporting the plan it yields.
    CheckConfig(CheckConfigCommand),
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
struct RunCommand {
    /// Search profile preset; mutually exclusive with `--config`.
    #[arg(long, value_name = "NAME", value_parser = ProfileKind::from_str, conflicts_with = "config")]
    profile: Option<ProfileKind>,
    /// Path to a TOML config file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the latency cutoff in milliseconds.
    #[arg(long, value_name = "MS")]
    latency_cutoff_ms: Option<f64>,
    /// Override the latency percentile; values above 1 are percentages.
    #[arg(long, value_name = "PCTILE")]
    latency_percentile: Option<f64>,
    /// Override the minimum achieved fraction of the target rate.
    #[arg(long, value_name = "RATIO")]
    min_target_ratio: Option<f64>,
    /// Override the minimum achieved fraction of the best rate.
    #[arg(long, value_name = "RATIO")]
    min_best_ratio: Option<f64>,
    /// Simulated backend capacity in operations per second.
    #[arg(long, value_name = "OPS", default_value_t = 10_000.0)]
    capacity: f64,
    /// Simulated base service latency in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 2.0)]
    service_latency_ms: f64,
    /// Relative latency jitter amplitude in `[0, 1)`.
    #[arg(long, value_name = "SPREAD", default_value_t = 0.0)]
    latency_spread: f64,
    /// Exponent shaping the simulated saturation curve.
    #[arg(long, value_name = "EXP", default_value_t = 1.0)]
    sharpness: f64,
    /// Seed for the simulation's jitter generator.
    #[arg(long, value_name = "SEED", default_value_t = 42)]
    seed: u64,
    /// Emit the analysis summary as JSON instead of console narration.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

/// Arguments for the `check-config` command.
#[derive(Args, Debug)]
struct CheckConfigCommand {
    /// Path to a TOML config file; the lookup chain applies when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Emit the resolved plan as JSON instead of a parameter listing.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Formats an output-stream failure message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed writing to {stream}: {error}")
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(command) => command_run(&command),
        Commands::CheckConfig(command) => command_check_config(&command),
    }
}

/// Prints an error to stderr and yields a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Resolves the effective configuration for a `run` invocation.
///
/// A `--profile` flag replaces the file lookup chain entirely; threshold
/// flags then override individual acceptance fields. The result is
/// re-validated so flag values face the same ranges as file values.
fn effective_config(command: &RunCommand) -> CliResult<SearchConfig> {
    let mut config = match command.profile {
        Some(profile) => profile.defaults(),
        None => SearchConfig::load(command.config.as_deref())
            .map_err(|err| CliError::new(err.to_string()))?,
    };
    if let Some(value) = command.latency_cutoff_ms {
        config.acceptance.latency_cutoff_ms = value;
    }
    if let Some(value) = command.latency_percentile {
        config.acceptance.latency_percentile = normalize_percentile(value);
    }
    if let Some(value) = command.min_target_ratio {
        config.acceptance.min_target_ratio = value;
    }
    if let Some(value) = command.min_best_ratio {
        config.acceptance.min_best_ratio = value;
    }
    config.validate().map_err(|err| CliError::new(err.to_string()))?;
    Ok(config)
}

/// Assembles the simulation settings from a `run` invocation's knobs.
const fn sim_settings(command: &RunCommand) -> SimSettings {
    SimSettings {
        capacity: command.capacity,
        service_latency_ms: command.service_latency_ms,
        latency_spread: command.latency_spread,
        sharpness: command.sharpness,
        seed: command.seed,
    }
}

/// Executes the `run` command.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let config = effective_config(command)?;
    let plan = config.plan();
    let mut sim =
        SimWorkload::new(sim_settings(command)).map_err(|err| CliError::new(err.to_string()))?;
    let gauges = NoopSearchMetrics;
    let summary = if command.json {
        let progress = NoopProgress;
        let mut runner = SearchRunner::new(&mut sim, &gauges, &progress);
        runner.run(&plan)
    } else {
        render::print_preamble(&config)
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        let progress = ConsoleProgress::new(plan.thresholds);
        let mut runner = SearchRunner::new(&mut sim, &gauges, &progress);
        runner.run(&plan)
    }
    .map_err(|err| CliError::new(err.to_string()))?;
    if command.json {
        emit_summary_json(&summary)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints the analysis summary as pretty JSON on stdout.
fn emit_summary_json(summary: &AnalysisSummary) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(summary)
        .map_err(|err| CliError::new(format!("failed encoding summary: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Check-Config Command
// ============================================================================

/// Executes the `check-config` command.
fn command_check_config(command: &CheckConfigCommand) -> CliResult<ExitCode> {
    let config = SearchConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    let plan = config.plan();
    if command.json {
        emit_plan_json(&plan)?;
    } else {
        write_stdout_line("config ok")
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        render::print_preamble(&config)
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints the resolved plan as pretty JSON on stdout.
fn emit_plan_json(plan: &SearchPlan) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(plan)
        .map_err(|err| CliError::new(format!("failed encoding plan: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}
