// crates/ratemax-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Entry Point Tests
// Description: Parsing and config-resolution tests for the ratemax binary.
// Purpose: Pin flag behavior, override precedence, and validation reuse.
// Dependencies: clap, ratemax-config
// ============================================================================

//! CLI parsing and resolution tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    reason = "Test-only assertions and helpers are permitted."
)]

use clap::Parser;

use super::Cli;
use super::Commands;
use super::RunCommand;
use super::effective_config;
use super::sim_settings;
use crate::render::as_pct;
use crate::render::as_pctile;

/// A `run` command with no flags beyond the defaults.
fn bare_run() -> RunCommand {
    match Cli::try_parse_from(["ratemax", "run"]).expect("bare run should parse").command {
        Commands::Run(command) => command,
        Commands::CheckConfig(_) => panic!("expected run command"),
    }
}

#[test]
fn run_parses_with_defaults() {
    let command = bare_run();
    assert!(command.profile.is_none());
    assert!(command.config.is_none());
    assert_eq!(command.capacity, 10_000.0);
    assert_eq!(command.service_latency_ms, 2.0);
    assert_eq!(command.seed, 42);
    assert!(!command.json);
}

#[test]
fn run_parses_profile_and_knobs() {
    let parsed = Cli::try_parse_from([
        "ratemax",
        "run",
        "--profile",
        "fast",
        "--capacity",
        "5000",
        "--json",
    ])
    .expect("run with flags should parse");
    let Commands::Run(command) = parsed.command else {
        panic!("expected run command");
    };
    assert!(command.profile.is_some());
    assert_eq!(command.capacity, 5_000.0);
    assert!(command.json);
}

#[test]
fn profile_and_config_flags_conflict() {
    let result = Cli::try_parse_from([
        "ratemax",
        "run",
        "--profile",
        "fast",
        "--config",
        "ratemax.toml",
    ]);
    assert!(result.is_err());
}

#[test]
fn unknown_profile_name_fails_parsing() {
    let result = Cli::try_parse_from(["ratemax", "run", "--profile", "blazing"]);
    assert!(result.is_err());
}

#[test]
fn check_config_parses_json_flag() {
    let parsed = Cli::try_parse_from(["ratemax", "check-config", "--json"])
        .expect("check-config should parse");
    let Commands::CheckConfig(command) = parsed.command else {
        panic!("expected check-config command");
    };
    assert!(command.json);
}

#[test]
fn threshold_overrides_apply_with_percentile_normalization() {
    let mut command = bare_run();
    command.latency_cutoff_ms = Some(25.0);
    command.latency_percentile = Some(99.9);
    command.min_best_ratio = Some(0.95);
    let config = effective_config(&command).expect("overrides should validate");
    assert_eq!(config.acceptance.latency_cutoff_ms, 25.0);
    assert_eq!(config.acceptance.latency_percentile, 0.999);
    assert_eq!(config.acceptance.min_best_ratio, 0.95);
    assert_eq!(config.acceptance.min_target_ratio, 0.8);
}

#[test]
fn out_of_range_override_is_rejected() {
    let mut command = bare_run();
    command.min_target_ratio = Some(0.0);
    let result = effective_config(&command);
    assert!(result.is_err());
}

#[test]
fn sim_settings_mirror_run_flags() {
    let mut command = bare_run();
    command.capacity = 2_500.0;
    command.latency_spread = 0.1;
    command.seed = 7;
    let settings = sim_settings(&command);
    assert_eq!(settings.capacity, 2_500.0);
    assert_eq!(settings.latency_spread, 0.1);
    assert_eq!(settings.seed, 7);
    assert_eq!(settings.sharpness, 1.0);
}

#[test]
fn percent_labels_round_down_to_whole_points() {
    assert_eq!(as_pct(0.9), "90%");
    assert_eq!(as_pctile(0.999), "p100");
}
