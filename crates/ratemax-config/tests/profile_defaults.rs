// crates/ratemax-config/tests/profile_defaults.rs
// ============================================================================
// Module: Profile Defaults Tests
// Description: Pin the preset values behind each named profile.
// Purpose: Keep the fast/accurate tradeoffs stable across releases.
// Dependencies: ratemax-config
// ============================================================================

//! Profile preset tests.

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
    clippy::float_cmp,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::str::FromStr;

use ratemax_config::ProfileKind;
use ratemax_config::SearchConfig;

type TestResult = Result<(), String>;

#[test]
fn default_profile_values() {
    let config = ProfileKind::Default.defaults();
    assert_eq!(config.rate.base, 0.0);
    assert_eq!(config.rate.step, 100.0);
    assert_eq!(config.rate.growth, 2.0);
    assert_eq!(config.sampling.window_seconds, 10.0);
    assert_eq!(config.sampling.window_growth, 1.618_1);
    assert_eq!(config.sampling.max_window_seconds, 300.0);
    assert_eq!(config.sampling.warmup_seconds, 10.0);
    assert_eq!(config.acceptance.latency_cutoff_ms, 50.0);
    assert_eq!(config.acceptance.latency_percentile, 0.99);
    assert_eq!(config.acceptance.min_target_ratio, 0.8);
    assert_eq!(config.acceptance.min_best_ratio, 0.9);
    assert_eq!(config.analysis.runs, 2);
    assert_eq!(config.analysis.max_iterations, 100);
}

#[test]
fn fast_profile_shortens_windows_and_runs_once() {
    let config = ProfileKind::Fast.defaults();
    assert_eq!(config.sampling.window_seconds, 5.0);
    assert_eq!(config.sampling.window_growth, 1.618_1);
    assert_eq!(config.sampling.max_window_seconds, 60.0);
    assert_eq!(config.analysis.runs, 1);
}

#[test]
fn accurate_profile_doubles_windows_and_runs_three_times() {
    let config = ProfileKind::Accurate.defaults();
    assert_eq!(config.sampling.window_seconds, 10.0);
    assert_eq!(config.sampling.window_growth, 2.0);
    assert_eq!(config.sampling.max_window_seconds, 300.0);
    assert_eq!(config.analysis.runs, 3);
}

#[test]
fn every_profile_passes_validation() -> TestResult {
    for profile in [ProfileKind::Default, ProfileKind::Fast, ProfileKind::Accurate] {
        profile.defaults().validate().map_err(|err| err.to_string())?;
    }
    Ok(())
}

#[test]
fn profile_names_round_trip() -> TestResult {
    for profile in [ProfileKind::Default, ProfileKind::Fast, ProfileKind::Accurate] {
        let parsed =
            ProfileKind::from_str(profile.as_str()).map_err(|err| err.to_string())?;
        assert_eq!(parsed, profile);
    }
    Ok(())
}

#[test]
fn unknown_profile_name_rejected() {
    let result = ProfileKind::from_str("blazing");
    assert!(result.is_err());
}

#[test]
fn explicit_field_overrides_profile_preset() -> TestResult {
    let text = "profile = \"fast\"\n\n[sampling]\nwindow_seconds = 8.0\n";
    let config = SearchConfig::from_toml_str(text).map_err(|err| err.to_string())?;
    assert_eq!(config.profile, ProfileKind::Fast);
    assert_eq!(config.sampling.window_seconds, 8.0);
    assert_eq!(config.sampling.max_window_seconds, 60.0);
    Ok(())
}
