// crates/ratemax-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// Dependencies: ratemax-config, tempfile
// ============================================================================

//! Config file loading guard tests.

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

use std::io::Write;
use std::path::Path;

use ratemax_config::ConfigError;
use ratemax_config::ProfileKind;
use ratemax_config::SearchConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

/// Assert that a load result is an error containing a specific substring.
fn assert_invalid(result: Result<SearchConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(SearchConfig::load_file(path), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(SearchConfig::load_file(path), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let path = Path::new("does-not-exist.toml");
    assert_invalid(SearchConfig::load(Some(path)), "config io error")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(SearchConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(SearchConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"rate = [ broken").map_err(|err| err.to_string())?;
    assert_invalid(SearchConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_rejects_unknown_key() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[rate]\nbogus = 1\n").map_err(|err| err.to_string())?;
    assert_invalid(SearchConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_resolves_profile_and_overrides() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"profile = \"fast\"\n\n[analysis]\nruns = 2\n")
        .map_err(|err| err.to_string())?;
    let config = SearchConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    assert_eq!(config.profile, ProfileKind::Fast);
    assert_eq!(config.sampling.window_seconds, 5.0);
    assert_eq!(config.analysis.runs, 2);
    Ok(())
}

#[test]
fn load_empty_file_yields_default_profile() -> TestResult {
    let file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let config = SearchConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    assert_eq!(config, ProfileKind::Default.defaults());
    Ok(())
}
