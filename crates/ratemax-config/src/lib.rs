// crates/ratemax-config/src/lib.rs
// ============================================================================
// Module: Ratemax Config Library
// Description: Configuration model, profiles, and validation for searches.
// Purpose: Resolve operator input into a validated core search plan.
// Dependencies: ratemax-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! This crate owns everything between an operator and a running search: the
//! TOML file model, the `default`/`fast`/`accurate` profile presets, strict
//! fail-closed validation, and the conversion into a
//! [`ratemax_core::SearchPlan`]. The core crate never reads files or the
//! environment; this crate is the only place configuration enters.

pub mod config;
pub mod profile;

pub use config::AcceptanceConfig;
pub use config::AnalysisConfig;
pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::DEFAULT_CONFIG_NAME;
pub use config::MAX_CONFIG_FILE_SIZE;
pub use config::MAX_ITERATION_BUDGET;
pub use config::MAX_RUNS;
pub use config::MAX_WINDOW_CAP_SECONDS;
pub use config::RateConfig;
pub use config::RawAcceptanceConfig;
pub use config::RawAnalysisConfig;
pub use config::RawRateConfig;
pub use config::RawSamplingConfig;
pub use config::RawSearchConfig;
pub use config::SamplingConfig;
pub use config::SearchConfig;
pub use config::normalize_percentile;
pub use profile::ProfileKind;
