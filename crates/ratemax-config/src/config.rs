// crates/ratemax-config/src/config.rs
// ============================================================================
// Module: Search Configuration
// Description: TOML config model, loading guards, and strict validation.
// Purpose: Turn an operator-supplied file into a validated search plan while
// failing closed on oversized, malformed, or out-of-range input.
// Dependencies: ratemax-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//!
//! Configuration resolves in three stages:
//!
//! 1. **Load** — locate the file (explicit path, then the `RATEMAX_CONFIG`
//!    environment variable, then `ratemax.toml` in the working directory),
//!    guard its path and size, and parse the TOML into a partial raw model.
//! 2. **Resolve** — start from the named profile's defaults and lay every
//!    explicitly set field over them. Latency percentiles above `1.0` are
//!    read as percentages and scaled down.
//! 3. **Validate** — range-check every field. Any violation is fatal; there
//!    is no best-effort fallback.
//!
//! When no file exists anywhere in the lookup chain, the `default` profile
//! is used as-is, so a search can run with zero configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use ratemax_core::AcceptanceThresholds;
use ratemax_core::SearchPlan;
use ratemax_core::SearchSettings;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::profile::ProfileKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable consulted when no explicit config path is given.
pub const CONFIG_ENV_VAR: &str = "RATEMAX_CONFIG";

/// Config file name looked up in the working directory as a last resort.
pub const DEFAULT_CONFIG_NAME: &str = "ratemax.toml";

/// Maximum accepted config file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Maximum accepted config path length in bytes.
const MAX_CONFIG_PATH_LENGTH: usize = 4_096;

/// Maximum accepted length of a single path component in bytes.
const MAX_CONFIG_PATH_COMPONENT: usize = 255;

/// Upper bound on runs averaged into one analysis.
pub const MAX_RUNS: u32 = 16;

/// Upper bound on the per-run iteration budget.
pub const MAX_ITERATION_BUDGET: u32 = 10_000;

/// Upper bound on any sampling window in seconds.
pub const MAX_WINDOW_CAP_SECONDS: f64 = 3_600.0;

/// Upper bound on rate and window growth multipliers.
const MAX_GROWTH_FACTOR: f64 = 10.0;

/// Upper bound on the latency cutoff in milliseconds (one hour).
const MAX_LATENCY_CUTOFF_MS: f64 = 3_600_000.0;

/// Upper bound on the warmup duration in seconds.
const MAX_WARMUP_SECONDS: f64 = 3_600.0;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors, all fatal to startup.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - No variant carries file contents, only metadata about the failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem operation failed.
    #[error("config io error for {path}: {message}")]
    Io {
        /// Path the operation targeted.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },
    /// Config path exceeded the total length limit.
    #[error("config path exceeds max length: {length} > {max}")]
    PathTooLong {
        /// Observed path length in bytes.
        length: usize,
        /// Maximum permitted length in bytes.
        max: usize,
    },
    /// A single path component exceeded the component length limit.
    #[error("config path component too long: {length} > {max}")]
    PathComponentTooLong {
        /// Observed component length in bytes.
        length: usize,
        /// Maximum permitted length in bytes.
        max: usize,
    },
    /// Config file exceeded the size cap.
    #[error("config file exceeds size limit: {size} > {limit}")]
    FileTooLarge {
        /// Observed file size in bytes.
        size: u64,
        /// Maximum permitted size in bytes.
        limit: u64,
    },
    /// Config file was not valid UTF-8.
    #[error("config file must be utf-8")]
    NotUtf8,
    /// TOML deserialization failed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A field failed range or consistency validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Shorthand for wrapping an I/O failure with its path.
fn io_error(path: &Path, error: &std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

// ============================================================================
// SECTION: Section Models
// ============================================================================

/// Rate ladder settings: where probing starts and how the step grows.
///
/// # Invariants
/// - `base >= 0`, `step > 0`, `growth` in `(1, 10]` after validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateConfig {
    /// Initial base rate in operations per second.
    pub base: f64,
    /// Initial step above the base in operations per second.
    pub step: f64,
    /// Multiplier applied to the step after every iteration.
    pub growth: f64,
}

impl RateConfig {
    /// Validate rate ladder ranges.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when any field is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base.is_finite() || self.base < 0.0 {
            return Err(ConfigError::Invalid(
                "rate base must be finite and non-negative".to_string(),
            ));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(ConfigError::Invalid(
                "rate step must be greater than zero".to_string(),
            ));
        }
        if !self.growth.is_finite() || self.growth <= 1.0 || self.growth > MAX_GROWTH_FACTOR {
            return Err(ConfigError::Invalid(
                "rate growth must be greater than 1 and at most 10".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sampling window settings, including the pre-search warmup.
///
/// # Invariants
/// - `1 <= window_seconds <= max_window_seconds <= 3600` after validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Initial sampling window in seconds.
    pub window_seconds: f64,
    /// Multiplier applied to the window per rejected iteration.
    pub window_growth: f64,
    /// Upper bound on the sampling window in seconds.
    pub max_window_seconds: f64,
    /// Warmup duration before the first run, in seconds.
    pub warmup_seconds: f64,
}

impl SamplingConfig {
    /// Validate sampling window ranges and ordering.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when any field is out of range or
    /// the window ordering is violated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.window_seconds.is_finite() || self.window_seconds < 1.0 {
            return Err(ConfigError::Invalid(
                "window seconds must be at least 1".to_string(),
            ));
        }
        if !self.window_growth.is_finite()
            || self.window_growth <= 1.0
            || self.window_growth > MAX_GROWTH_FACTOR
        {
            return Err(ConfigError::Invalid(
                "window growth must be greater than 1 and at most 10".to_string(),
            ));
        }
        if !self.max_window_seconds.is_finite() || self.max_window_seconds < self.window_seconds {
            return Err(ConfigError::Invalid(
                "max window must be at least the initial window".to_string(),
            ));
        }
        if self.max_window_seconds > MAX_WINDOW_CAP_SECONDS {
            return Err(ConfigError::Invalid(
                "max window must not exceed 3600 seconds".to_string(),
            ));
        }
        if !self.warmup_seconds.is_finite()
            || self.warmup_seconds < 0.0
            || self.warmup_seconds > MAX_WARMUP_SECONDS
        {
            return Err(ConfigError::Invalid(
                "warmup seconds must be between 0 and 3600".to_string(),
            ));
        }
        Ok(())
    }
}

/// Acceptance thresholds applied to every sampled window.
///
/// # Invariants
/// - Ratios and the percentile are on `(0, 1]` after validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceConfig {
    /// Maximum allowed latency in milliseconds at `latency_percentile`.
    pub latency_cutoff_ms: f64,
    /// Percentile at which latency is evaluated. Values above `1.0` are
    /// read as percentages during resolution.
    pub latency_percentile: f64,
    /// Minimum achieved fraction of the probed target rate.
    pub min_target_ratio: f64,
    /// Minimum achieved fraction of the best known rate.
    pub min_best_ratio: f64,
}

impl AcceptanceConfig {
    /// Validate acceptance threshold ranges.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when any field is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.latency_cutoff_ms.is_finite()
            || self.latency_cutoff_ms <= 0.0
            || self.latency_cutoff_ms > MAX_LATENCY_CUTOFF_MS
        {
            return Err(ConfigError::Invalid(
                "latency cutoff must be greater than zero".to_string(),
            ));
        }
        if !unit_interval(self.latency_percentile) {
            return Err(ConfigError::Invalid(
                "latency percentile must be in (0, 1]".to_string(),
            ));
        }
        if !unit_interval(self.min_target_ratio) {
            return Err(ConfigError::Invalid(
                "target ratio cutoff must be in (0, 1]".to_string(),
            ));
        }
        if !unit_interval(self.min_best_ratio) {
            return Err(ConfigError::Invalid(
                "best ratio cutoff must be in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Analysis settings: run repetition and the iteration budget.
///
/// # Invariants
/// - `1 <= runs <= 16` and `1 <= max_iterations <= 10000` after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of sequential runs averaged into the final summary.
    pub runs: u32,
    /// Fail-closed bound on iterations per run.
    pub max_iterations: u32,
}

impl AnalysisConfig {
    /// Validate run count and iteration budget ranges.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when any field is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runs < 1 || self.runs > MAX_RUNS {
            return Err(ConfigError::Invalid(
                "runs must be between 1 and 16".to_string(),
            ));
        }
        if self.max_iterations < 1 || self.max_iterations > MAX_ITERATION_BUDGET {
            return Err(ConfigError::Invalid(
                "iteration budget must be between 1 and 10000".to_string(),
            ));
        }
        Ok(())
    }
}

/// Whether a value lies on the half-open unit interval `(0, 1]`.
fn unit_interval(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value <= 1.0
}

// ============================================================================
// SECTION: Raw Model
// ============================================================================

/// Partial rate section as read from TOML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawRateConfig {
    /// Overrides [`RateConfig::base`].
    pub base: Option<f64>,
    /// Overrides [`RateConfig::step`].
    pub step: Option<f64>,
    /// Overrides [`RateConfig::growth`].
    pub growth: Option<f64>,
}

/// Partial sampling section as read from TOML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawSamplingConfig {
    /// Overrides [`SamplingConfig::window_seconds`].
    pub window_seconds: Option<f64>,
    /// Overrides [`SamplingConfig::window_growth`].
    pub window_growth: Option<f64>,
    /// Overrides [`SamplingConfig::max_window_seconds`].
    pub max_window_seconds: Option<f64>,
    /// Overrides [`SamplingConfig::warmup_seconds`].
    pub warmup_seconds: Option<f64>,
}

/// Partial acceptance section as read from TOML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawAcceptanceConfig {
    /// Overrides [`AcceptanceConfig::latency_cutoff_ms`].
    pub latency_cutoff_ms: Option<f64>,
    /// Overrides [`AcceptanceConfig::latency_percentile`], with values above
    /// `1.0` read as percentages.
    pub latency_percentile: Option<f64>,
    /// Overrides [`AcceptanceConfig::min_target_ratio`].
    pub min_target_ratio: Option<f64>,
    /// Overrides [`AcceptanceConfig::min_best_ratio`].
    pub min_best_ratio: Option<f64>,
}

/// Partial analysis section as read from TOML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawAnalysisConfig {
    /// Overrides [`AnalysisConfig::runs`].
    pub runs: Option<u32>,
    /// Overrides [`AnalysisConfig::max_iterations`].
    pub max_iterations: Option<u32>,
}

/// Complete partial config as read from TOML.
///
/// # Invariants
/// - Unknown keys anywhere in the file are a parse error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawSearchConfig {
    /// Profile whose defaults seed resolution; `default` when absent.
    pub profile: Option<ProfileKind>,
    /// Rate ladder overrides.
    pub rate: RawRateConfig,
    /// Sampling window overrides.
    pub sampling: RawSamplingConfig,
    /// Acceptance threshold overrides.
    pub acceptance: RawAcceptanceConfig,
    /// Analysis overrides.
    pub analysis: RawAnalysisConfig,
}

// ============================================================================
// SECTION: Resolved Config
// ============================================================================

/// Fully resolved and validated search configuration.
///
/// # Invariants
/// - Every instance returned by [`SearchConfig::load`] or
///   [`SearchConfig::from_toml_str`] has passed [`SearchConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Profile the configuration was resolved from.
    pub profile: ProfileKind,
    /// Rate ladder settings.
    pub rate: RateConfig,
    /// Sampling window settings.
    pub sampling: SamplingConfig,
    /// Acceptance thresholds.
    pub acceptance: AcceptanceConfig,
    /// Analysis settings.
    pub analysis: AnalysisConfig,
}

impl SearchConfig {
    /// Shared baseline every profile starts from, before profile overrides.
    #[must_use]
    pub const fn baseline(profile: ProfileKind) -> Self {
        Self {
            profile,
            rate: RateConfig {
                base: 0.0,
                step: 100.0,
                growth: 2.0,
            },
            sampling: SamplingConfig {
                window_seconds: 10.0,
                window_growth: 1.618_1,
                max_window_seconds: 300.0,
                warmup_seconds: 10.0,
            },
            acceptance: AcceptanceConfig {
                latency_cutoff_ms: 50.0,
                latency_percentile: 0.99,
                min_target_ratio: 0.8,
                min_best_ratio: 0.9,
            },
            analysis: AnalysisConfig {
                runs: 2,
                max_iterations: 100,
            },
        }
    }

    /// Load and validate configuration from the lookup chain.
    ///
    /// An explicit `path` wins; otherwise the [`CONFIG_ENV_VAR`] environment
    /// variable is consulted, then [`DEFAULT_CONFIG_NAME`] in the working
    /// directory. With no file anywhere, the `default` profile is returned.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a named file is missing, oversized, not
    /// UTF-8, malformed TOML, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::resolve_path(path) {
            Some(path) => Self::load_file(&path),
            None => Ok(ProfileKind::Default.defaults()),
        }
    }

    /// Load and validate configuration from a specific file.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file is missing, oversized, not
    /// UTF-8, malformed TOML, or fails validation.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        Self::check_path(path)?;
        let metadata = std::fs::metadata(path).map_err(|error| io_error(path, &error))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::FileTooLarge {
                size: metadata.len(),
                limit: MAX_CONFIG_FILE_SIZE,
            });
        }
        let bytes = std::fs::read(path).map_err(|error| io_error(path, &error))?;
        let text = String::from_utf8(bytes).map_err(|_error| ConfigError::NotUtf8)?;
        Self::from_toml_str(&text)
    }

    /// Parse, resolve, and validate configuration from TOML text.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML and
    /// [`ConfigError::Invalid`] on out-of-range fields.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawSearchConfig =
            toml::from_str(text).map_err(|error| ConfigError::Parse(error.to_string()))?;
        let config = Self::resolve(raw);
        config.validate()?;
        Ok(config)
    }

    /// Resolve a partial config over its profile's defaults.
    ///
    /// Percentile values above `1.0` are read as percentages and scaled to
    /// the unit interval. Resolution never fails; call
    /// [`SearchConfig::validate`] on the result.
    #[must_use]
    pub fn resolve(raw: RawSearchConfig) -> Self {
        let mut config = raw.profile.unwrap_or_default().defaults();
        if let Some(value) = raw.rate.base {
            config.rate.base = value;
        }
        if let Some(value) = raw.rate.step {
            config.rate.step = value;
        }
        if let Some(value) = raw.rate.growth {
            config.rate.growth = value;
        }
        if let Some(value) = raw.sampling.window_seconds {
            config.sampling.window_seconds = value;
        }
        if let Some(value) = raw.sampling.window_growth {
            config.sampling.window_growth = value;
        }
        if let Some(value) = raw.sampling.max_window_seconds {
            config.sampling.max_window_seconds = value;
        }
        if let Some(value) = raw.sampling.warmup_seconds {
            config.sampling.warmup_seconds = value;
        }
        if let Some(value) = raw.acceptance.latency_cutoff_ms {
            config.acceptance.latency_cutoff_ms = value;
        }
        if let Some(value) = raw.acceptance.latency_percentile {
            config.acceptance.latency_percentile = normalize_percentile(value);
        }
        if let Some(value) = raw.acceptance.min_target_ratio {
            config.acceptance.min_target_ratio = value;
        }
        if let Some(value) = raw.acceptance.min_best_ratio {
            config.acceptance.min_best_ratio = value;
        }
        if let Some(value) = raw.analysis.runs {
            config.analysis.runs = value;
        }
        if let Some(value) = raw.analysis.max_iterations {
            config.analysis.max_iterations = value;
        }
        config
    }

    /// Validate every section.
    ///
    /// # Errors
    /// Returns the first [`ConfigError::Invalid`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rate.validate()?;
        self.sampling.validate()?;
        self.acceptance.validate()?;
        self.analysis.validate()?;
        Ok(())
    }

    /// Assemble the runtime search plan from this configuration.
    #[must_use]
    pub const fn plan(&self) -> SearchPlan {
        SearchPlan {
            settings: SearchSettings {
                rate_base: self.rate.base,
                rate_step: self.rate.step,
                rate_growth: self.rate.growth,
                window_seconds: self.sampling.window_seconds,
                window_growth: self.sampling.window_growth,
                max_window_seconds: self.sampling.max_window_seconds,
                max_iterations: self.analysis.max_iterations,
            },
            thresholds: AcceptanceThresholds {
                latency_cutoff_ms: self.acceptance.latency_cutoff_ms,
                latency_percentile: self.acceptance.latency_percentile,
                min_target_ratio: self.acceptance.min_target_ratio,
                min_best_ratio: self.acceptance.min_best_ratio,
            },
            runs: self.analysis.runs,
            warmup_seconds: self.sampling.warmup_seconds,
        }
    }

    /// Pick the config path from the lookup chain, if any source names one.
    fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(value) = std::env::var(CONFIG_ENV_VAR)
            && !value.is_empty()
        {
            return Some(PathBuf::from(value));
        }
        let default = PathBuf::from(DEFAULT_CONFIG_NAME);
        default.is_file().then_some(default)
    }

    /// Guard path length before touching the filesystem.
    fn check_path(path: &Path) -> Result<(), ConfigError> {
        let length = path.as_os_str().len();
        if length > MAX_CONFIG_PATH_LENGTH {
            return Err(ConfigError::PathTooLong {
                length,
                max: MAX_CONFIG_PATH_LENGTH,
            });
        }
        for component in path.components() {
            let component_length = component.as_os_str().len();
            if component_length > MAX_CONFIG_PATH_COMPONENT {
                return Err(ConfigError::PathComponentTooLong {
                    length: component_length,
                    max: MAX_CONFIG_PATH_COMPONENT,
                });
            }
        }
        Ok(())
    }
}

/// Scale percentile values given as percentages down to the unit interval.
///
/// Values at or below `1.0` pass through unchanged; `99.0` becomes `0.99`.
#[must_use]
pub fn normalize_percentile(value: f64) -> f64 {
    if value > 1.0 { value * 0.01 } else { value }
}
