// crates/ratemax-config/src/profile.rs
// ============================================================================
// Module: Search Profiles
// Description: Named presets that seed a full search configuration.
// Purpose: Give operators a fast/accurate tradeoff without hand-tuning every
// knob; explicit config fields always override the chosen preset.
// Dependencies: serde
// ============================================================================

//! ## Overview
//!
//! A profile is a complete, valid `SearchConfig`. Resolution starts from the
//! profile named in the config file (or `default` when absent) and then lays
//! explicit fields over it, so a file only needs to spell out what it changes.
//!
//! The presets trade sampling time for confidence:
//!
//! - `default` — 10 s windows growing by the golden ratio, two runs.
//! - `fast` — 5 s windows capped at 60 s, a single run.
//! - `accurate` — 10 s windows doubling per rejection, three runs.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::config::ConfigError;
use crate::config::SearchConfig;

// ============================================================================
// SECTION: Profile Kinds
// ============================================================================

/// Named search preset.
///
/// # Invariants
/// - Every variant resolves to a configuration that passes validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Balanced preset; neither very fast nor very accurate.
    #[default]
    Default,
    /// Short windows and a single run for quick estimates.
    Fast,
    /// Wider window growth and three runs for stable numbers.
    Accurate,
}

impl ProfileKind {
    /// Stable lowercase name of the profile.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Fast => "fast",
            Self::Accurate => "accurate",
        }
    }

    /// Fully resolved configuration for this profile.
    #[must_use]
    pub fn defaults(self) -> SearchConfig {
        let mut config = SearchConfig::baseline(self);
        match self {
            Self::Default => {}
            Self::Fast => {
                config.sampling.window_seconds = 5.0;
                config.sampling.max_window_seconds = 60.0;
                config.analysis.runs = 1;
            }
            Self::Accurate => {
                config.sampling.window_growth = 2.0;
                config.analysis.runs = 3;
            }
        }
        config
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "default" => Ok(Self::Default),
            "fast" => Ok(Self::Fast),
            "accurate" => Ok(Self::Accurate),
            other => Err(ConfigError::Invalid(format!(
                "unknown profile '{other}': expected default, fast, or accurate"
            ))),
        }
    }
}
