// crates/ratemax-core/src/lib.rs
// ============================================================================
// Module: Ratemax Core Library
// Description: Adaptive maximum-rate search over a live workload.
// Purpose: Provide the sample model, acceptance checks, search controller,
// and the synchronous runtime that drives a search to completion.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Ratemax searches for the highest sustainable operation rate of a workload
//! under latency and throughput constraints. The search probes increasing
//! target rates, measures each one over a fixed sampling window, and narrows
//! the probe window after rejections until the accepted and rejected bounds
//! collapse below one rate step.
//!
//! The core is deliberately synchronous and single-threaded: each iteration
//! blocks for its full sampling window before the controller advances. All
//! external effects (rate changes, metric reads, waiting, observability) go
//! through the collaborator traits in [`interfaces`], so the search logic
//! itself stays pure and deterministic.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::core::acceptance::AcceptanceThresholds;
pub use self::core::acceptance::AcceptanceVerdict;
pub use self::core::acceptance::evaluate_sample;
pub use self::core::analysis::AnalysisSummary;
pub use self::core::analysis::SearchOutcome;
pub use self::core::sample::LatencySnapshot;
pub use self::core::sample::QuantilePoint;
pub use self::core::sample::Sample;
pub use self::core::search::Probe;
pub use self::core::search::SearchController;
pub use self::core::search::SearchPhase;
pub use self::core::search::SearchSettings;
pub use self::core::search::SearchStep;
pub use interfaces::Clock;
pub use interfaces::MetricsError;
pub use interfaces::MetricsReader;
pub use interfaces::NoopProgress;
pub use interfaces::NoopSearchMetrics;
pub use interfaces::ProgressEvent;
pub use interfaces::ProgressSink;
pub use interfaces::RateSpec;
pub use interfaces::RateSpecParseError;
pub use interfaces::SearchGauge;
pub use interfaces::SearchMetrics;
pub use interfaces::WorkloadControl;
pub use interfaces::WorkloadError;
pub use runtime::runner::SearchError;
pub use runtime::runner::SearchPlan;
pub use runtime::runner::SearchRunner;
pub use runtime::sampler::SamplerError;
pub use runtime::sampler::sample;
