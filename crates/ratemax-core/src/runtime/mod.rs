// crates/ratemax-core/src/runtime/mod.rs
// ============================================================================
// Module: Ratemax Runtime
// Description: Synchronous runtime driving the search against collaborators.
// Purpose: Connect the pure controller to live workload, metrics, and clock.
// Dependencies: crate::runtime submodules
// ============================================================================

//! ## Overview
//! The runtime owns the side-effectful half of a search: [`sampler`] measures
//! one window against the live workload, and [`runner`] loops the controller
//! over samples, repeats the search the configured number of times, and
//! averages the outcomes. Everything is single-threaded and blocking; each
//! iteration waits out its full sampling window before proceeding.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod runner;
pub mod sampler;
