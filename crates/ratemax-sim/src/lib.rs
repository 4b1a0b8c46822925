// crates/ratemax-sim/src/lib.rs
// ============================================================================
// Module: Ratemax Sim Library
// Description: Deterministic simulated workload for search runs and tests.
// Purpose: Let a full search execute instantly against a queueing model.
// Dependencies: rand, ratemax-core, thiserror
// ============================================================================

//! ## Overview
//! A single [`SimWorkload`] implements the complete harness surface the
//! search runtime needs: rate control, metrics reads, and a clock. Time is
//! simulated, so `wait` is instantaneous and a seeded generator makes every
//! run reproducible. The CLI uses this crate as its built-in workload; tests
//! use it to exercise end-to-end convergence.

pub mod workload;

pub use workload::SimError;
pub use workload::SimSettings;
pub use workload::SimWorkload;
