// crates/ratemax-core/src/core/mod.rs
// ============================================================================
// Module: Ratemax Core Model
// Description: Pure data model and search logic for the rate search.
// Purpose: Keep measurement records, acceptance checks, and controller state
// free of I/O so they stay deterministic and replayable.
// Dependencies: crate::core submodules
// ============================================================================

//! ## Overview
//! The core model holds everything the search computes without touching a
//! live workload: immutable [`sample::Sample`] records, the pure
//! [`acceptance`] checks, the [`search`] controller state machine, and the
//! [`analysis`] aggregation of repeated runs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod acceptance;
pub mod analysis;
pub mod sample;
pub mod search;
