//! Domain layer - pure admission logic with no locks or I/O.
//!
//! This layer contains the core concepts and invariants of the limiter:
//! - Validated configuration
//! - Per-identity sliding window state and its prune/check/record algorithm
//! - Admission decisions
//!
//! All types in this layer are plain values and easily testable.

pub mod config;
pub mod decision;
pub mod window;
