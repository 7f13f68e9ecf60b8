//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling deterministic control of time in tests.

pub mod clock;

pub use clock::MockClock;
