//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Window registry (per-identity state store)
//! - Admission engine (decision making)
//! - Idle sweeper (background eviction, feature `async`)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod limiter;
pub mod metrics;
pub mod ports;
pub mod registry;
#[cfg(feature = "async")]
pub mod sweeper;
