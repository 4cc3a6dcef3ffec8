//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (optional deadline on the response head)
//!     → On failure: error response, nothing else
//! ```
//!
//! # Design Decisions
//! - No retries, no failover, no circuit breaking: a failed request fails
//!   for its caller only and leaves the rotation untouched

pub mod timeouts;
