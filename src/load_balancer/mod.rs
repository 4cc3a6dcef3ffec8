//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup: configured addresses
//!     → pool.rs (ordered, non-empty, immutable)
//!     → round_robin.rs (pool + rotation cursor)
//!
//! Per request:
//!     → round_robin.rs (next backend, cursor advanced atomically)
//!     → backend.rs (parse address into a forwarding target)
//! ```
//!
//! # Design Decisions
//! - The cursor is the only shared mutable state in the proxy
//! - Selection never blocks on backend I/O
//! - Backends are never removed; a broken entry keeps its turn

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::{Backend, Target};
pub use pool::{BackendPool, PoolError};
pub use round_robin::{RoundRobin, Selection};
