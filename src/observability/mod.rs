//! Observability subsystem.
//!
//! Logging only: a startup banner and one line per dispatched request.
//! There is no metrics endpoint.

pub mod logging;
