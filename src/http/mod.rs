//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, universal route)
//!     → dispatch.rs (pick backend, drive the exchange)
//!     → request.rs (retarget URI, rewrite headers)
//!     → [backend]
//!     → response.rs (relay response or map error)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use response::DispatchError;
pub use server::{AppState, HttpServer};
