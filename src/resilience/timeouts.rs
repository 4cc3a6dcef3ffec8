//! Timeout enforcement.
//!
//! # Responsibilities
//! - Optionally bound the wait for a backend's response head
//!
//! # Design Decisions
//! - No limit unless configured; an unresponsive backend then holds only
//!   its own caller
//! - Timed-out requests return 504 Gateway Timeout
//! - Body streaming after the response head is not bounded

use std::future::Future;
use std::time::Duration;

use crate::http::response::DispatchError;

/// Await `fut`, failing with [`DispatchError::Timeout`] once `limit` elapses.
pub async fn with_timeout<T, F>(limit: Option<Duration>, fut: F) -> Result<T, DispatchError>
where
    F: Future<Output = Result<T, DispatchError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .unwrap_or(Err(DispatchError::Timeout(limit))),
        None => fut.await,
    }
}
