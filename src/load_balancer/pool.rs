//! Backend pool.
//!
//! # Responsibilities
//! - Hold the ordered, fixed set of backends
//! - Reject an empty pool at construction

use thiserror::Error;

use crate::load_balancer::backend::Backend;

/// Error building a backend pool.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("backend pool is empty")]
    Empty,
}

/// Ordered, immutable, non-empty list of backends.
#[derive(Debug, Clone)]
pub struct BackendPool {
    backends: Vec<Backend>,
}

impl BackendPool {
    pub fn new(backends: Vec<Backend>) -> Result<Self, PoolError> {
        if backends.is_empty() {
            return Err(PoolError::Empty);
        }
        Ok(Self { backends })
    }

    /// Build a pool from raw address strings, keeping their order.
    pub fn from_addresses<I, S>(addresses: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(addresses.into_iter().map(Backend::new).collect())
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Addresses in pool order, for banners and logs.
    pub fn addresses(&self) -> Vec<&str> {
        self.backends.iter().map(Backend::address).collect()
    }
}

impl std::ops::Index<usize> for BackendPool {
    type Output = Backend;

    fn index(&self, index: usize) -> &Backend {
        &self.backends[index]
    }
}
