//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::load_balancer::{
    backend::Backend,
    pool::{BackendPool, PoolError},
};

/// Round-robin selector.
/// Owns the pool and a cursor pointing at the next backend to hand out.
#[derive(Debug)]
pub struct RoundRobin {
    pool: BackendPool,
    /// Always in `0..pool.len()`.
    cursor: AtomicUsize,
}

/// The outcome of one selection call.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    /// Cursor value consumed by this call.
    pub cursor: usize,
    pub backend: &'a Backend,
}

impl RoundRobin {
    pub fn new(pool: BackendPool) -> Self {
        Self {
            pool,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn from_addresses<I, S>(addresses: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BackendPool::from_addresses(addresses).map(Self::new)
    }

    /// Hand out the backend under the cursor and advance it, wrapping at the
    /// pool length.
    ///
    /// The read-increment-wrap runs as a single CAS loop, so concurrent
    /// callers always consume distinct cursor values with no gaps.
    pub fn next(&self) -> Selection<'_> {
        let len = self.pool.len();
        let cursor = match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
        {
            Ok(prev) | Err(prev) => prev,
        };

        Selection {
            cursor,
            backend: &self.pool[cursor],
        }
    }

    /// Current cursor value, i.e. the index the next call will consume.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn pool(&self) -> &BackendPool {
        &self.pool
    }
}
