//! Endpoint selection strategies.
//!
//! The cluster only depends on the [`LoadBalancer`] trait, so weighted or
//! consistent-hash strategies can be substituted without touching it.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use rand::Rng;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::error::Result;

pub trait LoadBalancer: Send + Sync + 'static {
    /// Pick one endpoint from a non-empty candidate list.
    ///
    /// # Errors
    ///
    /// [`Error::NoCandidates`] if the list is empty.
    fn select(&self, endpoints: &[Endpoint]) -> Result<Endpoint>;
}

/// Uniform random selection. The baseline strategy.
pub struct RandomBalancer;

impl LoadBalancer for RandomBalancer {
    fn select(&self, endpoints: &[Endpoint]) -> Result<Endpoint> {
        if endpoints.is_empty() {
            return Err(Error::NoCandidates);
        }
        let index = rand::thread_rng().gen_range(0..endpoints.len());
        Ok(endpoints[index].clone())
    }
}

/// Rotating selection via an atomic cursor. The cursor is global to the
/// balancer instance, not per candidate list, so rotation survives list
/// changes.
#[derive(Default)]
pub struct RoundRobinBalancer {
    cursor: AtomicUsize,
}

impl RoundRobinBalancer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobinBalancer {
    fn select(&self, endpoints: &[Endpoint]) -> Result<Endpoint> {
        if endpoints.is_empty() {
            return Err(Error::NoCandidates);
        }
        let n = self.cursor.fetch_add(1, Ordering::Relaxed);
        Ok(endpoints[n % endpoints.len()].clone())
    }
}
