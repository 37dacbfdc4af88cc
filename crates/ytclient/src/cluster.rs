//! Fault tolerance around one logical call.
//!
//! The cluster owns no connections: every attempt opens a fresh transport
//! through the [`Connector`] seam and closes it afterwards, success or
//! failure. Fail-over shrinks a call-local copy of the candidate list, so
//! termination in at most N attempts is guaranteed and the registry's view
//! is never touched.

use std::sync::Arc;
use std::time::Duration;

use ytproto::Request;
use ytproto::Response;

use crate::balance::LoadBalancer;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::error::Result;
use crate::transport::Connector;

/// Default deadline for one transport invocation.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// What to do when an attempt fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Surface the first error. One attempt, ever.
    FailFast,
    /// Drop the failed endpoint and retry against the remainder.
    FailOver,
}

pub struct Cluster {
    policy: FaultPolicy,
    balancer: Arc<dyn LoadBalancer>,
    connector: Arc<dyn Connector>,
    call_timeout: Duration,
}

impl Cluster {
    pub fn new(
        policy: FaultPolicy,
        balancer: Arc<dyn LoadBalancer>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self { policy, balancer, connector, call_timeout: DEFAULT_CALL_TIMEOUT }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Run one logical call against the candidate list under this
    /// cluster's policy.
    ///
    /// A returned `Response` may still carry a remote fault; that is a
    /// completed call and is the proxy's concern, not a failure here.
    pub async fn invoke(&self, endpoints: &[Endpoint], request: &Request) -> Result<Response> {
        match self.policy {
            FaultPolicy::FailFast => self.invoke_once(endpoints, request).await,
            FaultPolicy::FailOver => self.invoke_failover(endpoints, request).await,
        }
    }

    /// One attempt: select, connect, invoke, close.
    async fn attempt(&self, endpoint: &Endpoint, request: &Request) -> Result<Response> {
        let transport = self.connector.connect(endpoint).await?;
        let outcome = transport.invoke(request, self.call_timeout).await;
        transport.close().await;
        outcome
    }

    async fn invoke_once(&self, endpoints: &[Endpoint], request: &Request) -> Result<Response> {
        let endpoint = self.balancer.select(endpoints)?;
        self.attempt(&endpoint, request).await
    }

    async fn invoke_failover(&self, endpoints: &[Endpoint], request: &Request) -> Result<Response> {
        let mut candidates = endpoints.to_vec();
        let mut attempts = 0;

        loop {
            let endpoint = match self.balancer.select(&candidates) {
                Ok(endpoint) => endpoint,
                Err(_) => return Err(Error::ClusterExhausted { attempts }),
            };
            attempts += 1;

            match self.attempt(&endpoint, request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.eligible_for_failover() => {
                    tracing::warn!(
                        endpoint = %endpoint,
                        error = %e,
                        remaining = candidates.len() - 1,
                        "attempt failed, trying next candidate"
                    );
                    candidates.retain(|c| c != &endpoint);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
